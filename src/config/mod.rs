mod settings;
mod state;

pub use settings::{
    ApiSettings, Company, Config, DisplaySettings, OrderSettings, Role, UserSettings,
};
pub use state::{format_order_number, Counter, RangeTable, State};

use crate::dimensions::CasingRange;
use crate::error::{OrderError, Result};
use crate::order::Order;
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "door-orders") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.door-orders/
    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        OrderError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".door-orders"))
}

fn read_toml<T: DeserializeOwned>(path: PathBuf) -> Result<T> {
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| OrderError::ConfigParse { path, source: e })
}

fn write_toml<T: Serialize>(path: PathBuf, value: &T) -> Result<()> {
    let content = toml::to_string_pretty(value)
        .map_err(|e| OrderError::ConfigWrite {
            path: path.clone(),
            source: e,
        })?;
    fs::write(&path, content)?;
    tracing::debug!(path = %path.display(), "saved");
    Ok(())
}

/// Fails unless `init` has been run for this directory.
pub fn ensure_initialized(config_dir: &Path) -> Result<()> {
    if config_dir.exists() {
        Ok(())
    } else {
        Err(OrderError::ConfigNotFound(config_dir.to_path_buf()))
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(OrderError::ConfigFileNotFound(path));
    }
    read_toml(path)
}

/// Load state.toml (creates default if missing)
pub fn load_state(config_dir: &Path) -> Result<State> {
    let path = config_dir.join("state.toml");
    if !path.exists() {
        return Ok(State::default());
    }
    read_toml(path)
}

/// Save state.toml
pub fn save_state(config_dir: &Path, state: &State) -> Result<()> {
    write_toml(config_dir.join("state.toml"), state)
}

/// Load the cached casing ranges (empty if never synced)
pub fn load_ranges(config_dir: &Path) -> Result<Vec<CasingRange>> {
    let path = config_dir.join("casing_ranges.toml");
    if !path.exists() {
        return Ok(Vec::new());
    }
    let table: RangeTable = read_toml(path)?;
    Ok(table.ranges)
}

pub fn save_ranges(config_dir: &Path, ranges: &[CasingRange]) -> Result<()> {
    let table = RangeTable {
        ranges: ranges.to_vec(),
    };
    write_toml(config_dir.join("casing_ranges.toml"), &table)
}

fn orders_dir(config_dir: &Path) -> PathBuf {
    config_dir.join("orders")
}

fn order_path(config_dir: &Path, number: &str) -> PathBuf {
    orders_dir(config_dir).join(format!("{number}.toml"))
}

pub fn load_order(config_dir: &Path, number: &str) -> Result<Order> {
    let path = order_path(config_dir, number);
    if !path.exists() {
        return Err(OrderError::OrderNotFound(number.to_string()));
    }
    read_toml(path)
}

pub fn save_order(config_dir: &Path, order: &Order) -> Result<()> {
    fs::create_dir_all(orders_dir(config_dir))?;
    write_toml(order_path(config_dir, &order.number), order)
}

/// All drafted orders, oldest first.
pub fn list_orders(config_dir: &Path) -> Result<Vec<Order>> {
    let dir = orders_dir(config_dir);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut orders = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }
        orders.push(read_toml::<Order>(path)?);
    }
    orders.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.number.cmp(&b.number)));
    Ok(orders)
}

/// Resolve an order reference to the actual order number.
/// Accepts either an index (1-based) from 'list' or the full order number.
pub fn resolve_order_number(config_dir: &Path, reference: &str) -> Result<String> {
    if let Ok(idx) = reference.parse::<usize>() {
        let orders = list_orders(config_dir)?;
        if idx == 0 || idx > orders.len() {
            return Err(OrderError::InvalidOrderIndex(reference.to_string()));
        }
        // Orders are displayed newest first
        return Ok(orders[orders.len() - idx].number.clone());
    }

    if order_path(config_dir, reference).exists() {
        Ok(reference.to_string())
    } else {
        Err(OrderError::OrderNotFound(reference.to_string()))
    }
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[company]
name = "Your Door Company"
# phone = "+998-71-000-00-00"   # optional
# address = "1 Workshop Street" # optional

[calculation]
casing_size = 6    # casing profile width, added to door height / twice to width
crown_size = 10    # crown overhang added to door width

[api]
base_url = "http://localhost:8000/api"
# token = "your-api-token"      # optional, sent as "Authorization: Token ..."
timeout_secs = 10
search_debounce_ms = 400

[user]
id = 1
role = "manager"   # admin, manager or viewer (read-only)

[display]
currency_symbol = "UZS"

[order]
number_format = "ORD-{year}-{seq:04}"  # e.g., ORD-2026-0001
"#;

/// Template content for casing_ranges.toml
pub const RANGES_TEMPLATE: &str = r#"# Casing ranges used by formula2 casings. Replace with the backend's
# table via 'door-orders ranges sync'.
#
# A range maps a door dimension interval (inclusive) to a fixed casing height.

[[ranges]]
id = 1
min_size = 0
max_size = 100
casing_size = 58

[[ranges]]
id = 2
min_size = 180
max_size = 220
casing_size = 215
"#;
