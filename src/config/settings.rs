use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dimensions::DimensionSettings;
use crate::order::Access;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub company: Company,
    pub calculation: DimensionSettings,
    pub api: ApiSettings,
    #[serde(default)]
    pub user: UserSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub order: OrderSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_search_debounce_ms() -> u64 {
    400
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Manager,
    Viewer,
}

impl Role {
    pub fn can_edit_orders(self) -> bool {
        !matches!(self, Role::Viewer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Viewer => "viewer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct UserSettings {
    /// Backend user id, used for yearly plans.
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub role: Role,
}

impl UserSettings {
    pub fn access(&self) -> Access {
        Access::new(self.role.to_string(), self.role.can_edit_orders())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_currency_symbol() -> String {
    "UZS".to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OrderSettings {
    #[serde(default = "default_number_format")]
    pub number_format: String,
}

fn default_number_format() -> String {
    "ORD-{year}-{seq:04}".to_string()
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            number_format: default_number_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn minimal_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [company]
            name = "Doors Ltd"

            [calculation]
            casing_size = 6
            crown_size = 10.5

            [api]
            base_url = "http://localhost:8000/api"
            "#,
        )
        .unwrap();

        assert_eq!(config.calculation.casing_size, dec!(6));
        assert_eq!(config.calculation.crown_size, dec!(10.5));
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.api.search_debounce_ms, 400);
        assert_eq!(config.user.role, Role::Manager);
        assert_eq!(config.display.currency_symbol, "UZS");
        assert_eq!(config.order.number_format, "ORD-{year}-{seq:04}");
    }

    #[test]
    fn viewer_role_is_read_only() {
        let user = UserSettings {
            id: 1,
            role: Role::Viewer,
        };
        assert!(!user.access().can_edit());
        assert!(UserSettings::default().access().can_edit());
    }
}
