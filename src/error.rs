use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Config directory not found at {0}. Run 'door-orders init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Order '{0}' not found")]
    OrderNotFound(String),

    #[error("Invalid order index '{0}'. Use 'door-orders list' to see available orders.")]
    InvalidOrderIndex(String),

    #[error("Door #{index} not found in {order} (it has {count} door(s))")]
    DoorNotFound {
        order: String,
        index: usize,
        count: usize,
    },

    #[error("{kind} #{index} not found on door #{door} (it has {count})")]
    LineItemNotFound {
        kind: &'static str,
        door: usize,
        index: usize,
        count: usize,
    },

    #[error("Casing range {0} not found. Run 'door-orders ranges sync' or add it to casing_ranges.toml.")]
    CasingRangeNotFound(u64),

    #[error("No casing range covers {size} for a {casing_type} casing")]
    NoMatchingRange { size: String, casing_type: String },

    #[error("Invalid model reference '{0}'. Expected 'id:name' (e.g., '42:Classic oak')")]
    InvalidModelRef(String),

    #[error("Month {0} is out of range (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Yearly plan for {year} is invalid: {reason}")]
    InvalidPlan { year: i32, reason: String },

    #[error("Role '{0}' is read-only and cannot edit orders")]
    ReadOnly(String),

    #[error("Order {0} has no price yet. Run 'door-orders calculate {0}' first.")]
    NotPriced(String),

    #[error("Order {0} has no doors")]
    EmptyOrder(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("API returned {status} for {url}: {body}")]
    Api {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OrderError>;
