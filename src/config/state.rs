use chrono::Datelike;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct State {
    pub counter: Counter,
}

/// Order numbering restarts every year.
#[derive(Debug, Deserialize, Serialize)]
pub struct Counter {
    pub last_number: u32,
    pub last_year: u32,
}

impl Default for Counter {
    fn default() -> Self {
        Self {
            last_number: 0,
            last_year: chrono::Local::now().year() as u32,
        }
    }
}

impl Counter {
    pub fn next_seq(&self, year: u32) -> u32 {
        if self.last_year == year {
            self.last_number + 1
        } else {
            1
        }
    }

    pub fn advance(&mut self, year: u32) -> u32 {
        let seq = self.next_seq(year);
        self.last_number = seq;
        self.last_year = year;
        seq
    }
}

/// Format an order number from template
pub fn format_order_number(format: &str, year: u32, seq: u32) -> String {
    format
        .replace("{year}", &year.to_string())
        .replace("{seq:04}", &format!("{:04}", seq))
        .replace("{seq:05}", &format!("{:05}", seq))
        .replace("{seq:03}", &format!("{:03}", seq))
}

/// Casing ranges cached from the backend, `casing_ranges.toml`.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct RangeTable {
    #[serde(default)]
    pub ranges: Vec<crate::dimensions::CasingRange>,
}
