use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dimensions::{CasingFormula, CasingType};
use crate::error::OrderError;

/// Reference to a catalog product (the backend's `model` field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

impl fmt::Display for ProductRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "#{}", self.id)
        } else {
            write!(f, "{} (#{})", self.name, self.id)
        }
    }
}

/// Parses `"42"` or `"42:Classic oak"`.
impl FromStr for ProductRef {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, name) = match s.split_once(':') {
            Some((id, name)) => (id, name.trim()),
            None => (s, ""),
        };
        let id = id
            .trim()
            .parse()
            .map_err(|_| OrderError::InvalidModelRef(s.to_string()))?;
        Ok(ProductRef {
            id,
            name: name.to_string(),
        })
    }
}

/// Common surface of everything nested under a door.
pub trait LineItem {
    const KIND: &'static str;

    fn model(&self) -> Option<&ProductRef>;
    fn quantity(&self) -> u32;

    /// Entries without a product or with nothing ordered are never sent.
    fn is_submittable(&self) -> bool {
        self.quantity() > 0 && self.model().is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ProductRef>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub height: Decimal,
    #[serde(default)]
    pub width: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Casing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ProductRef>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: u32,
    pub casing_type: CasingType,
    #[serde(default)]
    pub casing_formula: CasingFormula,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub casing_range: Option<u64>,
    #[serde(default)]
    pub height: Decimal,
    #[serde(default)]
    pub width: Decimal,
}

impl Casing {
    /// A single casing with no product and zero dimensions; run it through
    /// the deriver before use.
    pub fn new(casing_type: CasingType, casing_formula: CasingFormula) -> Self {
        Self {
            model: None,
            price: Decimal::ZERO,
            quantity: 1,
            casing_type,
            casing_formula,
            casing_range: None,
            height: Decimal::ZERO,
            width: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ProductRef>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub height: Decimal,
    #[serde(default)]
    pub width: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ProductRef>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: u32,
}

macro_rules! line_item {
    ($ty:ty, $kind:literal) => {
        impl LineItem for $ty {
            const KIND: &'static str = $kind;

            fn model(&self) -> Option<&ProductRef> {
                self.model.as_ref()
            }

            fn quantity(&self) -> u32 {
                self.quantity
            }
        }
    };
}

line_item!(Extension, "Extension");
line_item!(Casing, "Casing");
line_item!(Crown, "Crown");
line_item!(Accessory, "Accessory");

/// One door position of an order with everything mounted on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ProductRef>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: u32,
    pub height: Decimal,
    pub width: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glass_type: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u64>,
    #[serde(default)]
    pub extensions: Vec<Extension>,
    #[serde(default)]
    pub casings: Vec<Casing>,
    #[serde(default)]
    pub crowns: Vec<Crown>,
    #[serde(default)]
    pub accessories: Vec<Accessory>,
}

impl Door {
    pub fn summary(&self) -> String {
        let model = self
            .model
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "(no model)".to_string());
        format!("{} {}x{} x{}", model, self.width, self.height, self.quantity)
    }
}
