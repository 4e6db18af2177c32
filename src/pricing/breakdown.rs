use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price breakdown as returned by the backend's calculate endpoint.
///
/// Pricing rules live on the server; this is stored and redisplayed as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    #[serde(default)]
    pub total_sum: Decimal,
    #[serde(default)]
    pub door_price: Decimal,
    #[serde(default)]
    pub extension_price: Decimal,
    #[serde(default)]
    pub casing_price: Decimal,
    #[serde(default)]
    pub crown_price: Decimal,
    #[serde(default)]
    pub accessory_price: Decimal,
}

impl PriceBreakdown {
    /// Labeled rows in display order, subtotal last.
    pub fn rows(&self) -> [(&'static str, Decimal); 6] {
        [
            ("Doors", self.door_price),
            ("Extensions", self.extension_price),
            ("Casings", self.casing_price),
            ("Crowns", self.crown_price),
            ("Accessories", self.accessory_price),
            ("Subtotal", self.total_sum),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn accepts_string_and_numeric_amounts() {
        let json = r#"{
            "total_sum": "3528000.00",
            "door_price": 3000000,
            "extension_price": "120000.00",
            "casing_price": 250000.5,
            "crown_price": "0",
            "accessory_price": "157999.50"
        }"#;
        let breakdown: PriceBreakdown = serde_json::from_str(json).unwrap();

        assert_eq!(breakdown.total_sum, dec!(3528000));
        assert_eq!(breakdown.door_price, dec!(3000000));
        assert_eq!(breakdown.casing_price, dec!(250000.5));
        assert_eq!(breakdown.accessory_price, dec!(157999.50));
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let breakdown: PriceBreakdown = serde_json::from_str(r#"{"total_sum": "10"}"#).unwrap();

        assert_eq!(breakdown.total_sum, dec!(10));
        assert_eq!(breakdown.crown_price, Decimal::ZERO);
        assert_eq!(breakdown.rows()[5], ("Subtotal", dec!(10)));
    }
}
