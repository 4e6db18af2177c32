mod door;
mod edit;
mod payload;

pub use door::{Accessory, Casing, Crown, Door, Extension, LineItem, ProductRef};
pub use edit::{Access, CasingSpec, DoorSpec, OrderEditor, RangeChoice};
pub use payload::{OrderGraph, OrderSubmission, SubmittedOrder};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{OrderError, Result};
use crate::pricing::{reduce, DiscountEdit, DiscountState, PriceBreakdown, Settlement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Draft,
    Submitted,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Draft => write!(f, "DRAFT"),
            OrderStatus::Submitted => write!(f, "SUBMITTED"),
        }
    }
}

/// An order as drafted locally, one file per order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub number: String,
    pub customer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub status: OrderStatus,
    /// Backend id once the order has been submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<u64>,
    #[serde(default)]
    pub discount: DiscountState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PriceBreakdown>,
    #[serde(default)]
    pub doors: Vec<Door>,
}

impl Order {
    pub fn new(number: String, customer: String, date: NaiveDate) -> Self {
        Self {
            number,
            customer,
            phone: None,
            date,
            deadline: None,
            status: OrderStatus::Draft,
            remote_id: None,
            discount: DiscountState::default(),
            pricing: None,
            doors: Vec::new(),
        }
    }

    /// Subtotal from the last server calculation, zero before one.
    pub fn total_sum(&self) -> Decimal {
        self.pricing
            .as_ref()
            .map(|p| p.total_sum)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn settlement(&self) -> Settlement {
        Settlement::compute(&self.discount, self.total_sum())
    }

    pub fn apply_discount_edit(&mut self, edit: DiscountEdit) {
        self.discount = reduce(self.discount, edit, self.total_sum());
    }

    /// Stores a fresh server price and re-pushes the discount amount.
    pub fn apply_pricing(&mut self, breakdown: PriceBreakdown) {
        self.pricing = Some(breakdown);
        self.apply_discount_edit(DiscountEdit::Repriced);
    }

    /// 1-based door lookup.
    pub fn door(&self, index: usize) -> Result<&Door> {
        let count = self.doors.len();
        index
            .checked_sub(1)
            .and_then(|i| self.doors.get(i))
            .ok_or_else(|| OrderError::DoorNotFound {
                order: self.number.clone(),
                index,
                count,
            })
    }

    pub fn door_mut(&mut self, index: usize) -> Result<&mut Door> {
        let count = self.doors.len();
        let number = self.number.clone();
        index
            .checked_sub(1)
            .and_then(|i| self.doors.get_mut(i))
            .ok_or(OrderError::DoorNotFound {
                order: number,
                index,
                count,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn order() -> Order {
        Order::new(
            "ORD-2026-0001".to_string(),
            "Acme".to_string(),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        )
    }

    #[test]
    fn unpriced_order_has_zero_subtotal() {
        let order = order();
        assert_eq!(order.total_sum(), Decimal::ZERO);
        assert_eq!(order.settlement().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn new_price_repushes_discount_amount() {
        let mut order = order();
        order.apply_discount_edit(DiscountEdit::Percentage(dec!(10)));
        order.apply_discount_edit(DiscountEdit::Agreement(dec!(75200)));
        assert_eq!(order.discount.discount_amount, dec!(75200));

        order.apply_pricing(PriceBreakdown {
            total_sum: dec!(3528000),
            ..PriceBreakdown::default()
        });

        assert_eq!(order.discount.discount_amount, dec!(428000));
        assert_eq!(order.settlement().total_discount_amount, dec!(428000));
    }

    #[test]
    fn door_lookup_is_one_based() {
        let mut order = order();
        order.doors.push(Door {
            width: dec!(80),
            height: dec!(200),
            ..Door::default()
        });

        assert_eq!(order.door(1).unwrap().width, dec!(80));
        assert!(matches!(
            order.door(0),
            Err(OrderError::DoorNotFound { index: 0, count: 1, .. })
        ));
        assert!(order.door_mut(2).is_err());
    }

    #[test]
    fn order_survives_toml() {
        let mut order = order();
        order.doors.push(Door {
            width: dec!(80),
            height: dec!(200),
            quantity: 1,
            casings: vec![Casing::new(
                crate::dimensions::CasingType::Side,
                crate::dimensions::CasingFormula::FromDoor,
            )],
            ..Door::default()
        });
        order.apply_pricing(PriceBreakdown {
            total_sum: dec!(1000),
            ..PriceBreakdown::default()
        });

        let text = toml::to_string_pretty(&order).unwrap();
        let parsed: Order = toml::from_str(&text).unwrap();
        assert_eq!(parsed, order);
    }
}
