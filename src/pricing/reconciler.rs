//! Discount reconciliation.
//!
//! An order carries three mutually-derived figures: the discount
//! percentage, the discount amount, and a separately negotiated agreement
//! amount. Whichever one the operator edits is taken as the source of truth
//! and the others are recomputed from it; the edited field is never
//! re-derived from its own output.
//!
//! ```text
//! base_discount_amount  = total_sum * discount_percentage / 100
//! total_discount_amount = base_discount_amount + agreement_amount
//! remaining_balance     = total_sum - total_discount_amount - advance_payment
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::numeric::{parse_number, total_add, total_div, total_mul, total_sub};

/// The operator-facing discount fields of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscountState {
    #[serde(default)]
    pub discount_percentage: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub agreement_amount: Decimal,
    #[serde(default)]
    pub advance_payment: Decimal,
}

impl DiscountState {
    /// The stored amount sits below the agreement, so the settlement (and
    /// any submission) carries the agreement instead.
    pub fn amount_below_agreement(&self) -> bool {
        self.discount_amount < self.agreement_amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountField {
    Percentage,
    Amount,
    Agreement,
    Advance,
}

/// A single change to the discount state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountEdit {
    Percentage(Decimal),
    Amount(Decimal),
    Agreement(Decimal),
    Advance(Decimal),
    /// The subtotal changed underneath; percentage and agreement stand.
    Repriced,
}

impl DiscountEdit {
    /// Builds an edit from raw operator input. Unparseable text counts as 0.
    pub fn from_input(field: DiscountField, input: &str) -> Self {
        let value = parse_number(input, Decimal::ZERO);
        match field {
            DiscountField::Percentage => DiscountEdit::Percentage(value),
            DiscountField::Amount => DiscountEdit::Amount(value),
            DiscountField::Agreement => DiscountEdit::Agreement(value),
            DiscountField::Advance => DiscountEdit::Advance(value),
        }
    }
}

/// `total_sum * percentage / 100`.
pub fn base_discount_amount(total_sum: Decimal, percentage: Decimal) -> Decimal {
    total_div(total_mul(total_sum, percentage), Decimal::ONE_HUNDRED)
}

/// `amount / total_sum * 100`, or 0 without a positive subtotal.
pub fn percentage_of(amount: Decimal, total_sum: Decimal) -> Decimal {
    if total_sum <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    total_mul(total_div(amount, total_sum), Decimal::ONE_HUNDRED)
}

/// Applies one edit and returns the new state.
pub fn reduce(state: DiscountState, edit: DiscountEdit, total_sum: Decimal) -> DiscountState {
    let next = match edit {
        DiscountEdit::Amount(typed) => {
            let base = total_sub(typed, state.agreement_amount).max(Decimal::ZERO);
            DiscountState {
                discount_amount: typed,
                discount_percentage: percentage_of(base, total_sum),
                ..state
            }
        }
        DiscountEdit::Percentage(percentage) => DiscountState {
            discount_percentage: percentage,
            discount_amount: total_add(
                base_discount_amount(total_sum, percentage),
                state.agreement_amount,
            ),
            ..state
        },
        DiscountEdit::Agreement(agreement) => DiscountState {
            agreement_amount: agreement,
            discount_amount: total_add(
                base_discount_amount(total_sum, state.discount_percentage),
                agreement,
            ),
            ..state
        },
        DiscountEdit::Advance(advance) => DiscountState {
            advance_payment: advance,
            ..state
        },
        DiscountEdit::Repriced => DiscountState {
            discount_amount: total_add(
                base_discount_amount(total_sum, state.discount_percentage),
                state.agreement_amount,
            ),
            ..state
        },
    };

    tracing::trace!(?edit, %total_sum, ?next, "discount state reduced");
    next
}

/// Final figures of an order after discounts and advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub total_sum: Decimal,
    pub base_discount_amount: Decimal,
    pub total_discount_amount: Decimal,
    pub equivalent_percentage: Decimal,
    /// Amount due after discounts, before the advance.
    pub total_amount: Decimal,
    pub advance_payment: Decimal,
    pub remaining_balance: Decimal,
}

impl Settlement {
    pub fn compute(state: &DiscountState, total_sum: Decimal) -> Self {
        let base = base_discount_amount(total_sum, state.discount_percentage);
        let total_discount = total_add(base, state.agreement_amount);
        let total_amount = total_sub(total_sum, total_discount);

        Settlement {
            total_sum,
            base_discount_amount: base,
            total_discount_amount: total_discount,
            equivalent_percentage: percentage_of(total_discount, total_sum),
            total_amount,
            advance_payment: state.advance_payment,
            remaining_balance: total_sub(total_amount, state.advance_payment),
        }
    }
}
