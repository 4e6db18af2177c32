mod breakdown;
pub mod reconciler;

pub use breakdown::PriceBreakdown;
pub use reconciler::{reduce, DiscountEdit, DiscountField, DiscountState, Settlement};
