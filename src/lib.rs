pub mod api;
pub mod config;
pub mod dimensions;
pub mod error;
pub mod logging;
pub mod numeric;
pub mod order;
pub mod plan;
pub mod pricing;
pub mod reference;

pub use config::{Config, Role, State};
pub use dimensions::{CasingFormula, CasingRange, CasingType, Deriver, DimensionSettings};
pub use error::{OrderError, Result};
pub use order::{Access, Door, Order, OrderEditor};
pub use pricing::{DiscountEdit, DiscountState, PriceBreakdown, Settlement};
