mod client;
pub mod search;

pub use client::{ApiClient, Product};
pub use search::{SearchSequencer, SearchTicket};
