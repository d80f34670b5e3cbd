//! Cart

pub mod errors;
pub mod models;
pub mod service;
pub mod totals;

pub use errors::CartError;
pub use service::*;
pub use totals::CartTotals;
