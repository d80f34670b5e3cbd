//! Loyalty

pub mod catalog;
pub mod errors;
pub mod models;
pub mod service;

pub use catalog::RewardCatalog;
pub use errors::LedgerError;
pub use service::*;
