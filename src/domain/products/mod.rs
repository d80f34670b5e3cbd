//! Products

pub mod errors;
pub mod service;

pub use errors::ProductsError;
pub use service::*;
