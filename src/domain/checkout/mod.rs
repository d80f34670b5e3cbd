//! Checkout

pub mod errors;
pub mod models;
pub mod service;

pub use errors::{CheckoutError, FallbackError};
pub use service::*;
