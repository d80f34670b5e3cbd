//! Gift Cards

pub mod errors;
pub mod models;
pub mod service;

pub use errors::GiftCardError;
pub use service::*;
