//! Session

pub mod errors;
pub mod models;
pub mod service;

pub use errors::SessionError;
pub use service::*;
