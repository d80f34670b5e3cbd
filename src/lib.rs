//! Barista
//!
//! Barista is an offline-first ordering client for a café: session handling,
//! a persistent cart, checkout that falls back to local completion when the
//! backend is unreachable, and a loyalty point ledger with reward redemption.

pub mod backup;
pub mod codec;
pub mod config;
pub mod context;
pub mod domain;
pub mod ids;
pub mod notifications;
pub mod observability;
pub mod prelude;
pub mod prices;
pub mod remote;
pub mod retry;
pub mod storage;
