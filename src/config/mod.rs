//! Client configuration module

use clap::Args;

pub use crate::config::{
    logging::{LogFormat, LoggingConfig},
    remote::RemoteConfig,
    session::SessionSettings,
    storage::StorageConfig,
};

mod logging;
mod remote;
mod session;
mod storage;

/// Barista client configuration, read from flags, the environment and `.env`.
#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    /// Backend connection settings.
    #[command(flatten)]
    pub remote: RemoteConfig,

    /// Local store settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Session behaviour settings.
    #[command(flatten)]
    pub session: SessionSettings,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

/// Load `.env` into the process environment so `env` fallbacks see it.
pub fn load_dotenv() {
    // Missing .env is fine
    _ = dotenvy::dotenv();
}
