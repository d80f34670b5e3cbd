//! Remote Config

use std::time::Duration;

use clap::Args;

use crate::remote::HttpRemoteConfig;

/// Backend connection settings.
#[derive(Debug, Clone, Args)]
pub struct RemoteConfig {
    /// Ordering API address
    #[arg(long, env = "BARISTA_API_URL", default_value = "http://localhost:5000")]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "BARISTA_REQUEST_TIMEOUT_SECS", default_value_t = 5)]
    pub request_timeout_secs: u64,
}

impl RemoteConfig {
    /// HTTP client settings.
    #[must_use]
    pub fn http(&self) -> HttpRemoteConfig {
        HttpRemoteConfig {
            base_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
