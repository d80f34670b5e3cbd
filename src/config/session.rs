//! Session Config

use std::time::Duration;

use clap::Args;
use jiff::SignedDuration;

use crate::{domain::session::SessionConfig, retry::RetryPolicy};

/// Session behaviour settings.
#[derive(Debug, Clone, Args)]
pub struct SessionSettings {
    /// Profile load retries after the first attempt
    #[arg(long, env = "BARISTA_PROFILE_RETRIES", default_value_t = 3)]
    pub profile_retries: u32,

    /// Delay between profile load attempts in milliseconds
    #[arg(long, env = "BARISTA_PROFILE_RETRY_BACKOFF_MS", default_value_t = 500)]
    pub profile_retry_backoff_ms: u64,

    /// Automatic logins tried with saved credentials
    #[arg(long, env = "BARISTA_AUTO_LOGIN_ATTEMPTS", default_value_t = 2)]
    pub auto_login_attempts: u32,

    /// Keep login credentials for automatic login (development only)
    #[arg(long, env = "BARISTA_REMEMBER_CREDENTIALS")]
    pub remember_credentials: bool,

    /// Days remembered credentials stay valid
    #[arg(long, env = "BARISTA_CREDENTIALS_TTL_DAYS", default_value_t = 7)]
    pub credentials_ttl_days: u16,
}

impl From<&SessionSettings> for SessionConfig {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            profile_retry: RetryPolicy::new(
                settings.profile_retries,
                Duration::from_millis(settings.profile_retry_backoff_ms),
            ),
            auto_login_attempts: settings.auto_login_attempts,
            remember_credentials: settings.remember_credentials,
            credentials_ttl: SignedDuration::from_hours(
                i64::from(settings.credentials_ttl_days) * 24,
            ),
        }
    }
}
