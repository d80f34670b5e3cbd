//! Session Models

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;
use zeroize::Zeroize;

use crate::ids::UserId;

/// User Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend id.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Account email.
    pub email: String,
    /// Optional given name.
    #[serde(default)]
    pub first_name: String,
    /// Optional family name.
    #[serde(default)]
    pub last_name: String,
    /// Current loyalty balance.
    #[serde(default)]
    pub loyalty_points: u64,
}

impl User {
    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        if self.first_name.is_empty() {
            &self.username
        } else {
            &self.first_name
        }
    }
}

/// Login Credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Credentials {
    /// Account email.
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    /// Plain password, zeroized on drop.
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

impl Credentials {
    /// Credentials for `email` and `password`.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Registration Form
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct Registration {
    /// Login name, at least 3 characters.
    #[validate(length(min = 3, message = "Username must be at least 3 characters."))]
    pub username: String,
    /// Account email.
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    /// Plain password, at least 6 characters.
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    /// Optional given name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[validate(length(max = 50, message = "First name must be at most 50 characters."))]
    pub first_name: String,
    /// Optional family name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[validate(length(max = 50, message = "Last name must be at most 50 characters."))]
    pub last_name: String,
}

impl Registration {
    /// The matching login credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.email.clone(), self.password.clone())
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Locally remembered credentials, persisted under `devCredentials`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCredentials {
    /// Account email.
    pub email: String,
    /// Plain password, zeroized on drop.
    pub password: String,
    /// Expiry as milliseconds since the Unix epoch.
    pub expires_at: i64,
}

impl SavedCredentials {
    /// Remember `credentials` until `now + ttl`.
    pub fn new(credentials: &Credentials, now: Timestamp, ttl: SignedDuration) -> Self {
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or(Timestamp::MAX)
            .as_millisecond();

        Self {
            email: credentials.email.clone(),
            password: credentials.password.clone(),
            expires_at,
        }
    }

    /// Whether these credentials are still usable at `now`.
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        now.as_millisecond() < self.expires_at
    }

    /// Credentials to log in with.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.email.clone(), self.password.clone())
    }
}

impl fmt::Debug for SavedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SavedCredentials")
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl Drop for SavedCredentials {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Where the current profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    /// Read from the persisted user record.
    Cached,

    /// Fetched from the backend.
    Remote,
}

/// Read-only view of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The current user, if known.
    pub user: Option<User>,
    /// Whether a token is held.
    pub authenticated: bool,
    /// Whether a login, registration or restore is running.
    pub loading: bool,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn registration_rules() {
        let valid = Registration {
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret1".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        };

        assert!(valid.validate().is_ok(), "valid registration rejected");

        let invalid = Registration {
            username: "an".to_string(),
            email: "not-an-email".to_string(),
            password: "12345".to_string(),
            first_name: "x".repeat(51),
            last_name: String::new(),
        };

        let errors = invalid.validate().err().map(|errors| errors.field_errors().len());

        assert_eq!(errors, Some(4));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let credentials = Credentials::new("ana@example.com", "hunter22");

        assert!(
            !format!("{credentials:?}").contains("hunter22"),
            "password leaked into debug output"
        );
    }

    #[test]
    fn saved_credentials_expire() -> TestResult {
        let now: Timestamp = "2024-05-01T00:00:00Z".parse()?;
        let saved = SavedCredentials::new(
            &Credentials::new("ana@example.com", "secret1"),
            now,
            SignedDuration::from_hours(7 * 24),
        );

        assert!(saved.is_valid_at(now), "fresh credentials should be valid");
        assert!(
            !saved.is_valid_at(now.checked_add(SignedDuration::from_hours(7 * 24))?),
            "credentials should expire after the ttl"
        );

        Ok(())
    }

    #[test]
    fn saved_credentials_use_camel_case_expiry() -> TestResult {
        let json = r#"{"email":"a@b.co","password":"pw","expiresAt":10}"#;
        let saved: SavedCredentials = serde_json::from_str(json)?;

        assert_eq!(saved.expires_at, 10);

        Ok(())
    }

    #[test]
    fn user_accepts_missing_optional_fields() -> TestResult {
        let json = r#"{"id":1,"username":"ana","email":"a@b.co","created_at":"2024-01-01 10:00:00"}"#;
        let user: User = serde_json::from_str(json)?;

        assert_eq!(user.loyalty_points, 0);
        assert_eq!(user.display_name(), "ana");

        Ok(())
    }
}
