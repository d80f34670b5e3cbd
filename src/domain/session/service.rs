//! Session service.
//!
//! Owns the bearer token and the current [`User`]. The persisted user record is
//! the offline source of truth: [`SessionStore::get_profile`] prefers it over
//! the backend, and every balance change goes through
//! [`SessionStore::commit_points`], which re-reads it first.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use jiff::{SignedDuration, Timestamp};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::{
    domain::session::{
        errors::SessionError,
        models::{
            Credentials, ProfileSource, Registration, SavedCredentials, SessionSnapshot, User,
        },
    },
    notifications::{Notification, Notifier},
    remote::{AuthResponse, RemoteService},
    retry::{RetryDecision, RetryPolicy, RetryState},
    storage::{Storage, StorageKey},
};

/// Session behaviour knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Retries for loading the profile of a restored session.
    pub profile_retry: RetryPolicy,

    /// Automatic logins tried with saved credentials before they are dropped.
    pub auto_login_attempts: u32,

    /// Persist login credentials for automatic login.
    pub remember_credentials: bool,

    /// How long remembered credentials stay valid.
    pub credentials_ttl: SignedDuration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile_retry: RetryPolicy::new(3, Duration::from_millis(500)),
            auto_login_attempts: 2,
            remember_credentials: false,
            credentials_ttl: SignedDuration::from_hours(7 * 24),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
    previous_points: Option<u64>,
    profile_source: Option<ProfileSource>,
    auto_login_attempts: u32,
    loading: u32,
}

/// Identity and profile owner.
pub struct SessionStore {
    remote: Arc<dyn RemoteService>,
    storage: Storage,
    notifier: Notifier,
    config: SessionConfig,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("config", &self.config)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Open the session persisted in `storage`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] when the store cannot be read.
    pub fn open(
        remote: Arc<dyn RemoteService>,
        storage: Storage,
        notifier: Notifier,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let token = storage.load_or_discard::<String>(StorageKey::Token)?;
        let user = storage.load_or_discard::<User>(StorageKey::User)?;

        Ok(Self {
            remote,
            storage,
            notifier,
            config,
            state: Mutex::new(SessionState {
                token,
                user,
                ..SessionState::default()
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn loading(&self) -> LoadingGuard<'_> {
        self.state().loading += 1;

        LoadingGuard { session: self }
    }

    /// The current user, if known.
    pub fn user(&self) -> Option<User> {
        self.state().user.clone()
    }

    /// Bearer token of the active session.
    pub fn token(&self) -> Option<String> {
        self.state().token.clone()
    }

    /// Whether a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.state().token.is_some()
    }

    /// Whether a restore, login or registration is running.
    pub fn is_loading(&self) -> bool {
        self.state().loading > 0
    }

    /// Where the last profile came from.
    pub fn profile_source(&self) -> Option<ProfileSource> {
        self.state().profile_source
    }

    /// Everything a front end needs to render the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();

        SessionSnapshot {
            user: state.user.clone(),
            authenticated: state.token.is_some(),
            loading: state.loading > 0,
        }
    }

    /// Log in with `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Validation`] for malformed input,
    /// [`SessionError::Auth`] when the backend refuses the credentials and
    /// [`SessionError::Network`] when it cannot be reached.
    pub async fn login(&self, credentials: Credentials) -> Result<User, SessionError> {
        credentials.validate()?;

        let _loading = self.loading();
        let response = self.remote.login(&credentials).await?;

        self.start_session(response, &credentials)
    }

    /// Create an account and log in.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::login`].
    pub async fn register(&self, registration: Registration) -> Result<User, SessionError> {
        registration.validate()?;

        let _loading = self.loading();
        let response = self.remote.register(&registration).await?;

        self.start_session(response, &registration.credentials())
    }

    fn start_session(
        &self,
        response: AuthResponse,
        credentials: &Credentials,
    ) -> Result<User, SessionError> {
        let AuthResponse { access_token, user } = response;

        self.storage.save(StorageKey::Token, &access_token)?;
        self.storage.save(StorageKey::User, &user)?;

        if self.config.remember_credentials {
            let saved =
                SavedCredentials::new(credentials, Timestamp::now(), self.config.credentials_ttl);
            self.storage.save(StorageKey::DevCredentials, &saved)?;
        }

        {
            let mut state = self.state();
            state.token = Some(access_token);
            state.user = Some(user.clone());
            state.auto_login_attempts = 0;
        }

        info!(user_id = %user.id, "logged in");

        Ok(user)
    }

    /// End the session. The cart and remembered credentials are kept.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] when the session cannot be removed
    /// from the store. The in-memory session is cleared regardless.
    pub fn logout(&self) -> Result<(), SessionError> {
        {
            let mut state = self.state();
            state.token = None;
            state.user = None;
            state.previous_points = None;
            state.profile_source = None;
        }

        self.storage.remove(StorageKey::Token)?;
        self.storage.remove(StorageKey::User)?;

        info!("logged out");

        Ok(())
    }

    /// Resolve the current profile, persisted record first.
    ///
    /// Raises a point-change notification when the balance differs from the
    /// last one observed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] when nothing is persisted and
    /// there is no token, or the backend error when the fetch fails.
    pub async fn get_profile(&self) -> Result<User, SessionError> {
        if let Some(user) = self.storage.load_or_discard::<User>(StorageKey::User)? {
            return Ok(self.observe(user, ProfileSource::Cached));
        }

        self.fetch_profile().await
    }

    /// Fetch the profile from the backend, replacing the persisted record.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::get_profile`].
    pub async fn sync_profile(&self) -> Result<User, SessionError> {
        self.fetch_profile().await
    }

    async fn fetch_profile(&self) -> Result<User, SessionError> {
        let token = self.token().ok_or(SessionError::NotAuthenticated)?;
        let user = self.remote.profile(&token).await?;

        self.storage.save(StorageKey::User, &user)?;

        Ok(self.observe(user, ProfileSource::Remote))
    }

    fn observe(&self, user: User, source: ProfileSource) -> User {
        let previous = {
            let mut state = self.state();
            state.user = Some(user.clone());
            state.profile_source = Some(source);
            state.previous_points.replace(user.loyalty_points)
        };

        match previous {
            Some(previous) if user.loyalty_points > previous => {
                self.notifier.notify(Notification::PointsEarned {
                    points: user.loyalty_points - previous,
                });
            }
            Some(previous) if user.loyalty_points < previous => {
                self.notifier.notify(Notification::PointsUsed {
                    points: previous - user.loyalty_points,
                });
            }
            _ => {}
        }

        if source == ProfileSource::Cached {
            debug!(user_id = %user.id, "profile served from local store");
        }

        user
    }

    /// Load the profile, retrying per the configured policy.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ProfileUnavailable`] once retries are
    /// exhausted; the session has been logged out by then.
    pub async fn load_profile(&self) -> Result<User, SessionError> {
        let policy = self.config.profile_retry;
        let mut retry = RetryState::default();

        loop {
            let error = match self.get_profile().await {
                Ok(user) => return Ok(user),
                Err(error) => error,
            };

            match policy.next(retry) {
                RetryDecision::Retry { state, delay } => {
                    warn!(
                        retry = state.retries(),
                        max_retries = policy.max_retries(),
                        %error,
                        "profile load failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    retry = state;
                }
                RetryDecision::Exhausted => {
                    warn!(%error, "profile load failed, logging out");
                    self.logout()?;

                    return Err(SessionError::ProfileUnavailable(Box::new(error)));
                }
            }
        }
    }

    /// Resolve the session at start-up.
    ///
    /// With a token the profile is loaded with retries. Without one, saved
    /// credentials are used for a bounded automatic login.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::load_profile`] and [`SessionStore::auto_login`].
    pub async fn restore(&self) -> Result<Option<User>, SessionError> {
        let _loading = self.loading();

        if self.is_authenticated() {
            return self.load_profile().await.map(Some);
        }

        self.auto_login().await
    }

    /// Log in with remembered credentials.
    ///
    /// Tries at most the configured number of times. When every attempt has
    /// failed the credentials are forgotten.
    ///
    /// # Errors
    ///
    /// Returns the last login error once attempts are exhausted.
    pub async fn auto_login(&self) -> Result<Option<User>, SessionError> {
        loop {
            if self.is_authenticated() {
                return Ok(self.user());
            }

            let Some(saved) = self.saved_credentials()? else {
                return Ok(None);
            };

            let attempt = {
                let mut state = self.state();

                if state.auto_login_attempts >= self.config.auto_login_attempts {
                    return Ok(None);
                }

                state.auto_login_attempts += 1;
                state.auto_login_attempts
            };

            match self.login(saved.credentials()).await {
                Ok(user) => return Ok(Some(user)),
                Err(error) if attempt >= self.config.auto_login_attempts => {
                    warn!(attempt, %error, "automatic login failed, forgetting saved credentials");
                    self.storage.remove(StorageKey::DevCredentials)?;

                    return Err(error);
                }
                Err(error) => {
                    warn!(attempt, %error, "automatic login failed");
                }
            }
        }
    }

    /// Remembered credentials that have not expired. Expired ones are removed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] when the store cannot be accessed.
    pub fn saved_credentials(&self) -> Result<Option<SavedCredentials>, SessionError> {
        let Some(saved) = self
            .storage
            .load_or_discard::<SavedCredentials>(StorageKey::DevCredentials)?
        else {
            return Ok(None);
        };

        if saved.is_valid_at(Timestamp::now()) {
            return Ok(Some(saved));
        }

        debug!("saved credentials expired");
        self.storage.remove(StorageKey::DevCredentials)?;

        Ok(None)
    }

    /// The balance held in the persisted user record.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] when there is no user.
    pub fn current_points(&self) -> Result<u64, SessionError> {
        self.latest_user().map(|user| user.loyalty_points)
    }

    fn latest_user(&self) -> Result<User, SessionError> {
        match self.storage.load_or_discard::<User>(StorageKey::User)? {
            Some(user) => Ok(user),
            None => self.user().ok_or(SessionError::NotAuthenticated),
        }
    }

    /// Spend `used` and add `earned` points on the latest persisted balance.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InsufficientPoints`] when `used` exceeds the
    /// balance. Nothing is written in that case.
    pub fn commit_points(&self, used: u64, earned: u64) -> Result<User, SessionError> {
        let mut user = self.latest_user()?;

        let remaining = user
            .loyalty_points
            .checked_sub(used)
            .ok_or(SessionError::InsufficientPoints {
                available: user.loyalty_points,
                required: used,
            })?;

        user.loyalty_points = remaining.saturating_add(earned);

        self.storage.save(StorageKey::User, &user)?;
        self.state().user = Some(user.clone());

        debug!(used, earned, balance = user.loyalty_points, "points committed");

        Ok(user)
    }

    /// Replace the persisted user record, e.g. from a backup.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] when the record cannot be written.
    pub fn replace_user(&self, user: &User) -> Result<(), SessionError> {
        self.storage.save(StorageKey::User, user)?;

        Ok(())
    }
}

struct LoadingGuard<'a> {
    session: &'a SessionStore,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.session.state();
        state.loading = state.loading.saturating_sub(1);
    }
}
