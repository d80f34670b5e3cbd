//! Loyalty ledger service.
//!
//! The point history is append-only and newest first. Balances live on the
//! user record owned by the session; the ledger only moves them through
//! [`SessionStore::commit_points`].

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use jiff::Timestamp;
use rand::{Rng, seq::SliceRandom};
use tracing::{info, warn};

use crate::{
    domain::{
        Sourced,
        loyalty::{
            catalog::RewardCatalog,
            errors::LedgerError,
            models::{NextReward, PointHistoryEntry, RedemptionOutcome, Reward},
        },
        orders::models::Order,
        session::SessionStore,
    },
    ids::OrderId,
    notifications::Notifier,
    storage::{Storage, StorageKey},
};

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 6;

/// Generate a `REDEEM-XXXXXX` code.
pub fn generate_redemption_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..CODE_LENGTH)
        .filter_map(|_| CODE_CHARSET.choose(rng))
        .map(|&byte| char::from(byte))
        .collect();

    format!("REDEEM-{suffix}")
}

/// Point history and reward redemption.
#[derive(Debug)]
pub struct Ledger {
    storage: Storage,
    session: Arc<SessionStore>,
    catalog: RewardCatalog,
    notifier: Notifier,
    redeeming: AtomicBool,
}

impl Ledger {
    /// Ledger over the point history in `storage`.
    #[must_use]
    pub fn new(
        storage: Storage,
        session: Arc<SessionStore>,
        catalog: RewardCatalog,
        notifier: Notifier,
    ) -> Self {
        Self {
            storage,
            session,
            catalog,
            notifier,
            redeeming: AtomicBool::new(false),
        }
    }

    /// The reward catalog.
    pub fn catalog(&self) -> &RewardCatalog {
        &self.catalog
    }

    /// Record the points movement of `order`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] when the history cannot be updated.
    pub fn record_order(&self, order: &Order) -> Result<PointHistoryEntry, LedgerError> {
        let entry = PointHistoryEntry::from(order);

        self.storage.prepend(StorageKey::PointHistory, entry.clone())?;

        Ok(entry)
    }

    /// The point history, newest first, disclosed as local data.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] when the history cannot be read.
    pub fn history(&self) -> Result<Sourced<Vec<PointHistoryEntry>>, LedgerError> {
        Ok(Sourced::local(
            self.storage.load_list(StorageKey::PointHistory)?,
        ))
    }

    /// Replace the whole point history.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] when the history cannot be written.
    pub fn replace_history(&self, entries: &[PointHistoryEntry]) -> Result<(), LedgerError> {
        self.storage.save(StorageKey::PointHistory, entries)?;

        Ok(())
    }

    /// Every reward, with availability for the current balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotAuthenticated`] without a user.
    pub fn rewards(&self) -> Result<Vec<Reward>, LedgerError> {
        Ok(self.catalog.evaluate(self.session.current_points()?))
    }

    /// The cheapest reward the user cannot afford yet.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotAuthenticated`] without a user.
    pub fn next_reward(&self) -> Result<Option<NextReward>, LedgerError> {
        Ok(self.catalog.next_reward(self.session.current_points()?))
    }

    /// Redeem the reward identified by `key` (id or name).
    ///
    /// The balance is checked against the persisted user record at commit
    /// time, not against whatever availability was last displayed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientPoints`] when the balance is too
    /// low, [`LedgerError::RewardNotFound`] for an unknown reward and
    /// [`LedgerError::RedemptionInProgress`] while another redemption runs.
    pub async fn redeem(&self, key: &str) -> Result<RedemptionOutcome, LedgerError> {
        let _guard =
            RedeemGuard::acquire(&self.redeeming).ok_or(LedgerError::RedemptionInProgress)?;

        let definition = self
            .catalog
            .find(key)
            .ok_or_else(|| LedgerError::RewardNotFound(key.to_string()))?
            .clone();

        let available = self.session.current_points()?;

        if available < definition.points_required {
            return Err(LedgerError::InsufficientPoints {
                required: definition.points_required,
                available,
            });
        }

        let code = generate_redemption_code(&mut rand::thread_rng());

        let user = self.session.commit_points(definition.points_required, 0)?;

        let entry = PointHistoryEntry {
            order_id: OrderId(0),
            date: Timestamp::now(),
            points_earned: 0,
            points_used: definition.points_required,
            redemption_code: Some(code.clone()),
            reward_name: Some(definition.name.clone()),
        };

        if let Err(error) = self.storage.prepend(StorageKey::PointHistory, entry.clone()) {
            warn!(%error, "could not record redemption, refunding points");
            self.session.commit_points(0, definition.points_required)?;

            return Err(error.into());
        }

        if let Err(error) = self.session.get_profile().await {
            warn!(%error, "profile refresh after redemption failed");
        }

        info!(
            reward = %definition.name,
            points_used = definition.points_required,
            balance = user.loyalty_points,
            "reward redeemed"
        );

        let outcome = RedemptionOutcome {
            reward: Reward::evaluate(&definition, user.loyalty_points),
            code,
            entry,
            remaining_points: user.loyalty_points,
        };

        self.notifier.success(outcome.message());

        Ok(outcome)
    }
}

struct RedeemGuard<'a>(&'a AtomicBool);

impl<'a> RedeemGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RedeemGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use testresult::TestResult;

    use super::*;
    use crate::{
        domain::session::{SessionConfig, models::User},
        ids::UserId,
        notifications::{self, Notification, NotificationReceiver},
        remote::MockRemoteService,
    };

    fn ledger_with_balance(points: u64) -> TestResult<(Ledger, Storage, NotificationReceiver)> {
        let storage = Storage::in_memory();
        storage.save(
            StorageKey::User,
            &User {
                id: UserId(1),
                username: "ana".to_string(),
                email: "ana@example.com".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                loyalty_points: points,
            },
        )?;

        let (notifier, receiver) = Notifier::channel();
        let session = SessionStore::open(
            Arc::new(MockRemoteService::new()),
            storage.clone(),
            notifier.clone(),
            SessionConfig::default(),
        )?;

        let ledger = Ledger::new(
            storage.clone(),
            Arc::new(session),
            RewardCatalog::builtin()?,
            notifier,
        );

        Ok((ledger, storage, receiver))
    }

    #[test]
    fn codes_have_the_expected_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let code = generate_redemption_code(&mut rng);

        let suffix = code.strip_prefix("REDEEM-").unwrap_or_default();

        assert_eq!(suffix.len(), 6);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
            "unexpected code {code}"
        );
    }

    #[tokio::test]
    async fn redeem_deducts_points_and_records_entry() -> TestResult {
        let (ledger, _storage, mut receiver) = ledger_with_balance(80)?;

        let outcome = ledger.redeem("Free Coffee").await?;

        assert_eq!(outcome.remaining_points, 30);
        assert!(outcome.code.starts_with("REDEEM-"), "{}", outcome.code);

        let history = ledger.history()?.data;
        let entry = history.first().ok_or("expected a history entry")?;

        assert!(entry.is_redemption(), "entry should be a redemption");
        assert_eq!(entry.points_used, 50);
        assert_eq!(entry.reward_name.as_deref(), Some("Free Coffee"));
        assert_eq!(entry.redemption_code.as_deref(), Some(outcome.code.as_str()));

        assert!(
            notifications::drain(&mut receiver)
                .iter()
                .any(|notification| matches!(notification, Notification::Success { .. })),
            "expected a success notification"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_reward_is_rejected() -> TestResult {
        let (ledger, _storage, _receiver) = ledger_with_balance(500)?;

        let result = ledger.redeem("Espresso Machine").await;

        assert!(
            matches!(result, Err(LedgerError::RewardNotFound(_))),
            "expected RewardNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn balance_is_rechecked_at_commit_time() -> TestResult {
        let (ledger, storage, _receiver) = ledger_with_balance(100)?;

        let rewards = ledger.rewards()?;
        assert!(
            rewards.iter().all(|reward| reward.is_available),
            "everything is affordable at 100 points"
        );

        let mut user: User = storage.load(StorageKey::User)?.ok_or("expected user")?;
        user.loyalty_points = 20;
        storage.save(StorageKey::User, &user)?;

        let result = ledger.redeem("Breakfast Special").await;

        assert!(
            matches!(
                result,
                Err(LedgerError::InsufficientPoints {
                    required: 100,
                    available: 20
                })
            ),
            "expected InsufficientPoints, got {result:?}"
        );
        assert!(ledger.history()?.data.is_empty(), "no entry on failure");

        Ok(())
    }

    #[test]
    fn next_reward_uses_current_balance() -> TestResult {
        let (ledger, _storage, _receiver) = ledger_with_balance(40)?;

        let next = ledger.next_reward()?.ok_or("expected a next reward")?;

        assert_eq!(next.reward.name, "Free Coffee");
        assert_eq!(next.points_needed, 10);

        Ok(())
    }
}
