//! Backup
//!
//! Exports the order history, point history and user record through a
//! [`TabularCodec`] and imports them again. Imported rows are decoded into the
//! domain types before anything is written, so a bad file never replaces good
//! data.

use std::{fmt, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    codec::{self, CodecError, CsvCodec, TabularCodec},
    domain::{
        loyalty::models::PointHistoryEntry,
        orders::models::Order,
        session::{SessionError, SessionStore, models::User},
    },
    storage::{Storage, StorageKey, StoreError},
};

/// Data that can be backed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Dataset {
    /// The order history.
    Orders,

    /// The loyalty point history.
    PointHistory,

    /// The signed-in user record.
    User,
}

impl Dataset {
    /// Every dataset, in export order.
    pub const ALL: [Self; 3] = [Self::Orders, Self::PointHistory, Self::User];

    /// The store key holding this dataset.
    pub fn key(self) -> StorageKey {
        match self {
            Self::Orders => StorageKey::UserOrders,
            Self::PointHistory => StorageKey::PointHistory,
            Self::User => StorageKey::User,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Orders => "orders",
            Self::PointHistory => "point-history",
            Self::User => "user",
        })
    }
}

/// Errors raised while exporting or importing a dataset.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The text is not well-formed for the codec.
    #[error("could not encode or decode backup data")]
    Codec(#[from] CodecError),

    /// The records do not describe the dataset's type.
    #[error("backup does not contain valid {dataset} records")]
    Validation {
        /// Dataset being imported.
        dataset: Dataset,
        /// Why the records were rejected.
        #[source]
        source: CodecError,
    },

    /// No user record to export or import.
    #[error("backup does not contain a user record")]
    NoUserRecord,

    /// The store could not be read or written.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The imported user could not be made current.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Exports and imports persisted datasets.
pub struct Backup<C = CsvCodec> {
    storage: Storage,
    session: Arc<SessionStore>,
    codec: C,
}

impl<C> fmt::Debug for Backup<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backup").finish_non_exhaustive()
    }
}

impl Backup<CsvCodec> {
    /// Backups as CSV.
    #[must_use]
    pub fn csv(storage: Storage, session: Arc<SessionStore>) -> Self {
        Self::new(storage, session, CsvCodec)
    }
}

impl<C: TabularCodec> Backup<C> {
    /// Backups through `codec`.
    #[must_use]
    pub fn new(storage: Storage, session: Arc<SessionStore>, codec: C) -> Self {
        Self {
            storage,
            session,
            codec,
        }
    }

    /// Encode `dataset` as text.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::NoUserRecord`] when exporting the user while
    /// signed out, or a storage or codec error.
    pub fn export(&self, dataset: Dataset) -> Result<String, BackupError> {
        match dataset {
            Dataset::Orders => self.export_list::<Order>(dataset),
            Dataset::PointHistory => self.export_list::<PointHistoryEntry>(dataset),
            Dataset::User => {
                let user = self
                    .storage
                    .load::<User>(StorageKey::User)?
                    .ok_or(BackupError::NoUserRecord)?;

                Ok(self.codec.encode(&codec::to_records(&[user])?)?)
            }
        }
    }

    fn export_list<T: Serialize + DeserializeOwned>(
        &self,
        dataset: Dataset,
    ) -> Result<String, BackupError> {
        let values: Vec<T> = self.storage.load_list(dataset.key())?;

        Ok(self.codec.encode(&codec::to_records(&values)?)?)
    }

    /// Replace `dataset` with the records in `text`. Returns the number of
    /// records written.
    ///
    /// Importing a user record refreshes the session profile, which raises a
    /// point-change notification when the balance moved.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Validation`] when the records do not decode into
    /// the dataset's type and [`BackupError::NoUserRecord`] for a user import
    /// without rows. Nothing is written in either case.
    pub async fn import(&self, dataset: Dataset, text: &str) -> Result<usize, BackupError> {
        let records = self.codec.decode(text)?;

        let count = match dataset {
            Dataset::Orders => {
                let orders: Vec<Order> = validate(dataset, records)?;
                self.storage.save(dataset.key(), &orders)?;
                orders.len()
            }
            Dataset::PointHistory => {
                let entries: Vec<PointHistoryEntry> = validate(dataset, records)?;
                self.storage.save(dataset.key(), &entries)?;
                entries.len()
            }
            Dataset::User => {
                let users: Vec<User> = validate(dataset, records)?;
                let user = users.into_iter().next().ok_or(BackupError::NoUserRecord)?;

                self.session.replace_user(&user)?;

                if let Err(error) = self.session.get_profile().await {
                    warn!(%error, "profile refresh after import failed");
                }

                1
            }
        };

        info!(%dataset, count, "backup imported");

        Ok(count)
    }
}

fn validate<T: DeserializeOwned>(
    dataset: Dataset,
    records: Vec<codec::Record>,
) -> Result<Vec<T>, BackupError> {
    codec::from_records(records).map_err(|source| BackupError::Validation { dataset, source })
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use super::*;
    use crate::{
        domain::{
            orders::models::{OrderLine, OrderStatus},
            session::SessionConfig,
        },
        ids::{OrderId, ProductId, UserId},
        notifications::{self, Notification, Notifier},
        prices::Price,
        remote::MockRemoteService,
    };

    fn backup() -> TestResult<(Backup, Storage, notifications::NotificationReceiver)> {
        let storage = Storage::in_memory();
        let (notifier, receiver) = Notifier::channel();
        let session = SessionStore::open(
            Arc::new(MockRemoteService::new()),
            storage.clone(),
            notifier,
            SessionConfig::default(),
        )?;

        Ok((Backup::csv(storage.clone(), Arc::new(session)), storage, receiver))
    }

    fn user(points: u64) -> User {
        User {
            id: UserId(3),
            username: "bea".to_string(),
            email: "bea@example.com".to_string(),
            first_name: "Bea".to_string(),
            last_name: String::new(),
            loyalty_points: points,
        }
    }

    #[tokio::test]
    async fn orders_survive_export_and_import() -> TestResult {
        let (backup, storage, _receiver) = backup()?;

        let order = Order {
            id: OrderId(1_714_557_600_000),
            order_date: Timestamp::from_second(1_714_557_600)?,
            status: OrderStatus::Completed,
            total_amount: Price::new(1250),
            items_count: 2,
            points_earned: 12,
            points_used: 0,
            items: vec![OrderLine {
                product_id: ProductId(4),
                quantity: 2,
                customizations: [("milk".to_string(), "oat".to_string())].into(),
                notes: "extra hot".to_string(),
            }],
            table_number: Some(7),
        };
        storage.save(StorageKey::UserOrders, &[order.clone()])?;

        let text = backup.export(Dataset::Orders)?;
        storage.remove(StorageKey::UserOrders)?;

        assert_eq!(backup.import(Dataset::Orders, &text).await?, 1);
        assert_eq!(storage.load_list::<Order>(StorageKey::UserOrders)?, vec![order]);

        Ok(())
    }

    #[tokio::test]
    async fn invalid_rows_are_rejected_without_writing() -> TestResult {
        let (backup, storage, _receiver) = backup()?;

        let entry = PointHistoryEntry {
            order_id: OrderId(9),
            date: Timestamp::UNIX_EPOCH,
            points_earned: 4,
            points_used: 0,
            redemption_code: None,
            reward_name: None,
        };
        storage.save(StorageKey::PointHistory, &[entry.clone()])?;

        let result = backup
            .import(Dataset::PointHistory, "order_id,date\n\"abc\",\"yesterday\"")
            .await;

        assert!(
            matches!(
                result,
                Err(BackupError::Validation {
                    dataset: Dataset::PointHistory,
                    ..
                })
            ),
            "expected a validation error, got {result:?}"
        );
        assert_eq!(
            storage.load_list::<PointHistoryEntry>(StorageKey::PointHistory)?,
            vec![entry]
        );

        Ok(())
    }

    #[tokio::test]
    async fn user_import_refreshes_profile() -> TestResult {
        let (backup, storage, mut receiver) = backup()?;
        storage.save(StorageKey::User, &user(10))?;
        backup.session.get_profile().await?;

        let text = backup.export(Dataset::User)?;
        let text = text.replace(",10", ",25");

        assert_eq!(backup.import(Dataset::User, &text).await?, 1);

        assert_eq!(
            storage
                .load::<User>(StorageKey::User)?
                .map(|user| user.loyalty_points),
            Some(25)
        );
        assert_eq!(
            notifications::drain(&mut receiver),
            vec![Notification::PointsEarned { points: 15 }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn empty_user_import_is_rejected() -> TestResult {
        let (backup, _storage, _receiver) = backup()?;

        let result = backup.import(Dataset::User, "").await;

        assert!(
            matches!(result, Err(BackupError::NoUserRecord)),
            "expected NoUserRecord, got {result:?}"
        );
        assert!(
            matches!(backup.export(Dataset::User), Err(BackupError::NoUserRecord)),
            "nothing to export while signed out"
        );

        Ok(())
    }
}
