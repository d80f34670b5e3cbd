//! Barista prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    backup::{Backup, BackupError, Dataset},
    codec::{CodecError, CsvCodec, Record, TabularCodec},
    context::{AppContext, AppInitError},
    domain::{
        DataSource, Sourced,
        cart::{
            CartError, CartStore, CartTotals,
            models::{
                CartItem, CartItemId, CartSnapshotItem, Customizations, NewCartItem, Product,
            },
        },
        checkout::{
            CheckoutError, CheckoutWorkflow, FallbackError,
            models::{CheckoutOutcome, OutcomeSource},
        },
        gift_cards::{
            GiftCardError, GiftCardService,
            models::{
                GiftCards, IssuedGiftCard, NewGiftCard, ReceivedGiftCard, RedeemedGiftCard,
                SentGiftCard,
            },
        },
        loyalty::{
            Ledger, LedgerError, RewardCatalog,
            models::{NextReward, PointHistoryEntry, RedemptionOutcome, Reward, RewardDefinition},
        },
        orders::{
            OrderHistory, OrdersError,
            models::{Order, OrderLine, OrderRequest, OrderStatus},
        },
        products::{ProductCatalog, ProductsError},
        session::{
            SessionConfig, SessionError, SessionStore,
            models::{Credentials, Registration, User},
        },
    },
    ids::{GiftCardId, OrderId, ProductId, UserId},
    notifications::{Notification, Notifier},
    prices::Price,
    remote::{HttpRemoteConfig, HttpRemoteService, RemoteError, RemoteService},
    retry::RetryPolicy,
    storage::{FileStore, KeyValueStore, MemoryStore, Storage, StorageKey, StoreError},
};
