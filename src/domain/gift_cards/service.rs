//! Gift card service.
//!
//! Gift cards live only on the backend. Every call needs a session and any
//! backend failure is reported to the caller as is.

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::{
    domain::{
        gift_cards::{
            errors::GiftCardError,
            models::{GiftCards, IssuedGiftCard, NewGiftCard, RedeemedGiftCard},
        },
        session::SessionStore,
    },
    notifications::Notifier,
    remote::RemoteService,
};

/// Buying, listing and redeeming gift cards.
pub struct GiftCardService {
    remote: Arc<dyn RemoteService>,
    session: Arc<SessionStore>,
    notifier: Notifier,
}

impl std::fmt::Debug for GiftCardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiftCardService").finish_non_exhaustive()
    }
}

impl GiftCardService {
    /// Gift cards for the user behind `session`.
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteService>,
        session: Arc<SessionStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            remote,
            session,
            notifier,
        }
    }

    /// Buy a gift card for `card.receiver_email`.
    ///
    /// # Errors
    ///
    /// Returns [`GiftCardError::Validation`] for a zero amount or malformed
    /// email, [`GiftCardError::NotAuthenticated`] without a session and
    /// [`GiftCardError::Rejected`] or [`GiftCardError::Unavailable`] when the
    /// backend refuses or fails.
    pub async fn send(&self, card: NewGiftCard) -> Result<IssuedGiftCard, GiftCardError> {
        card.validate()?;

        let token = self.token()?;
        let issued = self.remote.create_gift_card(&token, &card).await?;

        info!(gift_card_id = %issued.id, amount = %issued.amount, "gift card sent");

        self.notifier.success(format!(
            "Gift card sent successfully! {} to {}, code {}.",
            issued.amount, issued.receiver_email, issued.code
        ));

        Ok(issued)
    }

    /// Gift cards the user sent and received.
    ///
    /// # Errors
    ///
    /// See [`GiftCardService::send`].
    pub async fn list(&self) -> Result<GiftCards, GiftCardError> {
        let token = self.token()?;

        Ok(self.remote.gift_cards(&token).await?)
    }

    /// Redeem the card with `code`. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GiftCardError::MissingCode`] for a blank code and
    /// [`GiftCardError::Rejected`] with the backend's reason when the card is
    /// unknown, already redeemed or expired.
    pub async fn redeem(&self, code: &str) -> Result<RedeemedGiftCard, GiftCardError> {
        let code = code.trim();

        if code.is_empty() {
            return Err(GiftCardError::MissingCode);
        }

        let token = self.token()?;
        let redeemed = self.remote.redeem_gift_card(&token, code).await?;

        info!(gift_card_id = %redeemed.id, amount = %redeemed.amount, "gift card redeemed");

        self.notifier.success(format!(
            "Gift card redeemed successfully! {} added.",
            redeemed.amount
        ));

        Ok(redeemed)
    }

    fn token(&self) -> Result<String, GiftCardError> {
        self.session.token().ok_or(GiftCardError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use jiff::{Timestamp, civil::date};
    use testresult::TestResult;

    use super::*;
    use crate::{
        domain::session::SessionConfig,
        ids::GiftCardId,
        notifications::{self, Notification, NotificationReceiver},
        prices::Price,
        remote::{MockRemoteService, RemoteError},
        storage::{Storage, StorageKey},
    };

    fn service(
        remote: MockRemoteService,
        signed_in: bool,
    ) -> TestResult<(GiftCardService, NotificationReceiver)> {
        let storage = Storage::in_memory();

        if signed_in {
            storage.save(StorageKey::Token, "tok")?;
        }

        let remote: Arc<dyn RemoteService> = Arc::new(remote);
        let (notifier, receiver) = Notifier::channel();
        let session = Arc::new(SessionStore::open(
            remote.clone(),
            storage,
            Notifier::disabled(),
            SessionConfig::default(),
        )?);

        Ok((GiftCardService::new(remote, session, notifier), receiver))
    }

    fn card(cents: u64) -> NewGiftCard {
        NewGiftCard {
            amount: Price::new(cents),
            receiver_email: "bea@example.com".to_string(),
            message: "Happy birthday".to_string(),
        }
    }

    #[tokio::test]
    async fn send_validates_before_calling_the_backend() -> TestResult {
        let mut remote = MockRemoteService::new();
        remote.expect_create_gift_card().never();

        let (service, _receiver) = service(remote, true)?;

        let result = service.send(card(0)).await;

        assert!(
            matches!(result, Err(GiftCardError::Validation(_))),
            "expected a validation error, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn send_reports_the_issued_code() -> TestResult {
        let mut remote = MockRemoteService::new();
        remote
            .expect_create_gift_card()
            .withf(|token, card| token == "tok" && card.amount == Price::new(2500))
            .times(1)
            .returning(|_, card| {
                Ok(IssuedGiftCard {
                    id: GiftCardId(4),
                    code: "GC-ABCD1234".to_string(),
                    amount: card.amount,
                    receiver_email: card.receiver_email.clone(),
                    expiration_date: date(2025, 5, 1),
                })
            });

        let (service, mut receiver) = service(remote, true)?;

        let issued = service.send(card(2500)).await?;

        assert_eq!(issued.code, "GC-ABCD1234");
        assert_eq!(
            notifications::drain(&mut receiver),
            vec![Notification::Success {
                message: "Gift card sent successfully! $25.00 to bea@example.com, code GC-ABCD1234."
                    .to_string()
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn signed_out_user_cannot_list() -> TestResult {
        let mut remote = MockRemoteService::new();
        remote.expect_gift_cards().never();

        let (service, _receiver) = service(remote, false)?;

        let result = service.list().await;

        assert!(
            matches!(result, Err(GiftCardError::NotAuthenticated)),
            "expected NotAuthenticated, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unreachable_backend_is_disclosed() -> TestResult {
        let mut remote = MockRemoteService::new();
        remote
            .expect_gift_cards()
            .returning(|_| Err(RemoteError::Timeout));

        let (service, mut receiver) = service(remote, true)?;

        let result = service.list().await;

        assert!(
            matches!(result, Err(GiftCardError::Unavailable(RemoteError::Timeout))),
            "expected Unavailable, got {result:?}"
        );
        assert!(
            notifications::drain(&mut receiver).is_empty(),
            "no made-up success"
        );

        Ok(())
    }

    #[tokio::test]
    async fn redeem_trims_code_and_surfaces_rejections() -> TestResult {
        let mut remote = MockRemoteService::new();
        remote
            .expect_redeem_gift_card()
            .withf(|_, code| code == "GC-USED0000")
            .returning(|_, _| {
                Err(RemoteError::Status {
                    status: 400,
                    message: "Gift card has already been redeemed".to_string(),
                })
            });

        let (service, _receiver) = service(remote, true)?;

        let result = service.redeem("  GC-USED0000 ").await;

        assert_eq!(
            result.map_err(|error| error.to_string()).err().as_deref(),
            Some("Gift card has already been redeemed")
        );

        Ok(())
    }

    #[tokio::test]
    async fn blank_code_is_rejected_locally() -> TestResult {
        let mut remote = MockRemoteService::new();
        remote.expect_redeem_gift_card().never();

        let (service, _receiver) = service(remote, true)?;

        let result = service.redeem("   ").await;

        assert!(
            matches!(result, Err(GiftCardError::MissingCode)),
            "expected MissingCode, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn redeem_announces_the_amount() -> TestResult {
        let mut remote = MockRemoteService::new();
        remote.expect_redeem_gift_card().returning(|_, _| {
            Ok(RedeemedGiftCard {
                id: GiftCardId(2),
                amount: Price::new(1000),
                redeemed_at: Timestamp::UNIX_EPOCH,
            })
        });

        let (service, mut receiver) = service(remote, true)?;

        service.redeem("GC-BBBB2222").await?;

        assert_eq!(
            notifications::drain(&mut receiver),
            vec![Notification::Success {
                message: "Gift card redeemed successfully! $10.00 added.".to_string()
            }]
        );

        Ok(())
    }
}
