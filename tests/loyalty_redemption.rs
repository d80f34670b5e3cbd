//! Integration tests for reward redemption

use std::sync::Arc;

use testresult::TestResult;

use barista::{prelude::*, remote::MockRemoteService};

fn app_with_balance(points: u64) -> TestResult<AppContext> {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let storage = Storage::new(store.clone());

    storage.save(StorageKey::Token, "tok")?;
    storage.save(
        StorageKey::User,
        &User {
            id: UserId(9),
            username: "caio".to_string(),
            email: "caio@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            loyalty_points: points,
        },
    )?;

    let mut remote = MockRemoteService::new();
    remote.expect_profile().never();

    Ok(AppContext::build(
        store,
        Arc::new(remote),
        Notifier::disabled(),
        SessionConfig::default(),
    )?)
}

#[tokio::test]
async fn redemption_beyond_balance_changes_nothing() -> TestResult {
    let app = app_with_balance(30)?;

    let result = app.ledger.redeem("Free Coffee").await;

    assert!(
        matches!(
            result,
            Err(LedgerError::InsufficientPoints {
                required: 50,
                available: 30
            })
        ),
        "expected InsufficientPoints, got {result:?}"
    );
    assert_eq!(app.session.current_points()?, 30);
    assert!(app.ledger.history()?.data.is_empty(), "no entry appended");

    Ok(())
}

#[tokio::test]
async fn redemption_spends_exact_cost_and_records_code() -> TestResult {
    let app = app_with_balance(30)?;

    let outcome = app.ledger.redeem("3").await?;

    assert_eq!(outcome.reward.name, "10% Discount");
    assert_eq!(outcome.remaining_points, 0);
    assert_eq!(app.session.current_points()?, 0);

    let history = app.ledger.history()?.data;
    assert_eq!(history, vec![outcome.entry.clone()]);
    assert!(
        outcome
            .message()
            .starts_with("Successfully redeemed 10% Discount! Your code is REDEEM-"),
        "{}",
        outcome.message()
    );

    let rewards = app.ledger.rewards()?;
    assert!(
        rewards.iter().all(|reward| !reward.is_available),
        "nothing is affordable at zero points"
    );

    Ok(())
}

#[tokio::test]
async fn redemption_requires_a_user() -> TestResult {
    let app = app_with_balance(500)?;
    app.session.logout()?;

    let result = app.ledger.redeem("Free Pastry").await;

    assert!(
        matches!(result, Err(LedgerError::NotAuthenticated)),
        "expected NotAuthenticated, got {result:?}"
    );

    Ok(())
}
