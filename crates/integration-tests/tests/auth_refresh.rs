//! Credential renewal behavior against the mock backend.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;
use std::time::Duration;

use jacaranda_client::{ApiError, Credentials};
use jacaranda_core::Email;
use jacaranda_integration_tests::MockShop;

async fn logged_in(mock: &MockShop) -> jacaranda_client::Shop {
    let shop = mock.shop();
    shop.session
        .login(Credentials::new(
            Email::parse("ana@example.com").unwrap(),
            "secret",
        ))
        .await
        .unwrap();
    shop
}

#[tokio::test]
async fn test_expired_credential_is_renewed_transparently() {
    let mock = MockShop::spawn().await;
    let shop = logged_in(&mock).await;

    mock.state.invalidate_sessions();

    let orders = shop.orders.history().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(mock.state.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let mock = MockShop::spawn().await;
    let shop = logged_in(&mock).await;

    mock.state.invalidate_sessions();
    mock.state.set_refresh_delay(Duration::from_millis(150));

    let (a, b, c) = tokio::join!(
        shop.orders.history(),
        shop.orders.history(),
        shop.orders.history(),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(mock.state.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_renewal_rejects_every_queued_request() {
    let mock = MockShop::spawn().await;
    let shop = logged_in(&mock).await;
    let mut unauthorized = shop.api.subscribe_unauthorized();

    mock.state.invalidate_sessions();
    mock.state.fail_refreshes();
    mock.state.set_refresh_delay(Duration::from_millis(150));

    let (a, b, c) = tokio::join!(
        shop.orders.history(),
        shop.orders.history(),
        shop.orders.history(),
    );

    for outcome in [a, b, c] {
        assert!(matches!(outcome, Err(ApiError::SessionExpired)));
    }
    // One renewal attempt, one global signal for the whole batch.
    assert_eq!(mock.state.refresh_calls.load(Ordering::SeqCst), 1);
    assert!(unauthorized.try_recv().is_ok());
    assert!(unauthorized.try_recv().is_err());
}

#[tokio::test]
async fn test_unauthorized_signal_tears_down_the_session() {
    let mock = MockShop::spawn().await;
    let shop = logged_in(&mock).await;
    let watcher = shop.session.watch_unauthorized();
    assert!(shop.session.is_authenticated());

    mock.state.invalidate_sessions();
    mock.state.fail_refreshes();

    let outcome = shop.orders.history().await;
    assert!(matches!(outcome, Err(ApiError::SessionExpired)));

    // Give the watcher task a moment to consume the broadcast.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!shop.session.is_authenticated());
    assert!(shop.cart.is_empty());
    watcher.abort();
}

#[tokio::test]
async fn test_session_expires_without_an_explicit_watcher() {
    let mock = MockShop::spawn().await;
    // Construction inside the runtime wires the watcher; no further
    // setup by the caller.
    let shop = logged_in(&mock).await;

    mock.state.invalidate_sessions();
    mock.state.fail_refreshes();

    let outcome = shop.orders.history().await;
    assert!(matches!(outcome, Err(ApiError::SessionExpired)));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!shop.session.is_authenticated());
}

#[tokio::test]
async fn test_non_401_errors_pass_through_without_renewal() {
    let mock = MockShop::spawn().await;
    let shop = mock.shop();

    let outcome = shop.catalog.product_by_slug("no-such-product").await;
    match outcome {
        Err(ApiError::Http { status, payload }) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(payload["message"], "Product not found");
        }
        other => panic!("expected a 404, got {other:?}"),
    }
    assert_eq!(mock.state.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_replayed_401_cannot_recurse_into_another_renewal() {
    let mock = MockShop::spawn().await;
    let shop = mock.shop();

    // Wrong password: the initial 401 triggers one renewal, the replay
    // 401s again and must surface as a plain HTTP error.
    let outcome = shop
        .session
        .login(Credentials::new(
            Email::parse("ana@example.com").unwrap(),
            "wrong",
        ))
        .await;

    match outcome {
        Err(ApiError::Http { status, .. }) => assert_eq!(status.as_u16(), 401),
        other => panic!("expected a replayed 401, got {other:?}"),
    }
    assert!(!shop.session.is_authenticated());
    assert_eq!(mock.state.refresh_calls.load(Ordering::SeqCst), 1);
}
