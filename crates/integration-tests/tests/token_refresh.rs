//! The one-shot refresh-and-retry contract of the request client.
//!
//! Run with: `cargo test -p anycart-integration-tests`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::Ordering;
use std::time::Duration;

use anycart_client::Session;
use anycart_integration_tests::{REFRESH_TOKEN, REFRESHED_ACCESS, TestContext};

#[tokio::test]
async fn valid_token_needs_no_refresh() {
    let ctx = TestContext::new().await;
    ctx.seed_valid_session();

    let me = ctx.client.me().await.expect("request should succeed");
    assert_eq!(me.first_name, "Ada");

    assert_eq!(ctx.state.me_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.state.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn expired_token_is_refreshed_and_retried_exactly_once() {
    let ctx = TestContext::new().await;
    ctx.seed_stale_session();

    let me = ctx
        .client
        .me()
        .await
        .expect("retried request should succeed with the refreshed token");
    assert_eq!(me.first_name, "Ada");

    assert_eq!(ctx.state.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.state.me_calls.load(Ordering::SeqCst), 2);

    // The refresh updated only the access token; refresh stayed untouched.
    let session = ctx.session.get().unwrap();
    assert_eq!(session.access, REFRESHED_ACCESS);
    assert_eq!(session.refresh, REFRESH_TOKEN);
}

#[tokio::test]
async fn failed_refresh_propagates_the_original_401() {
    let ctx = TestContext::new().await;
    ctx.seed_stale_session();
    ctx.state.refresh_ok.store(false, Ordering::SeqCst);

    let err = ctx.client.me().await.expect_err("request should fail");
    assert!(err.is_unauthorized(), "got: {err}");

    // One refresh attempt, no retry of the original request.
    assert_eq!(ctx.state.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.state.me_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn second_401_does_not_trigger_a_second_refresh() {
    let ctx = TestContext::new().await;
    ctx.seed_stale_session();
    // The refresh succeeds but the backend keeps rejecting the new token,
    // so the single retry also 401s.
    ctx.state.refresh_grants_valid.store(false, Ordering::SeqCst);

    let err = ctx.client.me().await.expect_err("request should fail");
    assert!(err.is_unauthorized(), "got: {err}");

    assert_eq!(ctx.state.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.state.me_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_refresh_token_fails_without_a_network_call() {
    let ctx = TestContext::new().await;
    ctx.session.set(&Session::from_tokens(
        "stale-access".to_owned(),
        String::new(),
    ));

    let err = ctx.client.me().await.expect_err("request should fail");
    assert!(err.is_unauthorized(), "got: {err}");

    assert_eq!(ctx.state.refresh_calls.load(Ordering::SeqCst), 0);
    assert_eq!(ctx.state.me_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_401s_coalesce_into_one_refresh() {
    let ctx = TestContext::new().await;
    ctx.seed_stale_session();

    let (a, b) = tokio::join!(ctx.client.me(), ctx.client.me());
    a.expect("first concurrent request should succeed");
    b.expect("second concurrent request should succeed");

    assert_eq!(ctx.state.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancelled_request_never_reaches_the_refresh_path() {
    let ctx = TestContext::new().await;
    ctx.seed_stale_session();
    ctx.state.me_delay_ms.store(5_000, Ordering::SeqCst);

    // Dropping the future cancels the call before the 401 arrives.
    let result = tokio::time::timeout(Duration::from_millis(200), ctx.client.me()).await;
    assert!(result.is_err(), "expected the timeout to cancel the call");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(ctx.state.refresh_calls.load(Ordering::SeqCst), 0);
}
