//! Login establishing a session, identity derivation, logout.
//!
//! Run with: `cargo test -p anycart-integration-tests`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use anycart_integration_tests::TestContext;

#[tokio::test]
async fn login_establishes_a_session_with_a_derived_user() {
    let ctx = TestContext::new().await;

    let session = ctx
        .client
        .login("ada@example.com", "hunter2")
        .await
        .expect("login should succeed");
    // The token endpoint returns no user object; identity comes from the
    // token payload.
    assert!(session.user.is_none());

    let session = ctx.session.establish(session);
    let user = session.current_user().expect("expected a derived user");
    assert_eq!(user.id.as_i32(), 7);

    // The filled-in session survived a storage round trip.
    let reloaded = ctx.session.get().unwrap();
    assert_eq!(reloaded.user.unwrap().id.as_i32(), 7);
}

#[tokio::test]
async fn login_then_authenticated_call_works_without_refresh() {
    let ctx = TestContext::new().await;

    let session = ctx
        .client
        .login("ada@example.com", "hunter2")
        .await
        .expect("login should succeed");
    ctx.session.establish(session);

    let me = ctx.client.me().await.expect("me should succeed");
    assert_eq!(me.display_name(), "Ada Lovelace");
    assert_eq!(
        ctx.state
            .refresh_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn logout_clears_the_stored_session() {
    let ctx = TestContext::new().await;

    let session = ctx
        .client
        .login("ada@example.com", "hunter2")
        .await
        .expect("login should succeed");
    ctx.session.establish(session);
    assert!(ctx.session.get().is_some());

    ctx.session.clear();
    assert!(ctx.session.get().is_none());

    // Without a session the authenticated call fails outright.
    let err = ctx.client.me().await.expect_err("me should fail");
    assert!(err.is_unauthorized(), "got: {err}");
}
