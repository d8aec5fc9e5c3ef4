//! Session commands: login, Google sign-in, registration, logout, whoami.

use anycart_client::RegisterPayload;
use anycart_core::Email;
use tracing::info;

use super::Context;
use crate::error::CliError;

/// Sign in with username/email and password, then store the session.
pub async fn login(ctx: &Context, username: &str, password: &str) -> Result<(), CliError> {
    let client = ctx.client()?;
    let session = client.login(username, password).await?;
    let session = ctx.session.establish(session);

    match session.current_user() {
        Some(user) => info!("Signed in as {}", user.display_label()),
        None => info!("Signed in"),
    }
    Ok(())
}

/// Exchange a Google ID token for a session and store it.
pub async fn google_login(ctx: &Context, id_token: &str) -> Result<(), CliError> {
    let client = ctx.client()?;
    let session = client.login_with_google(id_token).await?;
    let session = ctx.session.establish(session);

    match session.current_user() {
        Some(user) => info!("Signed in with Google as {}", user.display_label()),
        None => info!("Signed in with Google"),
    }
    Ok(())
}

/// Register a new account and store the resulting session.
pub async fn register(
    ctx: &Context,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
    password2: Option<String>,
) -> Result<(), CliError> {
    // Validate before anything reaches the network.
    let email = Email::parse(email)?;

    let client = ctx.client()?;
    let payload = RegisterPayload {
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        email,
        password: password.to_owned(),
        password2: Some(password2.unwrap_or_else(|| password.to_owned())),
    };
    let session = client.register(&payload).await?;
    let session = ctx.session.establish(session);

    match session.current_user() {
        Some(user) => info!("Registered and signed in as {}", user.display_label()),
        None => info!("Registered and signed in"),
    }
    Ok(())
}

/// Forget the stored session.
pub fn logout(ctx: &Context) -> Result<(), CliError> {
    ctx.session.clear();
    info!("Signed out");
    Ok(())
}

/// Show the stored session's identity, without touching the network.
pub fn whoami(ctx: &Context) -> Result<(), CliError> {
    let session = ctx.session.get().ok_or(CliError::NotLoggedIn)?;
    match session.current_user() {
        Some(user) => info!("{}", user.display_label()),
        None => info!("Signed in (no identity in the stored session)"),
    }
    Ok(())
}
