//! Backend profile commands.

use anycart_client::{AvatarUpdate, UpdateMe};
use clap::Subcommand;
use tracing::info;

use super::Context;
use crate::error::CliError;

/// Profile subcommands.
#[derive(Subcommand)]
pub enum ProfileAction {
    /// Fetch and show the profile
    Show,
    /// Update name and/or avatar
    Update {
        /// New first name
        #[arg(long)]
        first_name: Option<String>,

        /// New last name
        #[arg(long)]
        last_name: Option<String>,

        /// Path of an image to upload as the avatar
        #[arg(long, conflicts_with = "clear_avatar")]
        avatar: Option<String>,

        /// Remove the current avatar
        #[arg(long)]
        clear_avatar: bool,
    },
    /// Ask the backend to send a confirmation email
    SendConfirmation,
}

/// Dispatch a profile subcommand.
pub async fn run(ctx: &Context, action: ProfileAction) -> Result<(), CliError> {
    match action {
        ProfileAction::Show => show(ctx).await,
        ProfileAction::Update {
            first_name,
            last_name,
            avatar,
            clear_avatar,
        } => update(ctx, first_name, last_name, avatar, clear_avatar).await,
        ProfileAction::SendConfirmation => send_confirmation(ctx).await,
    }
}

async fn show(ctx: &Context) -> Result<(), CliError> {
    let client = ctx.client()?;
    let me = client.me().await?;

    info!("{} <{}>", me.display_name(), me.email);
    info!(
        "Email {}confirmed{}",
        if me.email_confirmed { "" } else { "not " },
        if me.is_staff { ", staff" } else { "" }
    );
    if let Some(avatar_url) = &me.avatar_url {
        info!("Avatar: {avatar_url}");
    }
    Ok(())
}

async fn update(
    ctx: &Context,
    first_name: Option<String>,
    last_name: Option<String>,
    avatar: Option<String>,
    clear_avatar: bool,
) -> Result<(), CliError> {
    let avatar_update = if clear_avatar {
        Some(AvatarUpdate::Clear)
    } else if let Some(path) = avatar {
        let bytes = std::fs::read(&path).map_err(|source| CliError::AvatarUnreadable {
            path: path.clone(),
            source,
        })?;
        let filename = std::path::Path::new(&path)
            .file_name()
            .map_or_else(|| "avatar".to_owned(), |n| n.to_string_lossy().into_owned());
        Some(AvatarUpdate::Upload { filename, bytes })
    } else {
        None
    };

    let client = ctx.client()?;
    let me = client
        .update_me(UpdateMe {
            first_name,
            last_name,
            avatar: avatar_update,
        })
        .await?;

    info!("Profile updated: {} <{}>", me.display_name(), me.email);
    Ok(())
}

async fn send_confirmation(ctx: &Context) -> Result<(), CliError> {
    let client = ctx.client()?;
    let sent = client.send_confirmation_email().await?;
    info!("{}", sent.detail);
    Ok(())
}
