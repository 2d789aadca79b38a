//! Sign-in command handlers

use chrono::Utc;
use tracing::info;

use crate::services::Permission;
use crate::state::AuthState;
use crate::utils::errors::Result;
use crate::utils::helpers::{format_remaining, format_timestamp};
use super::announce;
use super::super::CliContext;

pub async fn handle_login(ctx: &mut CliContext, email: Option<String>, stay_signed_in: bool) -> Result<()> {
    // A stored session must be dropped before signing in again
    if *ctx.shell.state() != AuthState::Unauthenticated {
        ctx.shell.logout().await?;
    }

    let email = match email {
        Some(email) => email,
        None => ctx.prompt.ask("Email").await?,
    };
    let password = ctx.prompt.ask("Password").await?;

    let notice = ctx.shell.login(&email, &password, stay_signed_in).await?;
    announce(&notice);
    if ctx.shell.is_admin() {
        println!("Signed in with administrator access");
    }
    Ok(())
}

pub async fn handle_register(ctx: &mut CliContext, email: Option<String>) -> Result<()> {
    if *ctx.shell.state() != AuthState::Unauthenticated {
        ctx.shell.logout().await?;
    }

    let email = match email {
        Some(email) => email,
        None => ctx.prompt.ask("Email").await?,
    };
    let password = ctx.prompt.ask("Password").await?;
    let confirm = ctx.prompt.ask("Confirm password").await?;

    let notice = ctx.shell.register(&email, &password, &confirm).await?;
    announce(&notice);
    Ok(())
}

pub async fn handle_logout(ctx: &mut CliContext) -> Result<()> {
    if *ctx.shell.state() == AuthState::Unauthenticated {
        println!("Not signed in");
        return Ok(());
    }
    ctx.shell.logout().await?;
    println!("Signed out");
    Ok(())
}

pub async fn handle_whoami(ctx: &mut CliContext) -> Result<()> {
    let user = ctx.signed_in(Permission::User).await?;
    println!("{} <{}>", user.display_name(), user.email);
    println!("Role: {}", if user.is_admin() { "administrator" } else { "user" });

    if let Some(session) = ctx.shell.session() {
        println!(
            "Session expires {} ({})",
            format_timestamp(session.expires_at),
            format_remaining(session.expires_at, Utc::now())
        );
    }
    Ok(())
}

pub async fn handle_password_reset(ctx: &mut CliContext, email: &str) -> Result<()> {
    let message = ctx.services().auth_service.request_password_reset(email).await?;
    info!(email = email, "Password reset requested");
    println!("{}", message);
    Ok(())
}
