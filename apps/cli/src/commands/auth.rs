//! Sign-in, sign-up and sign-out commands.

use super::{prompt, prompt_role, surface};
use crate::app::App;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use identity_provider::SocialProvider;
use member_types::{Identity, RoleTag};
use session_observer::NewAccount;
use tracing::info;

/// Sign in with email and password.
pub async fn login(app: &App, format: &OutputFormat) -> Result<()> {
    let session = app.settled().await?;
    if let Some(user) = &session.user {
        output::print_success(&format!("Already signed in as {}", user.label()), format);
        return Ok(());
    }

    let email = prompt("Email: ")?;
    if email.is_empty() {
        output::print_error("Email is required", format);
        return Ok(());
    }

    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        output::print_error("Password is required", format);
        return Ok(());
    }

    if matches!(format, OutputFormat::Text) {
        println!("Signing in...");
    }

    let result = app.observer.sign_in_with_password(&email, &password).await;
    if let Some(identity) = surface(result, format)? {
        signed_in(app, &identity, format).await?;
    }
    Ok(())
}

/// Create an account and save the chosen role.
pub async fn signup(
    app: &App,
    role: Option<RoleTag>,
    name: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let email = prompt("Email: ")?;
    if email.is_empty() {
        output::print_error("Email is required", format);
        return Ok(());
    }

    let display_name = match name {
        Some(name) => name.trim().to_string(),
        None => prompt("Full name (optional): ")?,
    };

    let password = rpassword::prompt_password("Password: ")?;
    let confirm_password = rpassword::prompt_password("Confirm password: ")?;

    let role = match role {
        Some(role) => role,
        None => match prompt_role()? {
            Some(role) => role,
            None => {
                output::print_error("Choose school, college or professional", format);
                return Ok(());
            }
        },
    };

    let account = NewAccount {
        email,
        password,
        confirm_password,
        display_name: Some(display_name).filter(|n| !n.is_empty()),
        role,
    };

    let result = app.observer.create_account(&account).await;
    if let Some(identity) = surface(result, format)? {
        info!(user_id = %identity.id, role = %role, "account created from cli");
        signed_in(app, &identity, format).await?;
    }
    Ok(())
}

/// Sign in through a social provider in the browser.
pub async fn social(app: &App, provider: SocialProvider, format: &OutputFormat) -> Result<()> {
    if matches!(format, OutputFormat::Text) {
        println!("Opening your browser to sign in with {}...", provider);
    }

    let result = app.observer.sign_in_with_social(provider).await;
    if let Some(identity) = surface(result, format)? {
        signed_in(app, &identity, format).await?;
    }
    Ok(())
}

/// Sign out and clear the stored session.
pub async fn logout(app: &App, format: &OutputFormat) -> Result<()> {
    let session = app.settled().await?;
    if session.user.is_none() {
        output::print_success("Not signed in", format);
        return Ok(());
    }

    let result = app.observer.sign_out().await;
    if surface(result, format)?.is_some() {
        app.wait_for(|s| s.user.is_none()).await?;
        output::print_success("Signed out", format);
    }
    Ok(())
}

async fn signed_in(app: &App, identity: &Identity, format: &OutputFormat) -> Result<()> {
    let session = app.wait_for_member(&identity.id).await?;
    let role = session.role.unwrap_or_default();
    output::print_success(
        &format!("Signed in as {} ({})", identity.label(), role.title()),
        format,
    );
    Ok(())
}
