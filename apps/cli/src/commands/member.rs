//! Member views: status, dashboard, role and the live session watch.

use super::{require_member, surface};
use crate::app::App;
use crate::output::{self, OutputFormat};
use crate::views::{ProfileCard, RoleCard, SessionEvent, StatusReport};
use anyhow::Result;
use member_types::RoleTag;
use session_observer::MemberProfile;

/// Show who is signed in and with which role.
pub async fn status(app: &App, format: &OutputFormat) -> Result<()> {
    let session = app.settled().await?;
    output::print(&StatusReport::from(&session), format);
    Ok(())
}

/// Show the member dashboard.
pub async fn profile(app: &App, format: &OutputFormat) -> Result<()> {
    let Some(session) = require_member(app, format).await? else {
        return Ok(());
    };
    match MemberProfile::from_session(&session) {
        Some(profile) => output::print(&ProfileCard(profile), format),
        None => output::print_error("Member session is still loading", format),
    }
    Ok(())
}

pub async fn role_show(app: &App, format: &OutputFormat) -> Result<()> {
    if let Some(session) = require_member(app, format).await? {
        output::print(&RoleCard::from(&session), format);
    }
    Ok(())
}

pub async fn role_set(app: &App, role: RoleTag, format: &OutputFormat) -> Result<()> {
    if require_member(app, format).await?.is_none() {
        return Ok(());
    }

    let result = app.observer.update_role(role).await;
    if let Some(session) = surface(result, format)? {
        let role = session.role.unwrap_or(role);
        output::print_success(&format!("Role set to {}", role.title()), format);
    }
    Ok(())
}

/// Print every published session until Ctrl+C, including sign-ins and
/// sign-outs made from other terminals.
pub async fn watch(app: &App, format: &OutputFormat) -> Result<()> {
    let mut receiver = app.observer.subscribe_session();
    let follower = app.follow_session_file();

    loop {
        let event = SessionEvent {
            at: chrono::Local::now().format("%H:%M:%S").to_string(),
            session: receiver.borrow_and_update().clone(),
        };
        output::print(&event, format);

        tokio::select! {
            changed = receiver.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    follower.abort();
    Ok(())
}
