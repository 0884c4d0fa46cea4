//! CLI command implementations.

mod auth;
mod member;

pub use auth::{login, logout, signup, social};
pub use member::{profile, role_set, role_show, status, watch};

use crate::app::App;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use member_types::RoleTag;
use session_observer::{AccessDecision, ObserverError, ObserverResult, Session};
use std::io::{self, Write};

const SIGN_IN_HINT: &str = "Not signed in. Run 'careerpath login' first";

/// Errors caused by what the user typed. These are printed and the command
/// ends normally so the user can retry.
fn is_user_error(err: &ObserverError) -> bool {
    match err {
        ObserverError::Auth(auth) => auth.is_credential_error(),
        ObserverError::PasswordMismatch | ObserverError::NotSignedIn => true,
        _ => false,
    }
}

/// Print user errors and return `None`; propagate everything else.
fn surface<T>(result: ObserverResult<T>, format: &OutputFormat) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if is_user_error(&e) => {
            output::print_error(&e.to_string(), format);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Settled session of a signed-in member, or `None` after printing why not.
async fn require_member(app: &App, format: &OutputFormat) -> Result<Option<Session>> {
    let session = app.settled().await?;
    match AccessDecision::from(&session) {
        AccessDecision::Allowed { .. } => Ok(Some(session)),
        AccessDecision::SignInRequired => {
            output::print_error(SIGN_IN_HINT, format);
            Ok(None)
        }
        AccessDecision::Pending => {
            output::print_error("Member session is still loading", format);
            Ok(None)
        }
    }
}

/// Read one trimmed line from stdin.
fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_role() -> Result<Option<RoleTag>> {
    println!("I am a:");
    for (index, role) in RoleTag::ALL.iter().enumerate() {
        println!("  {}) {}", index + 1, role.description());
    }
    let answer = prompt("Role [1-3 or name]: ")?;
    Ok(parse_role_choice(&answer))
}

/// Accept a menu number or a role name.
fn parse_role_choice(answer: &str) -> Option<RoleTag> {
    if let Ok(index) = answer.trim().parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| RoleTag::ALL.get(i))
            .copied();
    }
    answer.parse().ok()
}
