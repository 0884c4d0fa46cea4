//! Gate for views that need a signed-in member.

use crate::Session;
use member_types::RoleTag;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    /// Still resolving; show a loading indicator.
    Pending,
    /// Nobody signed in; send the user to sign in.
    SignInRequired,
    Allowed { role: RoleTag },
}

impl From<&Session> for AccessDecision {
    fn from(session: &Session) -> Self {
        if session.loading {
            return AccessDecision::Pending;
        }
        match session.user {
            Some(_) => AccessDecision::Allowed {
                role: session.role.unwrap_or_default(),
            },
            None => AccessDecision::SignInRequired,
        }
    }
}
