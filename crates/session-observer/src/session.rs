//! The published session value.

use member_types::{Identity, RoleTag};
use serde::Serialize;

/// How the session's role was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleResolution {
    /// The role store returned a role.
    Stored,
    /// No record (or no role on it); the default role was applied.
    DefaultedNotFound,
    /// The lookup failed; the default role was applied.
    DefaultedAfterError { message: String },
}

impl RoleResolution {
    pub fn is_defaulted(&self) -> bool {
        !matches!(self, RoleResolution::Stored)
    }
}

/// Coarse view of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Loading,
    Populated,
    Empty,
}

/// Snapshot of who is signed in and with which role.
///
/// Every notification replaces the whole value; `sequence` identifies the
/// notification it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: Option<Identity>,
    pub role: Option<RoleTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_resolution: Option<RoleResolution>,
    pub loading: bool,
    pub sequence: u64,
}

impl Session {
    /// Startup value, before the provider has reported anything.
    pub fn initial() -> Self {
        Self {
            user: None,
            role: None,
            role_resolution: None,
            loading: true,
            sequence: 0,
        }
    }

    /// A signed-in identity whose role is still being fetched.
    pub fn resolving(user: Identity, sequence: u64) -> Self {
        Self {
            user: Some(user),
            role: None,
            role_resolution: None,
            loading: true,
            sequence,
        }
    }

    pub fn populated(
        user: Identity,
        role: RoleTag,
        resolution: RoleResolution,
        sequence: u64,
    ) -> Self {
        Self {
            user: Some(user),
            role: Some(role),
            role_resolution: Some(resolution),
            loading: false,
            sequence,
        }
    }

    /// Nobody signed in.
    pub fn empty(sequence: u64) -> Self {
        Self {
            user: None,
            role: None,
            role_resolution: None,
            loading: false,
            sequence,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.loading {
            SessionState::Loading
        } else if self.user.is_some() {
            SessionState::Populated
        } else {
            SessionState::Empty
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::initial()
    }
}
