//! Text and JSON renderings of the session for the CLI.

use crate::output::row;
use serde::Serialize;
use member_types::RoleTag;
use session_observer::{AccessDecision, MemberProfile, RoleResolution, Session, SessionState};
use std::fmt;

/// `careerpath status` output.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub state: SessionState,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_resolution: Option<RoleResolution>,
    pub access: AccessDecision,
}

impl From<&Session> for StatusReport {
    fn from(session: &Session) -> Self {
        Self {
            state: session.state(),
            user_id: session.user.as_ref().map(|u| u.id.clone()),
            email: session.user.as_ref().and_then(|u| u.email.clone()),
            role: session.role.map(|r| r.to_string()),
            role_resolution: session.role_resolution.clone(),
            access: AccessDecision::from(session),
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            SessionState::Loading => return writeln!(f, "{}", row("Auth", "loading")),
            SessionState::Empty => return writeln!(f, "{}", row("Auth", "not signed in")),
            SessionState::Populated => {}
        }

        writeln!(f, "{}", row("Auth", "signed in"))?;
        writeln!(f, "{}", row("User ID", self.user_id.as_deref().unwrap_or("unknown")))?;
        if let Some(email) = &self.email {
            writeln!(f, "{}", row("Email", email))?;
        }
        let role = self.role.as_deref().unwrap_or("unknown");
        match &self.role_resolution {
            Some(RoleResolution::DefaultedNotFound) => {
                writeln!(f, "{}", row("Role", &format!("{} (default, none saved)", role)))
            }
            Some(RoleResolution::DefaultedAfterError { message }) => writeln!(
                f,
                "{}",
                row("Role", &format!("{} (default, lookup failed: {})", role, message))
            ),
            _ => writeln!(f, "{}", row("Role", role)),
        }
    }
}

/// `careerpath profile` output.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ProfileCard(pub MemberProfile);

impl fmt::Display for ProfileCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let profile = &self.0;
        writeln!(f, "{}", profile.name)?;
        writeln!(f, "{}", profile.title)?;
        if !profile.email.is_empty() {
            writeln!(f, "{}", profile.email)?;
        }
        if let Some(avatar) = &profile.avatar_url {
            writeln!(f, "{}", row("Avatar", avatar))?;
        }
        writeln!(f)?;
        for entry in &profile.navigation {
            writeln!(f, "{}", row(entry.label, entry.path))?;
        }
        Ok(())
    }
}

/// `careerpath role show` output.
#[derive(Debug, Serialize)]
pub struct RoleCard {
    pub role: RoleTag,
    pub title: &'static str,
    pub description: &'static str,
    pub defaulted: bool,
}

impl From<&Session> for RoleCard {
    fn from(session: &Session) -> Self {
        let role = session.role.unwrap_or_default();
        Self {
            role,
            title: role.title(),
            description: role.description(),
            defaulted: session
                .role_resolution
                .as_ref()
                .is_some_and(RoleResolution::is_defaulted),
        }
    }
}

impl fmt::Display for RoleCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", row("Role", self.role.as_str()))?;
        writeln!(f, "{}", row("Audience", self.description))?;
        if self.defaulted {
            writeln!(
                f,
                "\nNo saved role; showing the default. Run `careerpath role set <role>` to choose one."
            )?;
        }
        Ok(())
    }
}

/// One line of `careerpath watch` output.
#[derive(Debug, Serialize)]
pub struct SessionEvent {
    pub at: String,
    #[serde(flatten)]
    pub session: Session,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let who = self
            .session
            .user
            .as_ref()
            .map(|u| u.label().to_string())
            .unwrap_or_else(|| "-".to_string());
        let role = self
            .session
            .role
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "[{}] #{} {:?} user={} role={}",
            self.at,
            self.session.sequence,
            self.session.state(),
            who,
            role
        )
    }
}
