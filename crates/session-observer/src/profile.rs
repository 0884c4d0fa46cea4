//! Member profile view model.

use crate::Session;
use member_types::{navigation_for, NavEntry, RoleTag};
use serde::Serialize;

/// Name shown when the provider has no display name.
pub const FALLBACK_NAME: &str = "User";

/// What the profile dashboard shows for a populated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberProfile {
    pub name: String,
    pub title: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub role: RoleTag,
    pub navigation: Vec<NavEntry>,
}

impl MemberProfile {
    /// `None` unless the session is populated.
    pub fn from_session(session: &Session) -> Option<Self> {
        if session.loading {
            return None;
        }
        let user = session.user.as_ref()?;
        let role = session.role.unwrap_or_default();

        Some(Self {
            name: user
                .display_name
                .clone()
                .unwrap_or_else(|| FALLBACK_NAME.to_string()),
            title: role.title().to_string(),
            email: user.email.clone().unwrap_or_default(),
            avatar_url: user.avatar_url.clone(),
            role,
            navigation: navigation_for(role),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoleResolution;
    use member_types::Identity;

    #[test]
    fn profile_uses_fallbacks() {
        let session = Session::populated(
            Identity::new("u1"),
            RoleTag::College,
            RoleResolution::Stored,
            1,
        );
        let profile = MemberProfile::from_session(&session).unwrap();

        assert_eq!(profile.name, "User");
        assert_eq!(profile.title, "College");
        assert_eq!(profile.email, "");
        assert_eq!(profile.navigation.len(), 3);
    }

    #[test]
    fn profile_uses_identity_fields() {
        let user = Identity::new("u1")
            .with_display_name("Ada")
            .with_email("ada@example.com")
            .with_avatar_url("https://img/a.png");
        let session = Session::populated(user, RoleTag::Professional, RoleResolution::Stored, 4);
        let profile = MemberProfile::from_session(&session).unwrap();

        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.title, "Professional");
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.avatar_url.as_deref(), Some("https://img/a.png"));
        assert_eq!(profile.navigation[0].label, "Courses");
    }

    #[test]
    fn no_profile_while_loading_or_signed_out() {
        assert!(MemberProfile::from_session(&Session::initial()).is_none());
        assert!(MemberProfile::from_session(&Session::resolving(Identity::new("u1"), 1)).is_none());
        assert!(MemberProfile::from_session(&Session::empty(2)).is_none());
    }
}
