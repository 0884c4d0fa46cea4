//! Authenticated identity as issued by the identity provider.

use serde::{Deserialize, Serialize};

/// An authenticated user record.
///
/// Opaque to the session observer: only presence matters there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-issued unique user ID.
    pub id: String,
    /// Display name, if the provider knows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Primary e-mail address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Identity {
    /// Identity with only an ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            email: None,
            avatar_url: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    /// Best human label: display name, then e-mail, then ID.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_display_name() {
        let identity = Identity::new("u1")
            .with_email("ada@example.com")
            .with_display_name("Ada");
        assert_eq!(identity.label(), "Ada");
    }

    #[test]
    fn label_falls_back_to_email_then_id() {
        assert_eq!(
            Identity::new("u1").with_email("ada@example.com").label(),
            "ada@example.com"
        );
        assert_eq!(Identity::new("u1").label(), "u1");
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let json = serde_json::to_string(&Identity::new("u1")).unwrap();
        assert_eq!(json, r#"{"id":"u1"}"#);
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let identity: Identity = serde_json::from_str(r#"{"id":"u9"}"#).unwrap();
        assert_eq!(identity, Identity::new("u9"));
    }
}
