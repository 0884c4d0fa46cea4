//! The identity provider seam.

use crate::{AuthError, AuthResult, AuthStateSubscription};
use async_trait::async_trait;
use member_types::Identity;
use std::fmt;
use std::str::FromStr;

/// Social sign-in providers offered on the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialProvider {
    Google,
    Facebook,
}

impl SocialProvider {
    /// Provider name as the identity service expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialProvider::Google => "google",
            SocialProvider::Facebook => "facebook",
        }
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SocialProvider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(SocialProvider::Google),
            "facebook" => Ok(SocialProvider::Facebook),
            other => Err(AuthError::OAuth(format!("unsupported provider: {}", other))),
        }
    }
}

/// External identity service as seen by the session observer.
///
/// Implementations deliver auth-state changes through [`subscribe`]:
/// successful sign-in and account creation publish `Some(identity)`,
/// sign-out publishes `None`.
///
/// [`subscribe`]: IdentityProvider::subscribe
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register for auth-state changes. The current state is delivered first.
    fn subscribe(&self) -> AuthStateSubscription;

    /// Identity currently signed in, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Bearer token for calls made on behalf of the signed-in user.
    async fn access_token(&self) -> Option<String>;

    /// Sign in with e-mail and password.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Identity>;

    /// Sign in through a social provider.
    async fn sign_in_with_social(&self, provider: SocialProvider) -> AuthResult<Identity>;

    /// Create an account and sign it in.
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AuthResult<Identity>;

    /// Sign the current user out.
    async fn sign_out(&self) -> AuthResult<()>;
}
