//! Error types for session observer operations.

use identity_provider::AuthError;
use role_store::RoleStoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObserverError {
    /// `init()` was already called on this observer.
    #[error("Session observer is already subscribed")]
    AlreadySubscribed,

    /// The observer was disposed and no longer follows the provider.
    #[error("Session observer has been disposed")]
    Disposed,

    /// The operation needs a signed-in member.
    #[error("Not signed in")]
    NotSignedIn,

    /// Sign-up form: password and confirmation differ.
    #[error("Passwords don't match!")]
    PasswordMismatch,

    /// Identity provider failure, shown to the user verbatim.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Role store failure while saving a role.
    #[error(transparent)]
    RoleStore(#[from] RoleStoreError),
}

pub type ObserverResult<T> = Result<T, ObserverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_display_transparently() {
        let err: ObserverError = AuthError::InvalidCredentials.into();
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[test]
    fn password_mismatch_message() {
        assert_eq!(
            ObserverError::PasswordMismatch.to_string(),
            "Passwords don't match!"
        );
    }
}
