//! Error types for identity provider operations.

use thiserror::Error;

/// Identity provider error.
///
/// Credential failures keep the provider's own message so it can be shown
/// to the user verbatim.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Network or transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The identity service refused the request (wrong password, account
    /// exists, malformed e-mail, ...). `message` is the service's text.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Account created but the service requires e-mail confirmation first.
    #[error("Check {0} for a confirmation link before signing in")]
    ConfirmationRequired(String),

    /// Wrong e-mail/password pair.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// An account with that e-mail already exists.
    #[error("An account already exists for {0}")]
    AccountExists(String),

    /// E-mail address is malformed.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Password does not meet the minimum requirements.
    #[error("Password should be at least {0} characters")]
    WeakPassword(usize),

    /// No user is signed in.
    #[error("Not signed in")]
    NotSignedIn,

    /// Social sign-in failed (provider error, missing code, bind failure).
    #[error("Social sign-in failed: {0}")]
    OAuth(String),

    /// Timed out waiting for the social sign-in redirect.
    #[error("Timed out waiting for social sign-in")]
    Timeout,

    /// IO error (session file, callback socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for identity provider operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// True for errors caused by what the user typed, as opposed to
    /// availability problems.
    pub fn is_credential_error(&self) -> bool {
        match self {
            AuthError::Rejected { status, .. } => (400..500).contains(status),
            AuthError::InvalidCredentials
            | AuthError::AccountExists(_)
            | AuthError::InvalidEmail(_)
            | AuthError::WeakPassword(_)
            | AuthError::ConfirmationRequired(_) => true,
            _ => false,
        }
    }
}
