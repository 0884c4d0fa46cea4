//! Error types for role store operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoleStoreError {
    /// Network or transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("Role store request failed ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// A stored role value is not one of the known tags.
    #[error("Stored role is not recognized: {0}")]
    InvalidRole(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type RoleStoreResult<T> = Result<T, RoleStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_display_includes_status() {
        let err = RoleStoreError::Rejected {
            status: 401,
            message: "JWT expired".to_string(),
        };
        assert_eq!(err.to_string(), "Role store request failed (401): JWT expired");
    }

    #[test]
    fn invalid_role_names_value() {
        assert_eq!(
            RoleStoreError::InvalidRole("mentor".to_string()).to_string(),
            "Stored role is not recognized: mentor"
        );
    }
}
