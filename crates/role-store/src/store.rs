//! The role store seam.

use crate::RoleStoreResult;
use async_trait::async_trait;
use member_types::RoleTag;

/// Remote key-value mapping from user ID to role tag.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Look up a user's role. `Ok(None)` means no record (or no role on it).
    async fn get_role(&self, user_id: &str) -> RoleStoreResult<Option<RoleTag>>;

    /// Write a user's role, merging with any existing record.
    async fn set_role(&self, user_id: &str, role: RoleTag) -> RoleStoreResult<()>;
}
