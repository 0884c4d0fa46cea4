//! In-memory role store with failure injection.

use crate::{RoleStore, RoleStoreError, RoleStoreResult};
use async_trait::async_trait;
use member_types::RoleTag;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct InMemoryRoleStore {
    roles: Mutex<HashMap<String, RoleTag>>,
    failing: Mutex<HashSet<String>>,
    lookups: AtomicUsize,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(self, user_id: &str, role: RoleTag) -> Self {
        self.roles.lock().insert(user_id.to_string(), role);
        self
    }

    /// Make lookups for `user_id` fail until [`recover`](Self::recover).
    pub fn fail_lookups_for(&self, user_id: &str) {
        self.failing.lock().insert(user_id.to_string());
    }

    pub fn recover(&self, user_id: &str) {
        self.failing.lock().remove(user_id);
    }

    /// Stored role, bypassing failure injection.
    pub fn stored_role(&self, user_id: &str) -> Option<RoleTag> {
        self.roles.lock().get(user_id).copied()
    }

    /// Number of `get_role` calls so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn get_role(&self, user_id: &str) -> RoleStoreResult<Option<RoleTag>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().contains(user_id) {
            return Err(RoleStoreError::Rejected {
                status: 503,
                message: "role store unavailable".to_string(),
            });
        }
        Ok(self.stored_role(user_id))
    }

    async fn set_role(&self, user_id: &str, role: RoleTag) -> RoleStoreResult<()> {
        self.roles.lock().insert(user_id.to_string(), role);
        Ok(())
    }
}
