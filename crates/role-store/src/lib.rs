//! Role store for CareerPath members.
//!
//! Maps a user ID to a [`RoleTag`](member_types::RoleTag). The Supabase
//! implementation reads and upserts the `users` table; the in-memory one
//! backs tests and offline runs.

mod error;
mod memory;
mod store;
mod supabase;

pub use error::{RoleStoreError, RoleStoreResult};
pub use memory::InMemoryRoleStore;
pub use store::RoleStore;
pub use supabase::SupabaseRoleStore;
