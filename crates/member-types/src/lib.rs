//! Member domain types shared by the identity provider, the role store and
//! the session observer.

mod identity;
mod navigation;
mod role;

pub use identity::Identity;
pub use navigation::{navigation_for, NavEntry};
pub use role::{ParseRoleError, RoleTag};
