//! Session observer for CareerPath members.
//!
//! Turns the identity provider's auth-state notifications into a
//! `(user, role, loading)` [`Session`] that views read or watch, plus the
//! view models derived from it ([`MemberProfile`], [`AccessDecision`]).

mod access;
mod error;
mod observer;
mod profile;
mod session;

#[cfg(test)]
mod tests;

pub use access::AccessDecision;
pub use error::{ObserverError, ObserverResult};
pub use observer::{NewAccount, SessionObserver};
pub use profile::{MemberProfile, FALLBACK_NAME};
pub use session::{RoleResolution, Session, SessionState};
