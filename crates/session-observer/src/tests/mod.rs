//! Scenario tests for the session observer.
//!
//! - `harness.rs`       - gated role store, scripted provider, test harness
//! - `notifications.rs` - sign-in and sign-out notifications, role resolution
//! - `ordering.rs`      - overlapping role lookups and sequence gating
//! - `lifecycle.rs`     - init/dispose behavior
//! - `commands.rs`      - sign-in, sign-up, sign-out and role updates via the observer

mod commands;
pub(crate) mod harness;
mod lifecycle;
