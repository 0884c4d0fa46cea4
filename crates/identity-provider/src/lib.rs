//! Identity provider client for CareerPath.
//!
//! This crate provides:
//! - The [`IdentityProvider`] trait consumed by the session observer
//! - An auth-state stream ([`AuthStateHub`], [`AuthStateSubscription`]) with
//!   "current state first" delivery
//! - A Supabase Auth implementation with on-disk session persistence and
//!   PKCE social sign-in through a loopback callback server
//! - An in-memory implementation for tests and offline runs

mod error;
mod gotrue_client;
mod hub;
mod memory;
mod oauth;
mod persistence;
mod pkce;
mod provider;
mod supabase_provider;

pub use error::{AuthError, AuthResult};
pub use gotrue_client::{GoTrueClient, SupabaseUser, TokenResponse, UserMetadata};
pub use hub::{AuthStateHub, AuthStateSubscription};
pub use memory::InMemoryIdentityProvider;
pub use oauth::{
    OAuthCallbackServer, PendingCallback, DEFAULT_OAUTH_PORT, DEFAULT_OAUTH_TIMEOUT_SECS,
};
pub use persistence::{PersistedSession, SessionFile};
pub use pkce::PkcePair;
pub use provider::{IdentityProvider, SocialProvider};
pub use supabase_provider::{BrowserOpener, SupabaseIdentityProvider};
