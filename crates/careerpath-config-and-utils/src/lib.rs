//! Core configuration, paths, and utilities for the CareerPath client.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_LOG_LEVEL, DEFAULT_OAUTH_CALLBACK_PORT, DEFAULT_OAUTH_TIMEOUT_SECS,
    DEFAULT_SUPABASE_PUBLISHABLE_KEY, DEFAULT_SUPABASE_URL,
};
pub use error::{CoreError, CoreResult};
pub use logging::{filter_directive, init_logging, parse_level};
pub use paths::Paths;
