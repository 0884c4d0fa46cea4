//! Configuration management for the CareerPath client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default Supabase URL (can be overridden at compile time via CAREERPATH_SUPABASE_URL).
pub const DEFAULT_SUPABASE_URL: &str = match option_env!("CAREERPATH_SUPABASE_URL") {
    Some(url) => url,
    None => "https://careerpath.supabase.co",
};

/// Default Supabase publishable key (can be overridden at compile time via
/// CAREERPATH_SUPABASE_KEY, the same variable read at runtime).
pub const DEFAULT_SUPABASE_PUBLISHABLE_KEY: &str = match option_env!("CAREERPATH_SUPABASE_KEY") {
    Some(key) => key,
    None => "public-anon-key",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Loopback port the social sign-in callback server binds to.
pub const DEFAULT_OAUTH_CALLBACK_PORT: u16 = 9876;

/// How long social sign-in waits for the browser redirect.
pub const DEFAULT_OAUTH_TIMEOUT_SECS: u64 = 180;

const ENV_LOG_LEVEL: &str = "CAREERPATH_LOG_LEVEL";
const ENV_SUPABASE_URL: &str = "CAREERPATH_SUPABASE_URL";
const ENV_SUPABASE_KEY: &str = "CAREERPATH_SUPABASE_KEY";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Supabase project URL.
    #[serde(default = "default_supabase_url")]
    pub supabase_url: String,
    /// Supabase publishable API key (public, safe to expose).
    #[serde(default = "default_supabase_publishable_key")]
    pub supabase_publishable_key: String,
    /// Port for the social sign-in redirect listener.
    #[serde(default = "default_oauth_callback_port")]
    pub oauth_callback_port: u16,
    /// Seconds to wait for the social sign-in redirect.
    #[serde(default = "default_oauth_timeout_secs")]
    pub oauth_timeout_secs: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_supabase_url() -> String {
    DEFAULT_SUPABASE_URL.to_string()
}

fn default_supabase_publishable_key() -> String {
    DEFAULT_SUPABASE_PUBLISHABLE_KEY.to_string()
}

fn default_oauth_callback_port() -> u16 {
    DEFAULT_OAUTH_CALLBACK_PORT
}

fn default_oauth_timeout_secs() -> u64 {
    DEFAULT_OAUTH_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            supabase_url: default_supabase_url(),
            supabase_publishable_key: default_supabase_publishable_key(),
            oauth_callback_port: DEFAULT_OAUTH_CALLBACK_PORT,
            oauth_timeout_secs: DEFAULT_OAUTH_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from `config.json` under `paths`, falling back to
    /// defaults, then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from a variable lookup. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(level) = read(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(url) = read(ENV_SUPABASE_URL) {
            self.supabase_url = url;
        }
        if let Some(key) = read(ENV_SUPABASE_KEY) {
            self.supabase_publishable_key = key;
        }
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> CoreResult<()> {
        let url = self.supabase_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::Config(format!(
                "supabase_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.supabase_publishable_key.trim().is_empty() {
            return Err(CoreError::Config(
                "supabase_publishable_key is empty".to_string(),
            ));
        }
        if self.oauth_timeout_secs == 0 {
            return Err(CoreError::InvalidValue {
                key: "oauth_timeout_secs",
                value: self.oauth_timeout_secs.to_string(),
            });
        }
        Ok(())
    }

    /// Get the Supabase URL as a parsed URL.
    pub fn supabase_url(&self) -> CoreResult<Url> {
        Url::parse(&self.supabase_url).map_err(CoreError::from)
    }

    /// Supabase URL without a trailing slash, ready for path joining.
    pub fn supabase_base_url(&self) -> String {
        self.supabase_url.trim_end_matches('/').to_string()
    }
}
