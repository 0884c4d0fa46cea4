//! Process-wide logging for the CareerPath workspace.
//!
//! Library crates only emit `tracing` events. A binary calls
//! [`init_with_config`] once at startup to decide where they go:
//!
//! - `dev` feature (default): one JSON object per event appended to
//!   `~/.careerpath/logs/dev.jsonl` (see [`LogEntry`]), optionally mirrored
//!   to stderr in compact form. Credential fields are redacted.
//! - without `dev`: compact stderr output only.
//!
//! `RUST_LOG` overrides [`LogConfig::default_level`] in both modes.

#[cfg(feature = "dev")]
mod dev;

mod json_layer;

pub use json_layer::{LogEntry, REDACTED};

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Written as `service` on every line.
    pub service_name: String,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub default_level: String,
    /// Log file; `~/.careerpath/logs/dev.jsonl` when `None`.
    pub log_path: Option<PathBuf>,
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "careerpath".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Install the subscriber. Only the first call in a process has an effect.
pub fn init_with_config(config: LogConfig) {
    #[cfg(feature = "dev")]
    dev::init_dev_subscriber(&config);

    #[cfg(not(feature = "dev"))]
    {
        use tracing_subscriber::util::SubscriberInitExt;
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.default_level));
        let _ = tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_logs_info_to_file_only() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "careerpath");
        assert_eq!(config.default_level, "info");
        assert!(config.log_path.is_none());
        assert!(!config.also_stderr);
    }
}
