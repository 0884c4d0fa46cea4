//! Logging setup for CareerPath binaries.

use crate::Paths;
use tracing::Level;

/// Install the process-wide subscriber: JSONL to `paths.log_file()`, plus
/// compact stderr output when `also_stderr` is set.
///
/// `level` is a user-supplied level name; `RUST_LOG` still wins over it.
pub fn init_logging(service_name: &str, level: &str, paths: &Paths, also_stderr: bool) {
    observability::init_with_config(observability::LogConfig {
        service_name: service_name.into(),
        default_level: filter_directive(level).into(),
        log_path: Some(paths.log_file()),
        also_stderr,
    });
}

/// Lowercase `EnvFilter` directive for a user-supplied level name.
/// Unknown names mean `info`.
pub fn filter_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

pub fn parse_level(level: &str) -> Level {
    filter_directive(level).parse().unwrap_or(Level::INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        let cases = [
            ("trace", Level::TRACE),
            ("DEBUG", Level::DEBUG),
            (" info ", Level::INFO),
            ("Warning", Level::WARN),
            ("warn", Level::WARN),
            ("error", Level::ERROR),
            ("verbose", Level::INFO),
            ("", Level::INFO),
        ];
        for (name, expected) in cases {
            assert_eq!(parse_level(name), expected, "{name:?}");
        }
    }

    #[test]
    fn directives_are_lowercase() {
        assert_eq!(filter_directive("WARNING"), "warn");
        assert_eq!(filter_directive("nonsense"), "info");
    }
}
