//! Dev-mode subscriber: JSONL file output plus optional stderr.

use crate::json_layer::JsonLayer;
use crate::LogConfig;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".careerpath")
        .join("logs")
        .join("dev.jsonl")
}

/// Shared append-only handle on the log file. Each line is flushed as soon
/// as it is complete, so `tail -f` sees events immediately.
#[derive(Clone)]
pub struct JsonlFile {
    file: Arc<Mutex<LineWriter<File>>>,
}

impl JsonlFile {
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(LineWriter::new(file))),
        })
    }
}

impl Write for JsonlFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for JsonlFile {
    type Writer = JsonlFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the dev subscriber. Falls back to stderr alone when the log file
/// cannot be opened.
pub fn init_dev_subscriber(config: &LogConfig) {
    let log_path = config.log_path.clone().unwrap_or_else(default_log_path);

    let file_layer = match JsonlFile::open(&log_path) {
        Ok(file) => Some(
            JsonLayer::new(config.service_name.clone(), file)
                .with_filter(env_filter(&config.default_level)),
        ),
        Err(e) => {
            eprintln!("failed to open log file {}: {}", log_path.display(), e);
            None
        }
    };

    let stderr_layer = (config.also_stderr || file_layer.is_none()).then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    if tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok()
    {
        tracing::debug!(log_path = %log_path.display(), "logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("logs").join("dev.jsonl");

        let mut file = JsonlFile::open(&path).unwrap();
        file.write_all(b"{\"n\":1}\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"n\":1}\n");
    }

    #[test]
    fn reopening_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dev.jsonl");

        JsonlFile::open(&path).unwrap().write_all(b"one\n").unwrap();
        JsonlFile::open(&path).unwrap().write_all(b"two\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn clones_share_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dev.jsonl");
        let file = JsonlFile::open(&path).unwrap();

        file.make_writer().write_all(b"a\n").unwrap();
        file.make_writer().write_all(b"b\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn default_path_is_under_careerpath() {
        assert!(default_log_path().ends_with(".careerpath/logs/dev.jsonl"));
    }
}
