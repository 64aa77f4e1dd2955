//! Tracing setup: human-readable stderr plus a plain log file under
//! `<base_dir>/logs`, rotated by size on startup.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_NAME: &str = "docscrape.log";
pub const MAX_LOG_BYTES: u64 = 1024 * 1024;
pub const LOG_BACKUPS: u32 = 5;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("log file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("tracing subscriber already installed: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Level used when `RUST_LOG` is not set.
/// Priority: quiet flag > verbose count > info.
pub fn default_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Returns the path of the log file.
pub fn init(logs_dir: &Path, default_level: &str) -> Result<PathBuf, LoggingError> {
    let path = logs_dir.join(LOG_FILE_NAME);
    let io_err = |source: io::Error| LoggingError::Io {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(logs_dir).map_err(io_err)?;
    rotate(&path, MAX_LOG_BYTES, LOG_BACKUPS).map_err(io_err)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(io_err)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;

    Ok(path)
}

/// When `path` is larger than `max_bytes`, shift `path.N` to `path.N+1`
/// (dropping the oldest beyond `backups`) and move `path` to `path.1`.
pub fn rotate(path: &Path, max_bytes: u64, backups: u32) -> io::Result<()> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if size <= max_bytes || backups == 0 {
        return Ok(());
    }

    for n in (1..backups).rev() {
        let from = backup_path(path, n);
        if from.exists() {
            fs::rename(&from, backup_path(path, n + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))
}

fn backup_path(path: &Path, n: u32) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}", n));
    PathBuf::from(name)
}
