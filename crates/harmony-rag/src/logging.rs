//! Tracing subscriber setup shared by the binaries
//!
//! Console output follows `RUST_LOG` (or the configured level). The log file
//! gets its own, usually more verbose, level and is rotated by size.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Crates whose events are logged
const LOG_TARGETS: [&str; 4] = ["harmony_rag", "harmony_server", "harmony_indexer", "tower_http"];

/// Install the global subscriber: console output plus a rotating log file.
///
/// `RUST_LOG` overrides the console level only.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let writer = RotatingFileWriter::open(&config.file, config.max_file_size, config.max_backups)?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(&config.level)));
    let file_filter = EnvFilter::new(directives(&config.file_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(console_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(writer))
                .with_filter(file_filter),
        )
        .try_init()
        .map_err(|e| Error::internal(format!("Failed to install tracing subscriber: {}", e)))?;

    tracing::info!("Logger initialized. Log file location: {}", config.file.display());
    Ok(())
}

fn directives(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

struct FileState {
    file: File,
    written: u64,
}

/// Append-only log file that rolls over once it would exceed `max_bytes`.
///
/// Backups are named `<file>.1` (newest) to `<file>.<max_backups>` (oldest);
/// the oldest is dropped on each rollover. A `max_bytes` of 0 never rotates.
pub struct RotatingFileWriter {
    path: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    state: Mutex<FileState>,
}

impl RotatingFileWriter {
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, max_backups: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_append(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            max_backups,
            state: Mutex::new(FileState { file, written }),
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rotate(&self, state: &mut FileState) -> io::Result<()> {
        state.file.flush()?;

        if self.max_backups == 0 {
            state.file = File::create(&self.path)?;
            state.written = 0;
            return Ok(());
        }

        remove_if_exists(&self.backup_path(self.max_backups))?;
        for index in (1..self.max_backups).rev() {
            rename_if_exists(&self.backup_path(index), &self.backup_path(index + 1))?;
        }
        rename_if_exists(&self.path, &self.backup_path(1))?;

        state.file = open_append(&self.path)?;
        state.written = 0;
        Ok(())
    }
}

impl Write for &RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();

        let incoming = buf.len() as u64;
        if self.max_bytes > 0 && state.written > 0 && state.written + incoming > self.max_bytes {
            self.rotate(&mut state)?;
        }

        let written = state.file.write(buf)?;
        state.written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.lock().file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn rename_if_exists(from: &Path, to: &Path) -> io::Result<()> {
    match std::fs::rename(from, to) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
