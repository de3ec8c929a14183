//! Per-file send loop: decode header, connect, send frame, close.

use anyhow::Result;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::fs_enum::{enumerate_files, FileEntry, FileFilter};
use crate::header::FileHeader;
use crate::logger::Logger;
use crate::net::Connection;

#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: TransferError,
}

#[derive(Debug, Default)]
pub struct TransmitStats {
    pub files_sent: u64,
    pub bytes_sent: u64,
    pub failures: Vec<FileFailure>,
}

impl TransmitStats {
    pub fn add_file(&mut self, bytes: u64) {
        self.files_sent += 1;
        self.bytes_sent += bytes;
    }

    pub fn add_failure(&mut self, path: PathBuf, error: TransferError) {
        self.failures.push(FileFailure { path, error });
    }
}

/// Send the header of every regular file under `root`, one connection per file.
///
/// Only an unreadable root aborts the run; every per-file failure is logged,
/// recorded in the returned stats and skipped.
pub fn transmit_directory(
    root: &Path,
    cfg: &TransferConfig,
    logger: &dyn Logger,
) -> Result<TransmitStats> {
    let start = Instant::now();
    logger.start(root, &cfg.remote.to_string());

    let filter = FileFilter {
        exclude_files: cfg.exclude_files.clone(),
        exclude_dirs: cfg.exclude_dirs.clone(),
    };
    let entries = enumerate_files(root, &filter)?;
    logger.discovered(entries.len() as u64);

    let mut stats = TransmitStats::default();
    for entry in &entries {
        match transmit_file(entry, cfg, logger) {
            Ok((header, bytes)) => {
                logger.sent(&entry.path, &entry.name, &header, bytes as u64);
                stats.add_file(bytes as u64);
            }
            Err(e) => {
                logger.error(&entry.path, &e);
                stats.add_failure(entry.path.clone(), e);
            }
        }
    }

    logger.done(
        stats.files_sent,
        stats.failures.len() as u64,
        start.elapsed().as_secs_f64(),
    );
    Ok(stats)
}

/// Decode the header first so a short file never opens a connection.
pub fn transmit_file(
    entry: &FileEntry,
    cfg: &TransferConfig,
    logger: &dyn Logger,
) -> std::result::Result<(FileHeader, usize), TransferError> {
    let header = FileHeader::read_from(File::open(&entry.path)?)?;

    let mut conn = connect_with_retry(cfg)?;
    logger.greeting(conn.peer(), conn.greeting());
    let sent = conn.send_file(&entry.name, &header);
    let closed = conn.close();
    let bytes = sent?;
    closed?;
    Ok((header, bytes))
}

fn connect_with_retry(cfg: &TransferConfig) -> std::result::Result<Connection, TransferError> {
    let mut attempt = 0u32;
    loop {
        match Connection::connect(cfg) {
            Ok(c) => return Ok(c),
            Err(e) if e.is_retryable() && attempt < cfg.retries => {
                attempt += 1;
                std::thread::sleep(backoff_delay(cfg.retry_backoff, attempt));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Linear backoff; huge user-supplied steps saturate instead of overflowing.
fn backoff_delay(step: Duration, attempt: u32) -> Duration {
    step.saturating_mul(attempt)
}
