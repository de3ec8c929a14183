use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::TransferError;
use crate::header::FileHeader;
use crate::logger::Logger;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum TransmissionStatus {
    Sent,
    Failed,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TransmissionLogEntry {
    pub timestamp: String,
    pub run_id: String,
    pub path: PathBuf,
    pub remote: String,
    pub status: TransmissionStatus,
    pub bytes_sent: u64,
    pub header_hex: Option<String>,
    pub error_kind: Option<String>,
    pub error: Option<String>,
}

/// Append-only JSONL record of every file a run attempted.
pub struct TransmissionLog {
    log_file_path: PathBuf,
    run_id: String,
    remote: Mutex<String>,
}

impl TransmissionLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        TransmissionLog {
            log_file_path: path.as_ref().to_path_buf(),
            run_id: uuid::Uuid::new_v4().to_string(),
            remote: Mutex::new(String::new()),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn add_entry(&self, entry: &TransmissionLogEntry) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .context("Failed to open transmission log file")?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, entry)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_log(&self) -> Result<Vec<TransmissionLogEntry>> {
        if !self.log_file_path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&self.log_file_path)
            .context("Failed to open transmission log file for reading")?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: TransmissionLogEntry = serde_json::from_str(&line)?;
            entries.push(entry);
        }
        Ok(entries)
    }

    fn entry(&self, path: &Path, status: TransmissionStatus) -> TransmissionLogEntry {
        TransmissionLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            run_id: self.run_id.clone(),
            path: path.to_path_buf(),
            remote: self.remote.lock().map(|r| r.clone()).unwrap_or_default(),
            status,
            bytes_sent: 0,
            header_hex: None,
            error_kind: None,
            error: None,
        }
    }
}

impl Logger for TransmissionLog {
    fn start(&self, _root: &Path, remote: &str) {
        if let Ok(mut r) = self.remote.lock() {
            *r = remote.to_string();
        }
    }
    fn sent(&self, path: &Path, _name: &str, header: &FileHeader, bytes: u64) {
        let mut e = self.entry(path, TransmissionStatus::Sent);
        e.bytes_sent = bytes;
        e.header_hex = Some(header.encode().iter().map(|b| format!("{:02x}", b)).collect());
        if let Err(err) = self.add_entry(&e) {
            eprintln!("transmission log: {:#}", err);
        }
    }
    fn error(&self, path: &Path, err: &TransferError) {
        let mut e = self.entry(path, TransmissionStatus::Failed);
        e.error_kind = Some(err.kind().to_string());
        e.error = Some(err.to_string());
        if let Err(err) = self.add_entry(&e) {
            eprintln!("transmission log: {:#}", err);
        }
    }
}
