//! Progress bar over the discovered files
//!
//! Errors are printed above the bar so they don't get overwritten.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::error::TransferError;
use crate::header::FileHeader;
use crate::logger::Logger;

pub struct TransferProgress {
    bar: ProgressBar,
}

impl TransferProgress {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// Progress that draws nowhere; counts are still tracked.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner} [{bar:30}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Default for TransferProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for TransferProgress {
    fn discovered(&self, files: u64) {
        self.bar.set_length(files);
    }
    fn sent(&self, _path: &Path, name: &str, _header: &FileHeader, _bytes: u64) {
        self.bar.set_message(name.to_string());
        self.bar.inc(1);
    }
    fn error(&self, path: &Path, err: &TransferError) {
        self.bar
            .println(format!("Error [{}] {}: {}", err.kind(), path.display(), err));
        self.bar.inc(1);
    }
    fn done(&self, files: u64, failed: u64, seconds: f64) {
        self.bar.finish_with_message(format!(
            "sent {} files, {} failed in {:.1}s",
            files, failed, seconds
        ));
    }
}
