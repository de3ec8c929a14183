use anyhow::Result;
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::error::TransferError;
use crate::header::FileHeader;

pub trait Logger: Send + Sync {
    fn start(&self, _root: &Path, _remote: &str) {}
    fn discovered(&self, _files: u64) {}
    fn greeting(&self, _remote: &str, _text: &str) {}
    fn sent(&self, _path: &Path, _name: &str, _header: &FileHeader, _bytes: u64) {}
    fn error(&self, _path: &Path, _err: &TransferError) {}
    fn done(&self, _files: u64, _failed: u64, _seconds: f64) {}
}

pub struct NoopLogger;
impl Logger for NoopLogger {}

pub struct TextLogger {
    file: Mutex<File>,
}

impl TextLogger {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(f),
        })
    }

    fn line(&self, s: &str) {
        if let Ok(mut f) = self.file.lock() {
            let _ = writeln!(f, "[{}] {}", Utc::now().to_rfc3339(), s);
        }
    }
}

impl Logger for TextLogger {
    fn start(&self, root: &Path, remote: &str) {
        self.line(&format!("START root={} remote={}", root.display(), remote));
    }
    fn greeting(&self, remote: &str, text: &str) {
        self.line(&format!("GREETING remote={} text={:?}", remote, text));
    }
    fn sent(&self, path: &Path, name: &str, header: &FileHeader, bytes: u64) {
        self.line(&format!(
            "SENT path={} name={} bytes={} {}",
            path.display(),
            name,
            bytes,
            header
        ));
    }
    fn error(&self, path: &Path, err: &TransferError) {
        self.line(&format!(
            "ERROR kind={} path={} msg={}",
            err.kind(),
            path.display(),
            err
        ));
    }
    fn done(&self, files: u64, failed: u64, seconds: f64) {
        self.line(&format!("DONE files={files} failed={failed} seconds={seconds:.3}"));
    }
}

/// Verbose diagnostics on stderr: greetings, errors and a header dump per file.
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn greeting(&self, remote: &str, text: &str) {
        eprintln!("[SERVER {}] {}", remote, text);
    }
    fn sent(&self, path: &Path, name: &str, header: &FileHeader, bytes: u64) {
        eprintln!("Sent {} ({}) {} bytes", name, path.display(), bytes);
        for (field, hex) in header.hex_fields() {
            eprintln!("  {:<22} {}", field, hex);
        }
    }
    fn error(&self, path: &Path, err: &TransferError) {
        eprintln!("Error [{}] {}: {}", err.kind(), path.display(), err);
    }
}

/// Fan out every event to several loggers.
pub struct MultiLogger {
    pub loggers: Vec<Box<dyn Logger>>,
}

impl Logger for MultiLogger {
    fn start(&self, root: &Path, remote: &str) {
        self.loggers.iter().for_each(|l| l.start(root, remote));
    }
    fn discovered(&self, files: u64) {
        self.loggers.iter().for_each(|l| l.discovered(files));
    }
    fn greeting(&self, remote: &str, text: &str) {
        self.loggers.iter().for_each(|l| l.greeting(remote, text));
    }
    fn sent(&self, path: &Path, name: &str, header: &FileHeader, bytes: u64) {
        self.loggers
            .iter()
            .for_each(|l| l.sent(path, name, header, bytes));
    }
    fn error(&self, path: &Path, err: &TransferError) {
        self.loggers.iter().for_each(|l| l.error(path, err));
    }
    fn done(&self, files: u64, failed: u64, seconds: f64) {
        self.loggers.iter().for_each(|l| l.done(files, failed, seconds));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_logger_writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/eqxfer.log");
        let logger = TextLogger::new(&path).unwrap();
        logger.start(Path::new("/data"), "127.0.0.1:5555");
        logger.error(
            Path::new("/data/short.bin"),
            &TransferError::TruncatedInput { needed: 27, got: 10 },
        );
        logger.done(1, 1, 0.5);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("START root=/data remote=127.0.0.1:5555"));
        assert!(lines[1].contains("ERROR kind=TruncatedInput path=/data/short.bin"));
        assert!(lines[2].contains("DONE files=1 failed=1 seconds=0.500"));
    }

    #[test]
    fn multi_logger_fans_out_to_every_logger() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.log");
        let b = dir.path().join("b.log");
        let logger = MultiLogger {
            loggers: vec![
                Box::new(ConsoleLogger),
                Box::new(TextLogger::new(&a).unwrap()),
                Box::new(TextLogger::new(&b).unwrap()),
            ],
        };
        logger.greeting("127.0.0.1:5555", "You have been connected!");
        logger.sent(Path::new("/data/eqs1.bin"), "eqs1.bin", &FileHeader::default(), 37);

        for p in [&a, &b] {
            let text = std::fs::read_to_string(p).unwrap();
            assert_eq!(text.lines().count(), 2);
            assert!(text.contains("SENT path=/data/eqs1.bin name=eqs1.bin bytes=37"));
        }
    }
}
