//! Command-line arguments and their mapping onto TransferConfig

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

use crate::addr::{split_host_port, RemoteAddr};
use crate::config::{load_config, TransferConfig};

/// Send the header of every equation file under a directory to a receiving service
#[derive(Clone, Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Directory to walk
    pub root: PathBuf,

    /// Receiver host, host:port or eqx://host:port (default: this machine's hostname)
    #[arg(long)]
    pub host: Option<String>,

    /// Receiver port (overrides any port given in --host)
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Connect timeout in milliseconds (0 = wait as long as the OS does)
    #[arg(long = "connect-timeout-ms")]
    pub connect_timeout_ms: Option<u64>,

    /// Read/write timeout in milliseconds (0 = block forever)
    #[arg(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Extra dial attempts when the receiver refuses or is unreachable
    #[arg(long)]
    pub retries: Option<u32>,

    /// Backoff step between dial attempts in milliseconds
    #[arg(long = "retry-backoff-ms")]
    pub retry_backoff_ms: Option<u64>,

    /// Exclude files matching patterns
    #[arg(long = "xf", action = ArgAction::Append)]
    pub exclude_files: Vec<String>,

    /// Exclude directories matching patterns
    #[arg(long = "xd", action = ArgAction::Append)]
    pub exclude_dirs: Vec<String>,

    /// TOML file with default settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Append text log lines to file
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Append one JSON line per file to file
    #[arg(long = "json-log")]
    pub json_log: Option<PathBuf>,

    /// Print greetings and header fields for every file
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Defaults, then config file, then flags.
    pub fn to_config(&self) -> Result<TransferConfig> {
        let file = match self.config {
            Some(ref p) => Some(load_config(p)?),
            None => None,
        };

        let needs_local_host =
            self.host.is_none() && file.as_ref().and_then(|f| f.host.as_ref()).is_none();
        let base = if needs_local_host {
            RemoteAddr::local_default()?
        } else {
            RemoteAddr::new("", crate::protocol::DEFAULT_PORT)
        };
        let mut cfg = TransferConfig::new(base);
        if let Some(ref f) = file {
            cfg.apply_file(f);
        }

        if let Some(ref h) = self.host {
            let (host, port) =
                split_host_port(h).with_context(|| format!("Invalid receiver address: {}", h))?;
            cfg.remote.host = host;
            // A bare host keeps whatever port the config file chose
            if let Some(port) = port {
                cfg.remote.port = port;
            }
        }
        if let Some(port) = self.port {
            cfg.remote.port = port;
        }
        if let Some(ms) = self.connect_timeout_ms {
            cfg.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.timeout_ms {
            cfg.io_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = self.retries {
            cfg.retries = n;
        }
        if let Some(ms) = self.retry_backoff_ms {
            cfg.retry_backoff = Duration::from_millis(ms);
        }
        cfg.exclude_files.extend(self.exclude_files.iter().cloned());
        cfg.exclude_dirs.extend(self.exclude_dirs.iter().cloned());
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_map_onto_config() {
        let args = Args::parse_from([
            "eqxfer",
            "/data",
            "--host",
            "calc.lan:6000",
            "--timeout-ms",
            "250",
            "--retries",
            "2",
            "--xf",
            "*.tmp",
            "--xf",
            "*.bak",
            "--xd",
            "scratch",
        ]);
        let cfg = args.to_config().unwrap();
        assert_eq!(cfg.remote, RemoteAddr::new("calc.lan", 6000));
        assert_eq!(cfg.io_timeout, Duration::from_millis(250));
        assert_eq!(cfg.retries, 2);
        assert_eq!(cfg.exclude_files, vec!["*.tmp", "*.bak"]);
        assert_eq!(cfg.exclude_dirs, vec!["scratch"]);
    }

    #[test]
    fn test_port_flag_wins() {
        let args = Args::parse_from(["eqxfer", "/data", "--host", "calc.lan:6000", "-p", "7000"]);
        assert_eq!(args.to_config().unwrap().remote.port, 7000);
    }

    #[test]
    fn test_bare_host_keeps_config_file_port() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "host = \"from-file\"\nport = 6100").unwrap();
        let path = tmp.path().to_string_lossy().into_owned();
        let args = Args::parse_from(["eqxfer", "/data", "--config", &path, "--host", "calc.lan"]);
        let cfg = args.to_config().unwrap();
        assert_eq!(cfg.remote, RemoteAddr::new("calc.lan", 6100));
    }

    #[test]
    fn test_default_host_is_local() {
        let args = Args::parse_from(["eqxfer", "/data"]);
        let cfg = args.to_config().unwrap();
        assert!(!cfg.remote.host.is_empty());
        assert_eq!(cfg.remote.port, 5555);
    }
}
