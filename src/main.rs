//! eqxfer - send equation file headers to a receiving service

use anyhow::{Context, Result};
use clap::Parser;

use eqxfer::cli::Args;
use eqxfer::log::TransmissionLog;
use eqxfer::logger::{ConsoleLogger, Logger, MultiLogger, TextLogger};
use eqxfer::progress::TransferProgress;
use eqxfer::transmit_directory;

fn main() -> Result<()> {
    // Set up Ctrl-C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted by user. Exiting (Ctrl-C)...");
        // Exit immediately with 130 (128 + SIGINT)
        std::process::exit(130);
    })
    .context("Error setting Ctrl-C handler")?;

    let args = Args::parse();
    let cfg = args.to_config()?;

    let mut loggers: Vec<Box<dyn Logger>> = Vec::new();
    if args.verbose {
        loggers.push(Box::new(ConsoleLogger));
    } else {
        loggers.push(Box::new(TransferProgress::new()));
    }
    if let Some(ref p) = args.log_file {
        match TextLogger::new(p) {
            Ok(l) => loggers.push(Box::new(l)),
            Err(e) => eprintln!("Warning: cannot open log file {}: {}", p.display(), e),
        }
    }
    if let Some(ref p) = args.json_log {
        loggers.push(Box::new(TransmissionLog::new(p)));
    }
    let logger = MultiLogger { loggers };

    if args.verbose {
        println!("eqxfer {}", env!("CARGO_PKG_VERSION"));
        println!("Root: {}", args.root.display());
        println!("Receiver: {}", cfg.remote);
    }

    let stats = transmit_directory(&args.root, &cfg, &logger)
        .with_context(|| format!("Failed to transmit {}", args.root.display()))?;

    // Per-file failures were already reported; they don't change the exit code.
    println!(
        "Sent {} headers ({} bytes), {} failed",
        stats.files_sent,
        stats.bytes_sent,
        stats.failures.len()
    );
    Ok(())
}
