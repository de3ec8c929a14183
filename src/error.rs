//! Error types for header decoding and frame transport.

use std::io;

use thiserror::Error;

/// Which of the three frame writes a send error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStep {
    LengthLine,
    Name,
    Header,
}

impl std::fmt::Display for SendStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendStep::LengthLine => write!(f, "length line"),
            SendStep::Name => write!(f, "name"),
            SendStep::Header => write!(f, "header"),
        }
    }
}

/// Failure of one file's decode/connect/send/close sequence.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Input shorter than the fixed header width.
    #[error("truncated input: need {needed} bytes, got {got}")]
    TruncatedInput { needed: usize, got: usize },

    /// Peer closed (or failed) before sending a greeting.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    /// Transport stopped accepting bytes in the middle of a frame write.
    #[error("partial send of {step}: wrote {written} of {expected} bytes")]
    PartialSend {
        step: SendStep,
        written: usize,
        expected: usize,
    },

    #[error("filename must not be empty")]
    EmptyName,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TransferError {
    /// Short stable label for diagnostics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::TruncatedInput { .. } => "TruncatedInput",
            TransferError::HandshakeFailed(_) => "HandshakeFailed",
            TransferError::ConnectionRefused(_) => "ConnectionRefused",
            TransferError::NetworkUnreachable(_) => "NetworkUnreachable",
            TransferError::PartialSend { .. } => "PartialSend",
            TransferError::EmptyName => "EmptyName",
            TransferError::Io(e) if e.kind() == io::ErrorKind::TimedOut => "TimedOut",
            TransferError::Io(e) if e.kind() == io::ErrorKind::WouldBlock => "TimedOut",
            TransferError::Io(_) => "Io",
        }
    }

    /// Dial failures that a bounded retry may recover from.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransferError::ConnectionRefused(_) | TransferError::NetworkUnreachable(_)
        )
    }

    /// Classify an error returned while dialing `addr`.
    pub(crate) fn from_dial(addr: &str, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::ConnectionRefused => {
                TransferError::ConnectionRefused(format!("{}: {}", addr, e))
            }
            io::ErrorKind::NetworkUnreachable | io::ErrorKind::HostUnreachable => {
                TransferError::NetworkUnreachable(format!("{}: {}", addr, e))
            }
            _ => TransferError::Io(e),
        }
    }
}

/// Result type alias using TransferError.
pub type Result<T> = std::result::Result<T, TransferError>;
