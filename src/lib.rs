//! eqxfer library
//!
//! Sends the fixed 27-byte header of every equation file under a directory
//! to a receiving service, one TCP connection per file.

pub mod addr;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod fs_enum;
pub mod header;
pub mod log;
pub mod logger;
pub mod net;
pub mod progress;
pub mod protocol;
pub mod transmit;

pub use config::TransferConfig;
pub use error::TransferError;
pub use header::FileHeader;
pub use net::Connection;
pub use transmit::{transmit_directory, TransmitStats};
