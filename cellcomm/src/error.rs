//! Error types for cellcomm.
//!
//! [`Error`] is what a link driver or port search reports when it faults.
//! The controller never hands it to callers; it is logged and folded into
//! [`CommResult::ExceptionCaught`](crate::CommResult::ExceptionCaught).

use std::io;
use thiserror::Error;

/// Result type for driver and infrastructure operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for driver and infrastructure operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (serial handle, file operations).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serial port error.
    #[cfg(feature = "native")]
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Unexpected fault raised inside the link driver.
    #[error("Driver fault: {0}")]
    Driver(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
