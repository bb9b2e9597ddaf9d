//! # Teleinfo Error Handling
//!
//! This module defines the TeleinfoError enum, which represents the different
//! error types that can occur in the teleinfo-rs crate.
//!
//! Malformed data groups and undecodable lines are deliberately not errors:
//! the decoder recovers from them locally and reports them as events, so only
//! transport-level failures surface here.

use thiserror::Error;

/// Represents the different error types that can occur in the Teleinfo crate.
#[derive(Debug, Error)]
pub enum TeleinfoError {
    /// Indicates an error related to the serial port communication.
    #[error("Serial port error: {0}")]
    SerialPort(String),

    /// Indicates an I/O error while reading the byte stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Indicates that no line arrived within the configured line timeout.
    #[error("Timed out waiting for a line from the meter")]
    ReadTimeout,

    /// Indicates that the byte stream closed before a complete frame was read.
    #[error("Stream closed before a complete frame was read")]
    StreamClosed,
}
