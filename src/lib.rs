//! # teleinfo-rs - A Rust Crate for Teleinfo (TIC) Meter Communication
//!
//! The teleinfo-rs crate provides a Rust-based implementation of the Teleinfo
//! protocol ("TIC", Télé-Information Client), the serial broadcast used by
//! French electricity meters to publish tariff, intensity, power and index
//! readings.
//!
//! ## Features
//!
//! - Connect to a meter over a serial port with the fixed TIC historic mode
//!   parameters (1200 baud, 7 data bits, even parity, 1 stop bit)
//! - Decode the continuous byte stream into complete label/value frames,
//!   tolerating warm-up noise, torn lines and malformed data groups
//! - Share the latest frame with any number of independent readers through
//!   an atomically replaced cache driven by a cancellable background task
//! - Alternatively poll the meter on demand with a throttled synchronous
//!   fetch that reuses the same decoder
//! - Support for logging and error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use teleinfo_rs::{init_logger, start_store, FieldValue, SerialConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), teleinfo_rs::TeleinfoError> {
//!     init_logger();
//!     let store = start_store(&SerialConfig::default())?;
//!
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!     if let Some(FieldValue::Integer(papp)) = store.field("papp") {
//!         println!("apparent power: {papp} VA");
//!     }
//!     store.stop();
//!     Ok(())
//! }
//! ```

pub mod constants;
pub mod error;
pub mod logging;
pub mod teleinfo;

pub use crate::error::TeleinfoError;
pub use crate::logging::{init_logger, log_info};

// Core Teleinfo types
pub use teleinfo::decoder::{DecoderState, FrameDecoder, FrameEvent};
pub use teleinfo::frame::{FieldValue, Frame};
pub use teleinfo::serial::SerialConfig;
pub use teleinfo::store::{BlockingLineSource, FrameSource, FrameStore, ThrottledReader};

use std::sync::Arc;

/// Open the meter's serial device using the TIC historic mode defaults.
///
/// # Arguments
/// * `device` - Serial device path (e.g. "/dev/ttyUSB0")
///
/// # Returns
/// * `Ok(SerialStream)` - Opened async stream ready for [`FrameStore::start`]
/// * `Err(TeleinfoError)` - Opening the port failed
pub fn connect(device: &str) -> Result<tokio_serial::SerialStream, TeleinfoError> {
    let config = SerialConfig {
        device: device.to_string(),
        ..SerialConfig::default()
    };
    teleinfo::serial::open_port(&config)
}

/// Open the configured device and spawn a frame store reading from it.
///
/// Must be called from within a tokio runtime; the producer task runs until
/// the stream ends or [`FrameStore::stop`] is called.
pub fn start_store(config: &SerialConfig) -> Result<Arc<FrameStore>, TeleinfoError> {
    let port = teleinfo::serial::open_port(config)?;
    let store = Arc::new(FrameStore::new());
    store.start(port, config.line_timeout);
    Ok(store)
}
