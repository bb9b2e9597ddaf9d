//! # Teleinfo Serial Communication
//!
//! This module handles the serial transport side of the protocol: opening
//! the port with the fixed TIC historic mode parameters and reading
//! newline-terminated records from any async byte stream.
//!
//! The TIC link is receive-only. Its parameters (1200 baud, 7 data bits,
//! even parity, 1 stop bit, hardware flow control) are meter standard
//! constants, exposed as defaults rather than per-field tunables.

use crate::constants::{DEFAULT_DEVICE, DEFAULT_LINE_TIMEOUT_SECS, TIC_BAUD_RATE, TIC_LF};
use crate::error::TeleinfoError;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::time::timeout;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, StopBits};

/// Configuration for the serial connection to the meter.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub device: String,
    pub baudrate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
    /// Maximum silence tolerated between two records.
    pub line_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            device: DEFAULT_DEVICE.to_string(),
            baudrate: TIC_BAUD_RATE,
            data_bits: DataBits::Seven,
            parity: Parity::Even,
            stop_bits: StopBits::One,
            flow_control: FlowControl::Hardware,
            line_timeout: Duration::from_secs(DEFAULT_LINE_TIMEOUT_SECS),
        }
    }
}

/// Opens the configured device as an async stream for the push-mode reader.
pub fn open_port(config: &SerialConfig) -> Result<tokio_serial::SerialStream, TeleinfoError> {
    tokio_serial::new(&config.device, config.baudrate)
        .data_bits(config.data_bits)
        .parity(config.parity)
        .stop_bits(config.stop_bits)
        .flow_control(config.flow_control)
        .timeout(config.line_timeout)
        .open_native_async()
        .map_err(|e| TeleinfoError::SerialPort(e.to_string()))
}

/// Opens the configured device as a blocking port for pull-mode consumers.
pub fn open_blocking(
    config: &SerialConfig,
) -> Result<Box<dyn tokio_serial::SerialPort>, TeleinfoError> {
    tokio_serial::new(&config.device, config.baudrate)
        .data_bits(config.data_bits)
        .parity(config.parity)
        .stop_bits(config.stop_bits)
        .flow_control(config.flow_control)
        .timeout(config.line_timeout)
        .open()
        .map_err(|e| TeleinfoError::SerialPort(e.to_string()))
}

/// Buffered reader yielding one raw newline-terminated record at a time.
pub struct LineReader<R> {
    inner: BufReader<R>,
    line_timeout: Duration,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(stream: R, line_timeout: Duration) -> Self {
        LineReader {
            inner: BufReader::new(stream),
            line_timeout,
            buf: Vec::with_capacity(64),
        }
    }

    /// Reads the next record, including any terminator bytes.
    ///
    /// Returns `Ok(None)` when the stream reaches a clean end of file, and
    /// [`TeleinfoError::ReadTimeout`] when the meter stays silent longer
    /// than the configured line timeout.
    pub async fn next_line(&mut self) -> Result<Option<Vec<u8>>, TeleinfoError> {
        self.buf.clear();
        let n = timeout(self.line_timeout, self.inner.read_until(TIC_LF, &mut self.buf))
            .await
            .map_err(|_| TeleinfoError::ReadTimeout)??;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_line_reader_splits_records() {
        let data: &[u8] = b"\x02\nADCO 123\r\nPAPP 00750\r\n\x03\n";
        let mut reader = LineReader::new(data, Duration::from_secs(1));

        assert_eq!(reader.next_line().await.unwrap(), Some(b"\x02\n".to_vec()));
        assert_eq!(
            reader.next_line().await.unwrap(),
            Some(b"ADCO 123\r\n".to_vec())
        );
        assert_eq!(
            reader.next_line().await.unwrap(),
            Some(b"PAPP 00750\r\n".to_vec())
        );
        assert_eq!(reader.next_line().await.unwrap(), Some(b"\x03\n".to_vec()));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_reader_yields_unterminated_tail() {
        let data: &[u8] = b"MOTDETAT 000000";
        let mut reader = LineReader::new(data, Duration::from_secs(1));
        assert_eq!(
            reader.next_line().await.unwrap(),
            Some(b"MOTDETAT 000000".to_vec())
        );
        assert_eq!(reader.next_line().await.unwrap(), None);
    }
}
