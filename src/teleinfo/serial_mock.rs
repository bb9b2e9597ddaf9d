//! Mock serial port implementation for testing
//!
//! This module provides a mock serial port that can be used to test the
//! Teleinfo streaming pipeline without requiring actual hardware. The TIC
//! link is receive-only, so only the read side is modelled.

use crate::constants::{TIC_CR, TIC_ETX, TIC_LF, TIC_STX};
use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Mock serial port that replays queued meter output.
#[derive(Clone, Default)]
pub struct MockSerialPort {
    /// Data to be read from the port (incoming)
    rx_buffer: Arc<Mutex<VecDeque<u8>>>,
    /// Simulated error returned by the next read
    next_error: Arc<Mutex<Option<io::Error>>>,
    /// When set, an empty buffer blocks instead of signalling end of file.
    /// The pending read is never woken, so this is only useful for tests
    /// that cancel the reading task.
    hang_on_empty: Arc<AtomicBool>,
}

impl MockSerialPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw bytes to be read from the port.
    pub fn queue_rx_data(&self, data: &[u8]) {
        let mut rx = self.rx_buffer.lock().unwrap();
        rx.extend(data);
    }

    /// Queue one CRLF-terminated text line.
    pub fn queue_line(&self, line: &str) {
        let mut bytes = line.as_bytes().to_vec();
        bytes.extend_from_slice(b"\r\n");
        self.queue_rx_data(&bytes);
    }

    /// Queue a complete TIC frame exactly as the meter transmits it: STX,
    /// then each data group opened by LF and closed by CR, then ETX with
    /// no trailing separator. Queued back to back, frame boundaries arrive
    /// as a single `<group> CR ETX STX LF` record, as on the real wire.
    pub fn queue_frame(&self, fields: &[(&str, &str)]) {
        let mut bytes = vec![TIC_STX];
        for (label, value) in fields {
            bytes.push(TIC_LF);
            bytes.extend_from_slice(label.as_bytes());
            bytes.push(b' ');
            bytes.extend_from_slice(value.as_bytes());
            bytes.push(TIC_CR);
        }
        bytes.push(TIC_ETX);
        self.queue_rx_data(&bytes);
    }

    /// Set an error to be returned on the next read.
    pub fn set_next_error(&self, error: io::Error) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    /// Make reads on an empty buffer block forever instead of reporting EOF.
    pub fn set_hang_on_empty(&self, hang: bool) {
        self.hang_on_empty.store(hang, Ordering::SeqCst);
    }

    /// Clear any queued data.
    pub fn clear(&self) {
        self.rx_buffer.lock().unwrap().clear();
    }
}

impl AsyncRead for MockSerialPort {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Poll::Ready(Err(error));
        }

        let mut rx = self.rx_buffer.lock().unwrap();
        if rx.is_empty() && self.hang_on_empty.load(Ordering::SeqCst) {
            return Poll::Pending;
        }

        let available = rx.len().min(buf.remaining());
        if available > 0 {
            let data: Vec<u8> = rx.drain(..available).collect();
            buf.put_slice(&data);
        }
        Poll::Ready(Ok(()))
    }
}
