//! # Teleinfo Frame Decoder
//!
//! This module provides the line-oriented state machine that turns the raw
//! text stream coming from the meter into complete [`Frame`]s. The decoder
//! performs no I/O: callers feed it decoded lines one at a time and act on
//! the returned [`FrameEvent`].
//!
//! The stream is noisy by nature. The first line after opening the port is
//! usually torn mid-group, a data group can be mangled by a parity glitch,
//! and a frame can restart without its predecessor being terminated. All of
//! these are recovered locally: a bad line costs at most that line, never a
//! previously accumulated field and never the decoder itself.

use crate::constants::{
    CHECKSUM_MASK, CHECKSUM_OFFSET, TIC_CR, TIC_EOT, TIC_ETX, TIC_LF, TIC_STX,
};
use crate::teleinfo::frame::Frame;
use log::debug;
use std::collections::HashMap;

/// Represents the two states of the decoder state machine.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DecoderState {
    /// Between frames or at stream start: lines are discarded until a
    /// start-of-frame marker is seen.
    Seeking,
    /// Accumulating data groups until an end-of-frame marker is seen.
    InFrame,
}

/// Outcome of feeding one line to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    /// The line carried nothing of interest (inter-frame noise, blank line).
    None,
    /// A start-of-frame marker was seen; accumulation begins anew.
    FrameStarted,
    /// A data group was recorded into the accumulating frame.
    FieldAccepted { label: String, value: String },
    /// A data group was discarded; the frame itself continues.
    FieldRejected { reason: String },
    /// An end-of-frame marker closed the accumulating frame.
    FrameCompleted(Frame),
}

/// Stateful decoder converting a sequence of lines into completed frames.
pub struct FrameDecoder {
    state: DecoderState,
    fields: HashMap<String, String>,
    verify_checksums: bool,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Creates a decoder in the `Seeking` state. Trailing checksum tokens
    /// are ignored unless [`with_checksum_verification`] enables them.
    ///
    /// [`with_checksum_verification`]: FrameDecoder::with_checksum_verification
    pub fn new() -> Self {
        FrameDecoder {
            state: DecoderState::Seeking,
            fields: HashMap::new(),
            verify_checksums: false,
        }
    }

    /// Enables verification of the per-group checksum character when the
    /// meter transmits one as a third token.
    pub fn with_checksum_verification(mut self, enabled: bool) -> Self {
        self.verify_checksums = enabled;
        self
    }

    /// Current state of the state machine.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Feeds one decoded line and advances the state machine.
    ///
    /// Markers are handled in the order they appear within the line: text
    /// before an ETX is a final data group, the ETX publishes the finished
    /// frame, and a following STX restarts accumulation. On the wire ETX is
    /// immediately followed by the next frame's STX while data groups open
    /// with LF and close with CR, so every steady-state frame boundary
    /// arrives as a single record carrying `<group> ETX STX`. A second STX
    /// with no intervening ETX is a desync and discards the accumulation.
    ///
    /// The returned event is the most significant outcome of the line:
    /// completion over start over field handling.
    pub fn feed(&mut self, line: &str) -> FrameEvent {
        let mut completed = None;
        let mut started = false;
        let mut field_event = FrameEvent::None;

        let mut rest = line;
        while let Some(pos) = rest.find(is_marker) {
            let (text, tail) = rest.split_at(pos);
            self.feed_text(text, &mut field_event);
            match tail.as_bytes()[0] {
                TIC_STX => {
                    if self.state == DecoderState::InFrame && !self.fields.is_empty() {
                        debug!(
                            "start marker with no frame terminator, discarding {} accumulated fields",
                            self.fields.len()
                        );
                    }
                    self.fields.clear();
                    self.state = DecoderState::InFrame;
                    started = true;
                }
                TIC_ETX => {
                    if self.state == DecoderState::InFrame {
                        completed = Some(Frame::from_fields(std::mem::take(&mut self.fields)));
                        self.state = DecoderState::Seeking;
                    }
                }
                _ => {
                    // EOT: the meter aborted the frame; expose nothing.
                    if self.state == DecoderState::InFrame {
                        debug!("frame interrupted by EOT, discarding it");
                        self.fields.clear();
                        self.state = DecoderState::Seeking;
                    }
                }
            }
            rest = &tail[1..];
        }
        self.feed_text(rest, &mut field_event);

        if let Some(frame) = completed {
            return FrameEvent::FrameCompleted(frame);
        }
        if started {
            return FrameEvent::FrameStarted;
        }
        field_event
    }

    fn feed_text(&mut self, text: &str, field_event: &mut FrameEvent) {
        // Outside a frame everything is warm-up noise; blank segments are
        // discarded, not rejected.
        if self.state != DecoderState::InFrame || text.trim().is_empty() {
            return;
        }
        *field_event = self.feed_data_group(text);
    }

    fn feed_data_group(&mut self, line: &str) -> FrameEvent {
        let mut tokens = line.split_ascii_whitespace();
        let (Some(label), Some(value)) = (tokens.next(), tokens.next()) else {
            let reason = format!("data group {line:?} has fewer than two tokens");
            debug!("{reason}");
            return FrameEvent::FieldRejected { reason };
        };

        if self.verify_checksums {
            // The checksum character sits one separator after the value and
            // can itself be a space (0x20, the lowest legal value), so it is
            // located by position rather than by whitespace tokenization.
            let ascii_ws = |c: char| c.is_ascii_whitespace();
            let label_start = line.len() - line.trim_start_matches(ascii_ws).len();
            let after_label = &line[label_start + label.len()..];
            let value_start = after_label.len() - after_label.trim_start_matches(ascii_ws).len();
            let value_end = label_start + label.len() + value_start + value.len();
            let tail = &line[value_end..];

            let mut chars = tail.chars();
            if let (Some(sep), Some(ck), None) = (chars.next(), chars.next(), chars.next()) {
                if sep.is_ascii_whitespace() {
                    let expected = checksum(label, value);
                    if ck != expected {
                        let reason = format!(
                            "checksum mismatch for {label}: expected {expected:?}, got {ck:?}"
                        );
                        debug!("{reason}");
                        return FrameEvent::FieldRejected { reason };
                    }
                }
            }
        }

        // Within one frame a repeated label overwrites the earlier value.
        self.fields
            .insert(label.to_string(), value.to_string());
        FrameEvent::FieldAccepted {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

fn is_marker(c: char) -> bool {
    matches!(c, '\u{2}' | '\u{3}' | '\u{4}')
}

/// Computes the checksum character of a data group: the byte sum of
/// `LABEL<SP>VALUE`, masked to 6 bits and offset into the printable range.
pub fn checksum(label: &str, value: &str) -> char {
    let sum = label
        .bytes()
        .chain(std::iter::once(b' '))
        .chain(value.bytes())
        .fold(0u32, |acc, b| acc.wrapping_add(u32::from(b)));
    ((sum as u8 & CHECKSUM_MASK) + CHECKSUM_OFFSET) as char
}

/// Decodes a raw record read from the serial port into a line of text.
///
/// TIC payloads are 7-bit ASCII transmitted with an even parity bit, so the
/// top bit of every byte is masked off first. Terminator and separator bytes
/// (CR/LF) are stripped; frame markers and printable characters are kept.
/// A record carrying any other control byte is transport garbage and is
/// dropped whole by returning `None`.
pub fn decode_line(raw: &[u8]) -> Option<String> {
    let mut line = String::with_capacity(raw.len());
    for &byte in raw {
        let byte = byte & 0x7F;
        match byte {
            TIC_CR | TIC_LF => continue,
            TIC_STX | TIC_ETX | TIC_EOT => line.push(byte as char),
            b'\t' | 0x20..=0x7E => line.push(byte as char),
            _ => return None,
        }
    }
    Some(line)
}
