//! The teleinfo module contains the components responsible for the core TIC
//! protocol implementation: frame decoding, serial transport and the shared
//! frame store.

pub mod decoder;
pub mod frame;
pub mod labels;
pub mod serial;
pub mod serial_mock;
pub mod store;

pub use decoder::{checksum, decode_line, DecoderState, FrameDecoder, FrameEvent};
pub use frame::{FieldValue, Frame};
pub use serial::{open_blocking, open_port, LineReader, SerialConfig};
pub use store::{BlockingLineSource, FrameSource, FrameStore, ThrottledReader};
