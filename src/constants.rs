//! Teleinfo Protocol Constants
//!
//! This module defines constants used in the Teleinfo (TIC) protocol
//! implementation, based on the Enedis customer tele-information standard
//! (historic mode).

/// Start-of-frame control byte (STX).
pub const TIC_STX: u8 = 0x02;

/// End-of-frame control byte (ETX).
pub const TIC_ETX: u8 = 0x03;

/// End-of-transmission byte emitted when the meter interrupts a frame (EOT).
pub const TIC_EOT: u8 = 0x04;

/// Carriage return terminating each data group.
pub const TIC_CR: u8 = 0x0D;

/// Line feed opening each data group.
pub const TIC_LF: u8 = 0x0A;

/// Mask applied to the byte sum when computing a data group checksum.
pub const CHECKSUM_MASK: u8 = 0x3F;

/// Offset added to the masked byte sum to land in the printable range.
pub const CHECKSUM_OFFSET: u8 = 0x20;

/// Default serial device for USB Teleinfo adapters.
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// TIC historic mode baud rate. Fixed by the meter standard.
pub const TIC_BAUD_RATE: u32 = 1200;

/// Default timeout for reading a single line from the meter, in seconds.
/// The meter emits a frame roughly every 1-2 seconds, so a 5 second gap
/// means the link is dead.
pub const DEFAULT_LINE_TIMEOUT_SECS: u64 = 5;

/// Default minimum interval between two pull-mode fetches, in seconds.
pub const DEFAULT_THROTTLE_SECS: u64 = 60;
