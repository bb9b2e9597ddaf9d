//! Teleinfo frame representation and typed field access.
//!
//! A frame is the set of label/value data groups received between one STX
//! marker and the following ETX marker. Frames are immutable once built;
//! the store replaces them wholesale at frame boundaries.

use std::collections::HashMap;

/// A complete Teleinfo frame.
///
/// Labels are uppercase ASCII tokens as transmitted by the meter
/// (e.g. `ADCO`, `HCHC`, `PAPP`); values are kept as raw strings and
/// coerced on lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    fields: HashMap<String, String>,
}

/// Value of a single frame field after numeric coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// All-digit values: index counters, intensities, apparent power.
    Integer(u64),
    /// Everything else: tariff codes, schedule letters, status words.
    Text(String),
}

impl FieldValue {
    /// Coerces a raw field value. A value made only of ASCII decimal digits
    /// is semantically the integer it encodes (leading zeroes included);
    /// any other value is an opaque token.
    pub fn coerce(raw: &str) -> FieldValue {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<u64>() {
                return FieldValue::Integer(n);
            }
        }
        FieldValue::Text(raw.to_string())
    }
}

impl Frame {
    /// Creates an empty frame.
    pub fn new() -> Self {
        Frame::default()
    }

    pub(crate) fn from_fields(fields: HashMap<String, String>) -> Self {
        Frame { fields }
    }

    /// Returns the raw value stored under an exact label, if present.
    pub fn raw(&self, label: &str) -> Option<&str> {
        self.fields.get(label).map(String::as_str)
    }

    /// Looks a field up by key, case-insensitively, and coerces its value.
    ///
    /// Returns `None` when the frame carries no such label; a missing field
    /// is not an error, consumers keep their previous value.
    pub fn field(&self, key: &str) -> Option<FieldValue> {
        self.fields
            .get(&key.to_ascii_uppercase())
            .map(|raw| FieldValue::coerce(raw))
    }

    /// Number of data groups in this frame.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the label/value pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
