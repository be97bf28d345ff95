//! Value codec
//!
//! Converts live values to and from their wire strings. The textual form is
//! JSON. A value only counts as serializable if its encoding decodes back to
//! an equal value; anything else is reported by name with no content.

use crate::error::CodecError;
use crate::shape::ValueEntry;
use crate::value::{LiveValue, ValueMap};

/// Encode one named value
///
/// Never fails: values without a lossless encoding come back as
/// non-serializable entries.
#[must_use]
pub fn encode(name: &str, value: &LiveValue) -> ValueEntry {
    match value {
        LiveValue::Data(data) => match serde_json::to_string(data) {
            Ok(stringified) if round_trips(&stringified, data) => {
                ValueEntry::serializable(name, stringified)
            }
            _ => {
                tracing::trace!(key = name, "value does not round-trip; marking unserializable");
                ValueEntry::unserializable(name)
            }
        },
        LiveValue::Opaque { .. } => ValueEntry::unserializable(name),
    }
}

/// Encode every value of an instance, keeping declaration order
#[must_use]
pub fn encode_all(values: &ValueMap) -> Vec<ValueEntry> {
    values.iter().map(|(key, value)| encode(key, value)).collect()
}

/// Decode a wire string back into a live value
///
/// # Errors
/// `CodecError::Decode` if the string is not valid encoded content
pub fn decode(stringified: &str) -> Result<LiveValue, CodecError> {
    let data: serde_json::Value = serde_json::from_str(stringified)?;
    Ok(LiveValue::Data(data))
}

/// Decode the content of an entry
///
/// # Errors
/// - `CodecError::NotSerializable` if the entry has no content
/// - `CodecError::Decode` if the content is malformed
pub fn decode_entry(entry: &ValueEntry) -> Result<LiveValue, CodecError> {
    match &entry.stringified {
        Some(stringified) => decode(stringified),
        None => Err(CodecError::NotSerializable {
            key: entry.key.clone(),
        }),
    }
}

fn round_trips(stringified: &str, original: &serde_json::Value) -> bool {
    serde_json::from_str::<serde_json::Value>(stringified).is_ok_and(|back| &back == original)
}

impl ValueEntry {
    /// Decode this entry through the codec
    ///
    /// # Errors
    /// See [`decode_entry`]
    #[inline]
    pub fn parse(&self) -> Result<LiveValue, CodecError> {
        decode_entry(self)
    }
}
