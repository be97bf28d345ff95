//! Error types for fixture state
//!
//! Covers:
//! - Value decoding (wire string → live value)
//! - Element path parsing
//! - Store lookups

use crate::ids::DecoratorId;
use crate::shape::ValueKind;

/// Errors from the value codec
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The string is not valid encoded content
    #[error("cannot decode value: {0}")]
    Decode(#[from] serde_json::Error),

    /// The entry carries no encoded content
    #[error("value '{key}' is not serializable")]
    NotSerializable { key: String },
}

/// Errors from element path parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path contains an empty segment (`a..b`)
    #[error("empty path segment")]
    EmptySegment,
}

/// Errors from the fixture state store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No shape for this instance in the current snapshot
    #[error("no {kind} shape for decorator {decorator_id}")]
    UnknownInstance {
        kind: ValueKind,
        decorator_id: DecoratorId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_error_display() {
        let err = CodecError::NotSerializable {
            key: "onClick".to_string(),
        };
        assert_eq!(err.to_string(), "value 'onClick' is not serializable");
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::UnknownInstance {
            kind: ValueKind::State,
            decorator_id: DecoratorId(3),
        };
        assert_eq!(err.to_string(), "no state shape for decorator 3");
    }
}
