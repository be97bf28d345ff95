//! Live values read from decorated instances

use indexmap::IndexMap;
use std::fmt::{self, Display, Formatter};

/// Named values of one decorated instance, in declaration order
pub type ValueMap = IndexMap<String, LiveValue>;

/// A value as it lives inside a decorated instance
///
/// Most values are plain data and travel over the wire. Some cannot be
/// represented textually (callbacks, handles, self-referencing objects);
/// those are still reported by name but can never be edited remotely.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveValue {
    /// Plain data with a JSON representation
    Data(serde_json::Value),

    /// Value with no textual representation
    Opaque {
        /// Short description of what the value is, e.g. `function`
        type_name: String,
    },
}

impl LiveValue {
    /// Create an opaque value
    #[inline]
    #[must_use]
    pub fn opaque(type_name: impl Into<String>) -> Self {
        Self::Opaque {
            type_name: type_name.into(),
        }
    }

    /// Borrow the plain data, if any
    #[inline]
    #[must_use]
    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Data(value) => Some(value),
            Self::Opaque { .. } => None,
        }
    }

    /// Read as an integer
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_data().and_then(serde_json::Value::as_i64)
    }

    /// Check if the value is opaque
    #[inline]
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque { .. })
    }
}

impl From<serde_json::Value> for LiveValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Data(value)
    }
}

impl From<i64> for LiveValue {
    fn from(value: i64) -> Self {
        Self::Data(value.into())
    }
}

impl From<bool> for LiveValue {
    fn from(value: bool) -> Self {
        Self::Data(value.into())
    }
}

impl From<&str> for LiveValue {
    fn from(value: &str) -> Self {
        Self::Data(value.into())
    }
}

impl From<String> for LiveValue {
    fn from(value: String) -> Self {
        Self::Data(value.into())
    }
}

impl Display for LiveValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(serde_json::Value::String(s)) => f.write_str(s),
            Self::Data(value) => write!(f, "{value}"),
            Self::Opaque { type_name } => write!(f, "[{type_name}]"),
        }
    }
}
