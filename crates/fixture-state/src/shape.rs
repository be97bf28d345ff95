//! Captured instance shapes and fixture state snapshots
//!
//! These are the wire types exchanged between the sandbox and the control
//! surface. Field names follow the protocol's camelCase convention.

use crate::el_path::ElPath;
use crate::ids::DecoratorId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Which side of a decorated instance a shape describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    /// Values passed into the component
    Props,
    /// Values the component holds itself
    State,
}

impl ValueKind {
    /// Both kinds, props first
    pub const ALL: [ValueKind; 2] = [ValueKind::Props, ValueKind::State];

    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Props => "props",
            ValueKind::State => "state",
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named value in wire form
///
/// `stringified` is absent exactly when `serializable` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueEntry {
    pub serializable: bool,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stringified: Option<String>,
}

impl ValueEntry {
    /// Entry carrying an encoded value
    #[inline]
    #[must_use]
    pub fn serializable(key: impl Into<String>, stringified: impl Into<String>) -> Self {
        Self {
            serializable: true,
            key: key.into(),
            stringified: Some(stringified.into()),
        }
    }

    /// Entry for a value that is reported but cannot be edited
    #[inline]
    #[must_use]
    pub fn unserializable(key: impl Into<String>) -> Self {
        Self {
            serializable: false,
            key: key.into(),
            stringified: None,
        }
    }
}

/// Capture of one decorated instance's props or state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceShape {
    pub decorator_id: DecoratorId,
    pub el_path: ElPath,
    pub component_name: String,
    /// Render generation; bumped on full re-renders only
    #[serde(default)]
    pub render_key: u64,
    pub values: Vec<ValueEntry>,
}

impl InstanceShape {
    /// Check if this shape describes the given slot
    #[inline]
    #[must_use]
    pub fn is_slot(&self, decorator_id: DecoratorId, el_path: &ElPath) -> bool {
        self.decorator_id == decorator_id && &self.el_path == el_path
    }

    /// Find a value by key
    #[inline]
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&ValueEntry> {
        self.values.iter().find(|entry| entry.key == key)
    }

    /// Check if the shape lists a key
    #[inline]
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.value(key).is_some()
    }
}

/// Full snapshot for one selected fixture
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FixtureState {
    pub props: Vec<InstanceShape>,
    pub state: Vec<InstanceShape>,
}

impl FixtureState {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shapes of one kind
    #[inline]
    #[must_use]
    pub fn list(&self, kind: ValueKind) -> &[InstanceShape] {
        match kind {
            ValueKind::Props => &self.props,
            ValueKind::State => &self.state,
        }
    }

    /// Mutable shapes of one kind
    #[inline]
    pub fn list_mut(&mut self, kind: ValueKind) -> &mut Vec<InstanceShape> {
        match kind {
            ValueKind::Props => &mut self.props,
            ValueKind::State => &mut self.state,
        }
    }

    /// Check if nothing was captured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty() && self.state.is_empty()
    }
}

/// Partial directive from the control surface
///
/// A kind that is `None` is left untouched. `Some(vec![])` clears the
/// whole kind back to the decorators' seeded values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FixtureStateChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<InstanceShape>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Vec<InstanceShape>>,
}

impl FixtureStateChange {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_props(mut self, props: Vec<InstanceShape>) -> Self {
        self.props = Some(props);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_state(mut self, state: Vec<InstanceShape>) -> Self {
        self.state = Some(state);
        self
    }

    /// Directive for one kind, if present
    #[inline]
    #[must_use]
    pub fn get(&self, kind: ValueKind) -> Option<&[InstanceShape]> {
        match kind {
            ValueKind::Props => self.props.as_deref(),
            ValueKind::State => self.state.as_deref(),
        }
    }

    /// Take the directive for one kind
    #[inline]
    pub fn take(&mut self, kind: ValueKind) -> Option<Vec<InstanceShape>> {
        match kind {
            ValueKind::Props => self.props.take(),
            ValueKind::State => self.state.take(),
        }
    }
}
