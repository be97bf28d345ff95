//! Fixture State
//!
//! The data model shared by a component sandbox and its control surface.
//!
//! # Core Concepts
//!
//! - [`LiveValue`]: a named value read from a decorated instance
//! - [`ValueEntry`]: the wire form of one value, produced by the [`codec`]
//! - [`ElPath`]: structural position of a decorated element in a rendered tree
//! - [`InstanceShape`]: captured values of one decorated instance
//! - [`FixtureState`]: every captured shape of the selected fixture
//! - [`FixtureStateChange`]: a directive sent by the control surface
//! - [`FixtureStateStore`]: canonical snapshot plus the override algebra
//!
//! # Example
//!
//! ```rust,ignore
//! use fixture_state::{codec, FixtureStateStore, LiveValue};
//!
//! let entry = codec::encode("count", &LiveValue::from(5));
//! assert_eq!(entry.stringified.as_deref(), Some("5"));
//!
//! let mut store = FixtureStateStore::new();
//! let snapshot = store.capture(&captured_instances);
//! if let Some(state) = store.take_if_changed() {
//!     // broadcast `state`
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod codec;
mod el_path;
mod error;
pub mod helpers;
mod ids;
mod shape;
mod store;
mod value;

// Re-exports
pub use el_path::ElPath;
pub use error::{CodecError, PathError, StoreError};
pub use ids::{DecoratorId, FixturePath, RendererId};
pub use shape::{FixtureState, FixtureStateChange, InstanceShape, ValueEntry, ValueKind};
pub use store::{diff, CapturedInstance, ChangeStep, FixtureStateStore};
pub use value::{LiveValue, ValueMap};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with fixture state
    pub use crate::codec::{decode, encode};
    pub use crate::{
        CapturedInstance, ChangeStep, DecoratorId, ElPath, FixturePath, FixtureState,
        FixtureStateChange, FixtureStateStore, InstanceShape, LiveValue, RendererId, ValueEntry,
        ValueKind, ValueMap,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::str::FromStr;

    fn captured(count: i64) -> CapturedInstance {
        let mut state = ValueMap::new();
        state.insert("count".to_string(), LiveValue::from(count));
        CapturedInstance {
            decorator_id: DecoratorId(0),
            el_path: ElPath::from_str("children").unwrap(),
            component_name: "Counter".to_string(),
            props: Some(ValueMap::new()),
            state: Some(state),
        }
    }

    #[test]
    fn capture_then_override_flow() {
        let mut store = FixtureStateStore::new();
        store.next_render_key();
        let first = store.capture(&[captured(5)]);
        assert_eq!(first.state[0].values[0].stringified.as_deref(), Some("5"));
        assert!(store.take_if_changed().is_some());

        let list = helpers::update_instance_values(
            &first.state,
            DecoratorId(0),
            &ElPath::from_str("children").unwrap(),
            vec![ValueEntry::serializable("count", "100")],
        );
        let steps = store.apply_change(FixtureStateChange::new().with_state(list));
        assert!(matches!(steps.as_slice(), [ChangeStep::Override(ValueKind::State, _)]));
        assert!(store.is_overridden(ValueKind::State, DecoratorId(0)));
    }

    #[test]
    fn recapture_without_divergence_is_silent() {
        let mut store = FixtureStateStore::new();
        store.capture(&[captured(5)]);
        assert!(store.take_if_changed().is_some());

        store.capture(&[captured(5)]);
        assert!(store.take_if_changed().is_none());
    }
}
