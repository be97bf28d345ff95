//! Fixture state store
//!
//! Holds the canonical snapshot of the selected fixture and the override
//! algebra applied to incoming [`FixtureStateChange`]s.
//!
//! Two shapes of change have opposite effects on absent data and are kept
//! as separate steps:
//! - an empty list for a kind clears every override of that kind and
//!   reverts instances to their seeded values ([`ChangeStep::Revert`])
//! - a non-empty list replaces the stored shapes; keys missing from a
//!   shape are deleted on the live instance ([`ChangeStep::Override`])

use crate::codec;
use crate::el_path::ElPath;
use crate::error::StoreError;
use crate::ids::DecoratorId;
use crate::shape::{FixtureState, FixtureStateChange, InstanceShape, ValueKind};
use crate::value::ValueMap;
use std::collections::HashSet;

/// Live values read from one decorated instance, ready for encoding
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedInstance {
    pub decorator_id: DecoratorId,
    pub el_path: ElPath,
    pub component_name: String,
    /// `None` when the instance has no props decorator
    pub props: Option<ValueMap>,
    /// `None` when the instance has no state decorator
    pub state: Option<ValueMap>,
}

impl CapturedInstance {
    /// Values of one kind, if the instance exposes that kind
    #[inline]
    #[must_use]
    pub fn values(&self, kind: ValueKind) -> Option<&ValueMap> {
        match kind {
            ValueKind::Props => self.props.as_ref(),
            ValueKind::State => self.state.as_ref(),
        }
    }
}

/// Work the caller must perform after [`FixtureStateStore::apply_change`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeStep {
    /// Reset every live instance of this kind to its decorator's seed
    Revert(ValueKind),
    /// Write these shapes onto their live instances
    Override(ValueKind, Vec<InstanceShape>),
}

/// Canonical snapshot and override bookkeeping for one fixture selection
#[derive(Debug, Default)]
pub struct FixtureStateStore {
    /// Latest capture (or accepted directive)
    current: FixtureState,
    /// Snapshot carried by the last broadcast
    last_emitted: Option<FixtureState>,
    /// Generation counter for full re-renders
    render_key: u64,
    /// Slots whose values were set by the control surface
    overridden: HashSet<(ValueKind, DecoratorId)>,
}

impl FixtureStateStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot
    #[inline]
    #[must_use]
    pub fn current(&self) -> &FixtureState {
        &self.current
    }

    /// Current render generation
    #[inline]
    #[must_use]
    pub fn render_key(&self) -> u64 {
        self.render_key
    }

    /// Start a new render generation
    ///
    /// Called on full re-renders only, never on value updates.
    #[inline]
    pub fn next_render_key(&mut self) -> u64 {
        self.render_key += 1;
        self.render_key
    }

    /// Encode the given instances into a fresh snapshot
    ///
    /// The snapshot replaces the stored one wholesale. Instances keep the
    /// order they are given in.
    pub fn capture(&mut self, instances: &[CapturedInstance]) -> FixtureState {
        let mut state = FixtureState::new();

        for instance in instances {
            for kind in ValueKind::ALL {
                if let Some(values) = instance.values(kind) {
                    state.list_mut(kind).push(InstanceShape {
                        decorator_id: instance.decorator_id,
                        el_path: instance.el_path.clone(),
                        component_name: instance.component_name.clone(),
                        render_key: self.render_key,
                        values: codec::encode_all(values),
                    });
                }
            }
        }

        self.current = state.clone();
        state
    }

    /// Accept a directive from the control surface
    ///
    /// Returns the steps the caller must run against the live instances,
    /// props before state.
    pub fn apply_change(&mut self, mut change: FixtureStateChange) -> Vec<ChangeStep> {
        let mut steps = Vec::new();

        for kind in ValueKind::ALL {
            match change.take(kind) {
                None => {}
                Some(shapes) if shapes.is_empty() => {
                    self.overridden.retain(|(k, _)| *k != kind);
                    self.current.list_mut(kind).clear();
                    tracing::debug!(%kind, "clearing all overrides");
                    steps.push(ChangeStep::Revert(kind));
                }
                Some(shapes) => {
                    for shape in &shapes {
                        self.overridden.insert((kind, shape.decorator_id));
                    }
                    tracing::debug!(%kind, instances = shapes.len(), "accepting overrides");
                    self.current.list_mut(kind).clone_from(&shapes);
                    steps.push(ChangeStep::Override(kind, shapes));
                }
            }
        }

        steps
    }

    /// Return the snapshot if it differs from the last broadcast one
    ///
    /// Marks the returned snapshot as broadcast.
    pub fn take_if_changed(&mut self) -> Option<FixtureState> {
        let changed = self
            .last_emitted
            .as_ref()
            .map_or(true, |previous| diff(previous, &self.current));

        if changed {
            self.last_emitted = Some(self.current.clone());
            Some(self.current.clone())
        } else {
            None
        }
    }

    /// Check if a slot carries an override of this kind
    #[inline]
    #[must_use]
    pub fn is_overridden(&self, kind: ValueKind, decorator_id: DecoratorId) -> bool {
        self.overridden.contains(&(kind, decorator_id))
    }

    /// Current shapes of every overridden kind for a slot
    ///
    /// Used to carry overrides onto whatever component occupies a retained
    /// slot after a re-render.
    #[must_use]
    pub fn overrides_for(&self, decorator_id: DecoratorId) -> Vec<(ValueKind, InstanceShape)> {
        ValueKind::ALL
            .into_iter()
            .filter(|kind| self.is_overridden(*kind, decorator_id))
            .filter_map(|kind| {
                self.shape(kind, decorator_id)
                    .ok()
                    .map(|shape| (kind, shape.clone()))
            })
            .collect()
    }

    /// Look up the stored shape of a slot
    ///
    /// # Errors
    /// `StoreError::UnknownInstance` if the snapshot has no such shape
    pub fn shape(
        &self,
        kind: ValueKind,
        decorator_id: DecoratorId,
    ) -> Result<&InstanceShape, StoreError> {
        self.current
            .list(kind)
            .iter()
            .find(|shape| shape.decorator_id == decorator_id)
            .ok_or(StoreError::UnknownInstance { kind, decorator_id })
    }

    /// Drop overrides of released slots
    pub fn forget(&mut self, released: &[DecoratorId]) {
        if released.is_empty() {
            return;
        }
        self.overridden.retain(|(_, id)| !released.contains(id));
    }

    /// Discard everything tied to the current selection
    ///
    /// The render generation keeps counting.
    pub fn reset(&mut self) {
        self.current = FixtureState::new();
        self.last_emitted = None;
        self.overridden.clear();
    }
}

/// Structural inequality of two snapshots
#[inline]
#[must_use]
pub fn diff(previous: &FixtureState, next: &FixtureState) -> bool {
    previous != next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ValueEntry;
    use crate::value::LiveValue;
    use std::str::FromStr;

    fn instance(id: u64, path: &str, count: Option<i64>) -> CapturedInstance {
        let state = count.map(|c| {
            let mut values = ValueMap::new();
            values.insert("count".to_string(), LiveValue::from(c));
            values
        });
        CapturedInstance {
            decorator_id: DecoratorId(id),
            el_path: ElPath::from_str(path).unwrap(),
            component_name: "Counter".to_string(),
            props: Some(ValueMap::new()),
            state,
        }
    }

    #[test]
    fn capture_splits_props_and_state() {
        let mut store = FixtureStateStore::new();
        let state = store.capture(&[instance(0, "children", Some(5)), instance(1, "0", None)]);

        assert_eq!(state.props.len(), 2);
        assert_eq!(state.state.len(), 1);
        assert_eq!(state.state[0].values, vec![ValueEntry::serializable("count", "5")]);
    }

    #[test]
    fn render_key_is_stamped_on_both_kinds() {
        let mut store = FixtureStateStore::new();
        store.next_render_key();
        store.next_render_key();
        let state = store.capture(&[instance(0, "children", Some(5))]);

        assert_eq!(state.props[0].render_key, 2);
        assert_eq!(state.state[0].render_key, 2);
    }

    #[test]
    fn empty_list_reverts_kind() {
        let mut store = FixtureStateStore::new();
        let state = store.capture(&[instance(0, "children", Some(5))]);
        store.apply_change(FixtureStateChange::new().with_state(state.state.clone()));
        assert!(store.is_overridden(ValueKind::State, DecoratorId(0)));

        let steps = store.apply_change(FixtureStateChange::new().with_state(Vec::new()));
        assert_eq!(steps, vec![ChangeStep::Revert(ValueKind::State)]);
        assert!(!store.is_overridden(ValueKind::State, DecoratorId(0)));
    }

    #[test]
    fn revert_leaves_other_kind_alone() {
        let mut store = FixtureStateStore::new();
        let state = store.capture(&[instance(0, "children", Some(5))]);
        store.apply_change(
            FixtureStateChange::new()
                .with_props(state.props.clone())
                .with_state(state.state.clone()),
        );

        store.apply_change(FixtureStateChange::new().with_state(Vec::new()));
        assert!(store.is_overridden(ValueKind::Props, DecoratorId(0)));
        assert!(!store.is_overridden(ValueKind::State, DecoratorId(0)));
    }

    #[test]
    fn override_replaces_stored_list() {
        let mut store = FixtureStateStore::new();
        let state = store.capture(&[instance(0, "children", Some(5))]);

        let mut edited = state.state.clone();
        edited[0].values.clear();
        let steps = store.apply_change(FixtureStateChange::new().with_state(edited.clone()));

        assert_eq!(steps, vec![ChangeStep::Override(ValueKind::State, edited.clone())]);
        assert_eq!(store.current().state, edited);
        assert_eq!(store.current().props, state.props);
    }

    #[test]
    fn take_if_changed_suppresses_duplicates() {
        let mut store = FixtureStateStore::new();
        store.capture(&[instance(0, "children", Some(5))]);
        assert!(store.take_if_changed().is_some());

        store.capture(&[instance(0, "children", Some(5))]);
        assert!(store.take_if_changed().is_none());

        store.capture(&[instance(0, "children", Some(6))]);
        assert!(store.take_if_changed().is_some());
    }

    #[test]
    fn overrides_for_returns_current_shapes() {
        let mut store = FixtureStateStore::new();
        let state = store.capture(&[instance(0, "children", Some(5))]);
        store.apply_change(FixtureStateChange::new().with_state(state.state.clone()));

        let overrides = store.overrides_for(DecoratorId(0));
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].0, ValueKind::State);

        store.forget(&[DecoratorId(0)]);
        assert!(store.overrides_for(DecoratorId(0)).is_empty());
    }

    #[test]
    fn reset_forces_next_emission() {
        let mut store = FixtureStateStore::new();
        store.capture(&[instance(0, "children", Some(5))]);
        store.take_if_changed();

        store.reset();
        assert!(store.current().is_empty());
        store.capture(&[instance(0, "children", Some(5))]);
        assert!(store.take_if_changed().is_some());
    }

    #[test]
    fn shape_lookup_reports_unknown_instance() {
        let store = FixtureStateStore::new();
        assert_eq!(
            store.shape(ValueKind::Props, DecoratorId(9)),
            Err(StoreError::UnknownInstance {
                kind: ValueKind::Props,
                decorator_id: DecoratorId(9),
            })
        );
    }
}
