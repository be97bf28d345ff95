//! Helpers for building fixture state changes
//!
//! The control surface edits one instance at a time but sends whole lists;
//! these functions produce those lists from a received snapshot.

use crate::el_path::ElPath;
use crate::ids::DecoratorId;
use crate::shape::{FixtureState, InstanceShape, ValueEntry};

/// Captured props shapes
#[inline]
#[must_use]
pub fn props_of(state: &FixtureState) -> &[InstanceShape] {
    &state.props
}

/// Captured state shapes
#[inline]
#[must_use]
pub fn state_of(state: &FixtureState) -> &[InstanceShape] {
    &state.state
}

/// Find the shape of a slot
#[must_use]
pub fn find_instance<'a>(
    list: &'a [InstanceShape],
    decorator_id: DecoratorId,
    el_path: &ElPath,
) -> Option<&'a InstanceShape> {
    list.iter().find(|shape| shape.is_slot(decorator_id, el_path))
}

/// Copy of `list` with one slot's values replaced
///
/// Other shapes are returned untouched. If the slot is not in the list the
/// copy is identical to the input.
#[must_use]
pub fn update_instance_values(
    list: &[InstanceShape],
    decorator_id: DecoratorId,
    el_path: &ElPath,
    values: Vec<ValueEntry>,
) -> Vec<InstanceShape> {
    let mut values = Some(values);
    list.iter()
        .map(|shape| {
            if shape.is_slot(decorator_id, el_path) {
                if let Some(values) = values.take() {
                    return InstanceShape {
                        values,
                        ..shape.clone()
                    };
                }
            }
            shape.clone()
        })
        .collect()
}
