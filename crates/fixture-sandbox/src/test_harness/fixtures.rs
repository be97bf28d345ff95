//! Counter fixtures
//!
//! A stateful counter wrapped in a state mock, plus a restyled variant used
//! to exercise component swaps.

use super::sim::{ComponentType, Element};
use fixture_state::{LiveValue, ValueMap};

/// Renders `"{count} times"`, or `"Missing count"` without a numeric count
#[must_use]
pub fn counter() -> ComponentType {
    ComponentType::new("Counter", |_props, state| {
        match state.get("count").and_then(LiveValue::as_data) {
            Some(count) if count.is_number() => format!("{count} times"),
            _ => "Missing count".to_string(),
        }
    })
    .with_initial_state(count_state(0))
}

/// Renders `"{count} timez"`
#[must_use]
pub fn cool_counter() -> ComponentType {
    ComponentType::new("CoolCounter", |_props, state| {
        let count = state
            .get("count")
            .map_or_else(|| "undefined".to_string(), ToString::to_string);
        format!("{count} timez")
    })
    .with_initial_state(count_state(0))
}

/// `{ count }` state map
#[must_use]
pub fn count_state(count: i64) -> ValueMap {
    let mut state = ValueMap::new();
    state.insert("count".to_string(), LiveValue::from(count));
    state
}

/// `component` inside a state mock seeded with `count`
#[must_use]
pub fn mocked_counter(component: ComponentType, count: i64) -> Element {
    Element::state_mock(
        count_state(count),
        Element::component(component, ValueMap::new()),
    )
}
