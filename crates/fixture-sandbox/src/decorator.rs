//! Decorator capability
//!
//! A decorator wraps a component under test, seeds its props or state, and
//! exposes the live values for capture and override. Any sandbox integration
//! that cannot provide these operations cannot take part in fixture state
//! synchronization.

use fixture_state::{LiveValue, ValueMap};

/// Live access to one side (props or state) of a decorated instance
pub trait Decorator {
    /// Current values in declaration order
    fn read(&self) -> ValueMap;

    /// Set one value
    fn write(&mut self, key: &str, value: LiveValue);

    /// Remove a value entirely (absent, not reset)
    fn delete(&mut self, key: &str);

    /// Values the decorator was configured with
    ///
    /// Compared by value to decide whether a re-rendered slot is still the
    /// same logical instance.
    fn initial_seed(&self) -> ValueMap;

    /// Drop every current value and restore the seed
    fn reset(&mut self) {
        for key in self.read().keys() {
            self.delete(key);
        }
        for (key, value) in self.initial_seed() {
            self.write(&key, value);
        }
    }
}
