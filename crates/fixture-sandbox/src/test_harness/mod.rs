//! Deterministic rendering environment for tests and demos
//!
//! [`SimSandbox`] stands in for a real renderer: fixtures are small element
//! trees, components render to text, and state-mock decorators seed
//! component state. Everything runs in memory and in the caller's thread.

pub mod fixtures;
mod sim;

pub use sim::{ComponentType, Element, SimSandbox};
