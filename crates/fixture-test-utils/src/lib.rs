//! Testing utilities for the fixture-connect workspace
//!
//! Shared fixtures, a connected session harness and small assertions over
//! emitted fixture state.

#![allow(missing_docs)]

use fixture_connect::{connect, ConnectConfig, ConnectError, ConnectHandle, ControlSurface, TransportKind};
use fixture_protocol::BoxTransport;
use fixture_sandbox::test_harness::{Element, SimSandbox};
use fixture_sandbox::{until, Observed};
use fixture_state::{helpers, FixtureState, FixtureStateChange, InstanceShape, ValueEntry};
use std::time::Duration;

pub use fixture_sandbox::test_harness::fixtures::{cool_counter, count_state, counter, mocked_counter};

/// Fixture path used by the counter scenarios
pub const COUNTER_FIXTURE: &str = "first";

/// Output polling interval for [`wait_for_output`]
pub const OUTPUT_POLL: Duration = Duration::from_millis(5);

/// The counter wrapped in a state mock seeded with 5, plus a static fixture
pub fn counter_fixtures() -> Vec<(&'static str, Element)> {
    vec![
        (COUNTER_FIXTURE, mocked_counter(counter(), 5)),
        ("static", Element::text("Hello world")),
    ]
}

/// Config with a short poll interval and a generous wait timeout
pub fn test_config() -> ConnectConfig {
    ConnectConfig::new()
        .with_poll_interval(Duration::from_millis(10))
        .with_until_timeout(Duration::from_secs(2))
}

/// A running session with both of its ends
pub struct MockConnection {
    pub sandbox: SimSandbox,
    pub surface: ControlSurface<BoxTransport>,
    pub handle: ConnectHandle,
}

impl MockConnection {
    /// Select `fixture` and wait for its first snapshot
    pub async fn select(&mut self, fixture: &str) -> Option<FixtureState> {
        self.surface.select_fixture(fixture).await.ok()?;
        self.surface.last_fixture_state().await
    }

    /// Send a state-only change for the selected fixture
    ///
    /// # Errors
    /// Transport failures
    pub async fn set_state(&mut self, fixture: &str, state: Vec<InstanceShape>) -> Result<(), ConnectError> {
        self.surface
            .set_fixture_state(fixture, FixtureStateChange::new().with_state(state))
            .await
    }

    /// Wait for the sandbox to render `expected`
    pub async fn output(&self, expected: &str) -> Observed<String> {
        wait_for_output(&self.sandbox, expected, Duration::from_secs(2)).await
    }

    /// Stop the session and wait for it to finish
    ///
    /// # Errors
    /// Whatever the session ended with
    pub async fn close(self) -> Result<(), ConnectError> {
        self.handle.shutdown().await
    }
}

/// Spawn a session over `sandbox` on the given transport
///
/// # Panics
/// If the test config fails to validate
pub fn mock_connect_with(sandbox: SimSandbox, kind: TransportKind, config: &ConnectConfig) -> MockConnection {
    let (handle, surface) = connect(sandbox.clone(), kind, config).expect("valid test config");
    MockConnection {
        sandbox,
        surface,
        handle,
    }
}

/// Spawn a session over the counter fixtures
pub fn mock_connect(kind: TransportKind) -> MockConnection {
    mock_connect_with(SimSandbox::new(counter_fixtures()), kind, &test_config())
}

/// Poll the sandbox output until it equals `expected`
///
/// On timeout the last output is returned as [`Observed::TimedOut`].
pub async fn wait_for_output(sandbox: &SimSandbox, expected: &str, timeout: Duration) -> Observed<String> {
    if until(|| sandbox.output() == expected, OUTPUT_POLL, timeout).await {
        Observed::Converged(sandbox.output())
    } else {
        Observed::TimedOut(sandbox.output())
    }
}

/// Encoded `count` of the first captured state shape
pub fn state_count(state: &FixtureState) -> Option<&str> {
    helpers::state_of(state)
        .first()
        .and_then(|shape| shape.value("count"))
        .and_then(|entry| entry.stringified.as_deref())
}

/// `count` entry in wire form
pub fn count_value(count: i64) -> ValueEntry {
    ValueEntry::serializable("count", count.to_string())
}

/// Copy of the first state shape list with its values replaced
///
/// # Panics
/// If `state` captured no state shape
pub fn with_state_values(state: &FixtureState, values: Vec<ValueEntry>) -> Vec<InstanceShape> {
    let shape = helpers::state_of(state).first().expect("a captured state shape");
    helpers::update_instance_values(&state.state, shape.decorator_id, &shape.el_path, values)
}
