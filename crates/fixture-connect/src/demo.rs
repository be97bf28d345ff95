//! Scripted demo session against the simulated counter fixture

use crate::config::ConnectConfig;
use crate::error::ConnectError;
use crate::link::{connect, TransportKind};
use fixture_protocol::Event;
use fixture_sandbox::test_harness::fixtures::{counter, mocked_counter};
use fixture_sandbox::test_harness::{Element, SimSandbox};
use fixture_state::{helpers, FixtureState, FixtureStateChange, ValueEntry};

/// Fixture the demo selects
pub const DEMO_FIXTURE: &str = "counter";

/// What the demo observed
#[derive(Debug, Clone)]
pub struct DemoReport {
    /// Every event the control surface received
    pub events: Vec<Event>,
    /// Sandbox output after each step, labelled
    pub outputs: Vec<(String, String)>,
}

fn count_of(state: &FixtureState) -> Option<&str> {
    state
        .state
        .first()
        .and_then(|shape| shape.value("count"))
        .and_then(|entry| entry.stringified.as_deref())
}

/// Select, override, delete, revert and mutate out of band
///
/// # Errors
/// Transport or configuration failures
pub async fn run_demo(kind: TransportKind, config: &ConnectConfig) -> Result<DemoReport, ConnectError> {
    let sandbox = SimSandbox::new([
        (DEMO_FIXTURE, mocked_counter(counter(), 5)),
        ("hello", Element::text("Hello world")),
    ]);
    let (handle, mut surface) = connect(sandbox.clone(), kind, config)?;
    let mut outputs = Vec::new();

    surface.select_fixture(DEMO_FIXTURE).await?;
    let Some(initial) = surface.last_fixture_state().await else {
        handle.shutdown().await?;
        return Err(ConnectError::SessionClosed);
    };
    outputs.push(("selected".to_string(), sandbox.output()));

    let Some(shape) = helpers::state_of(&initial).first().cloned() else {
        handle.shutdown().await?;
        return Ok(DemoReport {
            events: surface.events().to_vec(),
            outputs,
        });
    };

    let with_values = |values| {
        FixtureStateChange::new().with_state(helpers::update_instance_values(
            &initial.state,
            shape.decorator_id,
            &shape.el_path,
            values,
        ))
    };

    surface
        .set_fixture_state(DEMO_FIXTURE, with_values(vec![ValueEntry::serializable("count", "100")]))
        .await?;
    surface.wait_for_fixture_state(|s| count_of(s) == Some("100")).await;
    outputs.push(("override".to_string(), sandbox.output()));

    surface.set_fixture_state(DEMO_FIXTURE, with_values(Vec::new())).await?;
    surface.wait_for_fixture_state(|s| count_of(s).is_none()).await;
    outputs.push(("delete".to_string(), sandbox.output()));

    surface
        .set_fixture_state(DEMO_FIXTURE, FixtureStateChange::new().with_state(Vec::new()))
        .await?;
    surface.wait_for_fixture_state(|s| count_of(s) == Some("5")).await;
    outputs.push(("revert".to_string(), sandbox.output()));

    sandbox.set_component_state(&shape.el_path, "count", 7);
    surface.wait_for_fixture_state(|s| count_of(s) == Some("7")).await;
    outputs.push(("mutate".to_string(), sandbox.output()));

    handle.shutdown().await?;
    Ok(DemoReport {
        events: surface.events().to_vec(),
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn demo_walks_every_step() {
        let config = ConnectConfig::new().with_poll_interval(std::time::Duration::from_millis(10));
        let report = run_demo(TransportKind::Channel, &config).await.unwrap();

        let outputs: Vec<&str> = report.outputs.iter().map(|(_, out)| out.as_str()).collect();
        assert_eq!(
            outputs,
            ["5 times", "100 times", "Missing count", "5 times", "7 times"]
        );
        assert!(matches!(report.events.first(), Some(Event::FixtureList(_))));
    }
}
