//! Connection session
//!
//! One actor task per renderer connection. It owns the registry, store and
//! detector, and serializes every engine step in a single `select!` loop:
//!
//! ```text
//!              ┌──────────────┐
//!  transport ─▶│              │─▶ fixtureList / fixtureState events
//!  commits ───▶│ FixtureConnect│
//!  poll tick ─▶│              │─▶ OverrideApplier → live instances
//!  shutdown ──▶└──────────────┘
//! ```
//!
//! The rendering environment is only touched through synchronous calls, so
//! no lock is ever held across an await point.

use crate::config::ConnectConfig;
use crate::dispatch::Dispatcher;
use crate::error::ConnectError;
use fixture_protocol::{
    ChannelTransport, Command, Event, SelectFixturePayload, SetFixtureStatePayload, Transport,
};
use fixture_sandbox::{
    ChangeDetector, DetectorPhase, InstanceRegistry, OverrideApplier, RenderEnvironment,
};
use fixture_state::{ChangeStep, FixturePath, FixtureState, FixtureStateStore, RendererId};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a spawned session
#[derive(Debug)]
pub struct ConnectHandle {
    renderer_id: RendererId,
    shutdown: watch::Sender<bool>,
    join: JoinHandle<Result<(), ConnectError>>,
}

impl ConnectHandle {
    #[inline]
    #[must_use]
    pub fn renderer_id(&self) -> &RendererId {
        &self.renderer_id
    }

    /// Check if the session task has ended
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Stop the session, unmounting any selected fixture
    ///
    /// # Errors
    /// The error that ended the session, or `ConnectError::SessionClosed`
    /// if the task panicked
    pub async fn shutdown(self) -> Result<(), ConnectError> {
        // A send error means the task already stopped; the join reports why.
        let _ = self.shutdown.send(true);
        self.join.await.map_err(|_| ConnectError::SessionClosed)?
    }
}

/// The fixture state synchronization engine for one connection
pub struct FixtureConnect<E, T> {
    env: E,
    transport: T,
    dispatcher: Dispatcher,
    registry: InstanceRegistry,
    store: FixtureStateStore,
    detector: ChangeDetector,
    applier: OverrideApplier,
    commits: watch::Receiver<u64>,
    selected: Option<FixturePath>,
}

impl<E: RenderEnvironment> FixtureConnect<E, ChannelTransport> {
    /// Engine plus the control surface's end of an in-process channel
    #[must_use]
    pub fn over_channel(env: E, config: &ConnectConfig) -> (Self, ChannelTransport) {
        let (surface, engine) =
            ChannelTransport::pair_with(config.command_buffer, config.event_buffer);
        (Self::new(env, engine, config), surface)
    }
}

impl<E, T> FixtureConnect<E, T>
where
    E: RenderEnvironment,
    T: Transport,
{
    pub fn new(env: E, transport: T, config: &ConnectConfig) -> Self {
        let commits = env.commits();
        Self {
            env,
            transport,
            dispatcher: Dispatcher::new(config.renderer_id_or_generate()),
            registry: InstanceRegistry::new(),
            store: FixtureStateStore::new(),
            detector: ChangeDetector::new(config.poll_interval().max(MIN_POLL_INTERVAL)),
            applier: OverrideApplier::new(),
            commits,
            selected: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn renderer_id(&self) -> &RendererId {
        self.dispatcher.renderer_id()
    }

    /// Run the session on its own task
    pub fn spawn(self) -> ConnectHandle {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let renderer_id = self.renderer_id().clone();
        let join = tokio::spawn(self.run(shutdown_rx));
        ConnectHandle {
            renderer_id,
            shutdown,
            join,
        }
    }

    /// Serve the connection until shutdown or transport loss
    ///
    /// # Errors
    /// Only fatal errors end the loop; see [`ConnectError::is_fatal`]
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), ConnectError> {
        info!(renderer_id = %self.renderer_id(), "renderer connected");
        self.announce().await?;

        let mut poll = interval(self.detector.poll_interval());
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut commits_open = true;

        let outcome = loop {
            // Commits first: a re-rendered tree is reconciled before anything captures it
            let step = tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break Ok(());
                    }
                    Ok(())
                }
                changed = self.commits.changed(), if commits_open => match changed {
                    Ok(()) => {
                        self.mark_commits_seen();
                        self.on_commit().await
                    }
                    Err(_) => {
                        commits_open = false;
                        Ok(())
                    }
                },
                message = self.transport.recv() => match message {
                    Some(message) => self.handle_message(message, &mut poll).await,
                    None => {
                        info!(renderer_id = %self.renderer_id(), "transport closed");
                        break Ok(());
                    }
                },
                _ = poll.tick(), if self.detector.is_watching() => self.on_poll().await,
            };

            if let Err(err) = step {
                if err.is_fatal() {
                    break Err(err);
                }
                warn!(renderer_id = %self.renderer_id(), error = %err, "operation failed");
            }
        };

        self.close_selection();
        info!(renderer_id = %self.renderer_id(), "renderer disconnected");
        outcome
    }

    async fn handle_message(
        &mut self,
        message: Value,
        poll: &mut Interval,
    ) -> Result<(), ConnectError> {
        let Some(command) = self.dispatcher.route(message) else {
            return Ok(());
        };
        debug!(renderer_id = %self.renderer_id(), command = command.kind(), "command received");

        match command {
            Command::SelectFixture(payload) => self.select_fixture(payload, poll).await,
            Command::UnselectFixture(_) => {
                self.close_selection();
                Ok(())
            }
            Command::SetFixtureState(payload) => self.set_fixture_state(payload).await,
            Command::RequestFixtureList => self.announce().await,
        }
    }

    async fn announce(&mut self) -> Result<(), ConnectError> {
        let event = self.dispatcher.fixture_list(self.env.fixture_paths());
        self.send(&event).await
    }

    async fn select_fixture(
        &mut self,
        payload: SelectFixturePayload,
        poll: &mut Interval,
    ) -> Result<(), ConnectError> {
        self.close_selection();

        let fixture_path = payload.fixture_path;
        self.env.mount(&fixture_path)?;
        self.mark_commits_seen();
        info!(renderer_id = %self.renderer_id(), %fixture_path, "fixture selected");

        self.selected = Some(fixture_path);
        self.detector.transition(DetectorPhase::Mounted)?;
        self.registry.reconcile(&self.env.tree());
        self.store.next_render_key();
        self.capture_and_emit().await?;

        self.detector.transition(DetectorPhase::Watching)?;
        poll.reset();
        Ok(())
    }

    async fn set_fixture_state(&mut self, payload: SetFixtureStatePayload) -> Result<(), ConnectError> {
        if !self.detector.is_watching() || self.selected.as_ref() != Some(&payload.fixture_path) {
            debug!(
                renderer_id = %self.renderer_id(),
                fixture_path = %payload.fixture_path,
                "ignoring change for a fixture that is not selected"
            );
            return Ok(());
        }

        let mut reverted = false;
        for step in self.store.apply_change(payload.fixture_state_change) {
            match step {
                ChangeStep::Revert(kind) => {
                    self.applier.revert(&self.env, &self.registry, kind);
                    reverted = true;
                }
                ChangeStep::Override(kind, shapes) => {
                    for shape in &shapes {
                        if let Err(err) = self.applier.apply(&self.env, &self.registry, kind, shape) {
                            warn!(renderer_id = %self.renderer_id(), error = %err, "override rejected");
                        }
                    }
                }
            }
        }

        if reverted {
            self.store.next_render_key();
        }
        self.capture_and_emit().await
    }

    /// Full render commit: re-identify instances and keep their overrides
    async fn on_commit(&mut self) -> Result<(), ConnectError> {
        if !self.detector.is_watching() {
            return Ok(());
        }

        let reconciliation = self.registry.reconcile(&self.env.tree());
        self.store.forget(&reconciliation.removed);
        // A new seed under a kept live decorator starts from that seed
        for &decorator_id in &reconciliation.reseeded {
            if let Err(err) = self.applier.reset_instance(&self.env, &self.registry, decorator_id) {
                warn!(renderer_id = %self.renderer_id(), error = %err, "reseeded instance not reset");
            }
        }
        for instance in &reconciliation.retained {
            for (kind, shape) in self.store.overrides_for(instance.decorator_id) {
                if let Err(err) = self.applier.apply(&self.env, &self.registry, kind, &shape) {
                    warn!(renderer_id = %self.renderer_id(), error = %err, "override lost on commit");
                }
            }
        }
        debug!(
            renderer_id = %self.renderer_id(),
            added = reconciliation.added.len(),
            retained = reconciliation.retained.len(),
            removed = reconciliation.removed.len(),
            reseeded = reconciliation.reseeded.len(),
            "render committed"
        );

        self.store.next_render_key();
        self.capture_and_emit().await
    }

    /// Best-effort capture between commits
    async fn on_poll(&mut self) -> Result<(), ConnectError> {
        if self.commits.has_changed().unwrap_or(false) {
            return Ok(());
        }
        self.capture_and_emit().await
    }

    async fn capture_and_emit(&mut self) -> Result<(), ConnectError> {
        let Some(fixture_path) = self.selected.clone() else {
            return Ok(());
        };
        match self.detector.detect(&self.env, &self.registry, &mut self.store) {
            Some(state) => self.emit_state(fixture_path, state).await,
            None => Ok(()),
        }
    }

    async fn emit_state(
        &mut self,
        fixture_path: FixturePath,
        state: FixtureState,
    ) -> Result<(), ConnectError> {
        debug!(
            renderer_id = %self.renderer_id(),
            %fixture_path,
            props = state.props.len(),
            state = state.state.len(),
            "emitting fixture state"
        );
        let event = self.dispatcher.fixture_state(fixture_path, state);
        self.send(&event).await
    }

    async fn send(&mut self, event: &Event) -> Result<(), ConnectError> {
        let message = event.to_value()?;
        self.transport.send(message).await?;
        Ok(())
    }

    /// Unmount and forget the current selection, if any
    fn close_selection(&mut self) {
        let Some(fixture_path) = self.selected.take() else {
            return;
        };
        self.env.unmount();
        self.mark_commits_seen();
        self.registry.clear();
        self.store.reset();
        self.detector.stop();
        info!(renderer_id = %self.renderer_id(), %fixture_path, "fixture unselected");
    }

    /// Skip commit notifications caused by the engine's own mount/unmount
    fn mark_commits_seen(&mut self) {
        let seen = *self.commits.borrow_and_update();
        tracing::trace!(seen, "commits acknowledged");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixture_sandbox::test_harness::fixtures::{counter, mocked_counter};
    use fixture_protocol::TransportError;
    use fixture_sandbox::test_harness::{Element, SimSandbox};
    use serde_json::json;
    use tokio::time::timeout;

    fn sandbox() -> SimSandbox {
        SimSandbox::new([
            ("first", mocked_counter(counter(), 5)),
            ("second", Element::text("hello")),
        ])
    }

    async fn next_event(surface: &mut ChannelTransport) -> Event {
        let message = timeout(Duration::from_secs(1), surface.recv())
            .await
            .unwrap()
            .unwrap();
        Event::parse(message).unwrap()
    }

    #[tokio::test]
    async fn announces_fixtures_on_start() {
        let config = ConnectConfig::new().with_renderer_id(RendererId::new("r1"));
        let (engine, mut surface) = FixtureConnect::over_channel(sandbox(), &config);
        let handle = engine.spawn();

        let event = next_event(&mut surface).await;
        assert_eq!(
            event.to_value().unwrap(),
            json!({
                "type": "fixtureList",
                "payload": { "rendererId": "r1", "fixtures": ["first", "second"] }
            })
        );

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn select_emits_first_capture() {
        let sandbox = sandbox();
        let config = ConnectConfig::new().with_renderer_id(RendererId::new("r1"));
        let (engine, mut surface) = FixtureConnect::over_channel(sandbox.clone(), &config);
        let handle = engine.spawn();
        next_event(&mut surface).await;

        surface
            .send(json!({
                "type": "selectFixture",
                "payload": { "rendererId": "r1", "fixturePath": "first" }
            }))
            .await
            .unwrap();

        let event = next_event(&mut surface).await;
        let payload = event.as_fixture_state().unwrap();
        assert_eq!(payload.fixture_path, FixturePath::new("first"));
        assert_eq!(payload.fixture_state.props.len(), 1);
        assert_eq!(
            payload.fixture_state.state[0].values[0].stringified.as_deref(),
            Some("5")
        );
        assert_eq!(sandbox.output(), "5 times");

        handle.shutdown().await.unwrap();
        assert_eq!(sandbox.mounted(), None);
    }

    #[tokio::test]
    async fn transport_loss_ends_session_cleanly() {
        let config = ConnectConfig::new();
        let (engine, mut surface) = FixtureConnect::over_channel(sandbox(), &config);
        let handle = engine.spawn();
        next_event(&mut surface).await;
        drop(surface);

        let result = timeout(Duration::from_secs(1), handle.join).await.unwrap().unwrap();
        assert!(matches!(result, Ok(())), "got {result:?}");
    }

    #[tokio::test]
    async fn announce_to_closed_transport_is_fatal() {
        let config = ConnectConfig::new();
        let (engine, surface) = FixtureConnect::over_channel(sandbox(), &config);
        drop(surface);

        let result = timeout(Duration::from_secs(1), engine.spawn().join).await.unwrap().unwrap();
        assert!(
            matches!(result, Err(ConnectError::Transport(TransportError::Closed))),
            "got {result:?}"
        );
    }
}
