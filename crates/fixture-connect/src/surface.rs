//! Control surface client
//!
//! The other end of a session: sends commands for one renderer and keeps
//! every event it receives. Waits are best effort; they time out after the
//! configured hard timeout and hand back the last value observed.

use crate::error::ConnectError;
use fixture_protocol::{
    Command, Event, SelectFixturePayload, SetFixtureStatePayload, Transport,
    UnselectFixturePayload,
};
use fixture_sandbox::Observed;
use fixture_state::{FixturePath, FixtureState, FixtureStateChange, RendererId};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Client for one renderer
#[derive(Debug)]
pub struct ControlSurface<T> {
    transport: T,
    renderer_id: RendererId,
    until_timeout: Duration,
    events: Vec<Event>,
}

impl<T: Transport> ControlSurface<T> {
    pub fn new(transport: T, renderer_id: RendererId, until_timeout: Duration) -> Self {
        Self {
            transport,
            renderer_id,
            until_timeout,
            events: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn renderer_id(&self) -> &RendererId {
        &self.renderer_id
    }

    /// Every event received so far, in arrival order
    #[inline]
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// # Errors
    /// `ConnectError::Transport` if the session is gone
    pub async fn select_fixture(&mut self, fixture_path: impl Into<FixturePath>) -> Result<(), ConnectError> {
        let command = Command::SelectFixture(SelectFixturePayload {
            renderer_id: self.renderer_id.clone(),
            fixture_path: fixture_path.into(),
        });
        self.send(&command).await
    }

    /// # Errors
    /// `ConnectError::Transport` if the session is gone
    pub async fn unselect_fixture(&mut self) -> Result<(), ConnectError> {
        let command = Command::UnselectFixture(UnselectFixturePayload {
            renderer_id: self.renderer_id.clone(),
        });
        self.send(&command).await
    }

    /// # Errors
    /// `ConnectError::Transport` if the session is gone
    pub async fn set_fixture_state(
        &mut self,
        fixture_path: impl Into<FixturePath>,
        fixture_state_change: FixtureStateChange,
    ) -> Result<(), ConnectError> {
        let command = Command::SetFixtureState(SetFixtureStatePayload {
            renderer_id: self.renderer_id.clone(),
            fixture_path: fixture_path.into(),
            fixture_state_change,
        });
        self.send(&command).await
    }

    /// # Errors
    /// `ConnectError::Transport` if the session is gone
    pub async fn request_fixture_list(&mut self) -> Result<(), ConnectError> {
        self.send(&Command::RequestFixtureList).await
    }

    /// Send an arbitrary message, well-formed or not
    ///
    /// # Errors
    /// `ConnectError::Transport` if the session is gone
    pub async fn send_raw(&mut self, message: Value) -> Result<(), ConnectError> {
        self.transport.send(message).await?;
        Ok(())
    }

    /// Wait for the first new event matching `predicate`
    ///
    /// Returns `None` if none arrives before the hard timeout.
    pub async fn until_message(&mut self, mut predicate: impl FnMut(&Event) -> bool) -> Option<Event> {
        let deadline = Instant::now() + self.until_timeout;
        while let Some(event) = self.next_event_before(deadline).await {
            if predicate(&event) {
                return Some(event);
            }
        }
        None
    }

    /// Latest fixture state received
    ///
    /// Takes everything already delivered, then waits for a first state if
    /// none has arrived yet.
    pub async fn last_fixture_state(&mut self) -> Option<FixtureState> {
        self.drain().await;
        if let Some(state) = self.latest_state() {
            return Some(state.clone());
        }
        self.until_message(|event| event.as_fixture_state().is_some())
            .await
            .and_then(|event| event.as_fixture_state().map(|p| p.fixture_state.clone()))
    }

    /// Wait until the latest fixture state satisfies `predicate`
    ///
    /// On timeout the last state observed is returned as
    /// [`Observed::TimedOut`].
    pub async fn wait_for_fixture_state(
        &mut self,
        mut predicate: impl FnMut(&FixtureState) -> bool,
    ) -> Observed<Option<FixtureState>> {
        let deadline = Instant::now() + self.until_timeout;
        self.drain().await;
        loop {
            if let Some(state) = self.latest_state() {
                if predicate(state) {
                    return Observed::Converged(Some(state.clone()));
                }
            }
            if self.next_event_before(deadline).await.is_none() {
                return Observed::TimedOut(self.latest_state().cloned());
            }
        }
    }

    fn latest_state(&self) -> Option<&FixtureState> {
        self.events
            .iter()
            .rev()
            .find_map(Event::as_fixture_state)
            .map(|payload| &payload.fixture_state)
    }

    /// Take every event already delivered without waiting
    async fn drain(&mut self) {
        while self.next_event_before(Instant::now()).await.is_some() {}
    }

    /// Next decodable event, or `None` at the deadline or on close
    async fn next_event_before(&mut self, deadline: Instant) -> Option<Event> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let message = timeout(remaining, self.transport.recv()).await.ok()??;
            match Event::parse(message) {
                Ok(event) => {
                    self.events.push(event.clone());
                    return Some(event);
                }
                Err(err) => tracing::debug!(error = %err, "dropping message"),
            }
        }
    }

    async fn send(&mut self, command: &Command) -> Result<(), ConnectError> {
        let message = command.to_value()?;
        self.transport.send(message).await?;
        Ok(())
    }
}
