//! Protocol dispatcher
//!
//! Decodes inbound messages for one renderer and builds its outbound
//! events. The boundary is lenient: anything malformed, unknown, or
//! addressed to another renderer is dropped without touching state.

use fixture_protocol::{
    Command, Event, FixtureListPayload, FixtureStatePayload, ProtocolError,
};
use fixture_state::{FixturePath, FixtureState, RendererId};
use serde_json::Value;

/// Per-renderer message router
#[derive(Debug, Clone)]
pub struct Dispatcher {
    renderer_id: RendererId,
}

impl Dispatcher {
    #[inline]
    #[must_use]
    pub fn new(renderer_id: RendererId) -> Self {
        Self { renderer_id }
    }

    #[inline]
    #[must_use]
    pub fn renderer_id(&self) -> &RendererId {
        &self.renderer_id
    }

    /// Decode a message and keep it only if it is meant for this renderer
    #[must_use]
    pub fn route(&self, message: Value) -> Option<Command> {
        let command = match Command::parse(message) {
            Ok(command) => command,
            Err(err) => {
                log_dropped(&err);
                return None;
            }
        };

        match command.renderer_id() {
            Some(target) if target != &self.renderer_id => {
                tracing::trace!(
                    renderer_id = %self.renderer_id,
                    target = %target,
                    command = command.kind(),
                    "ignoring command for another renderer"
                );
                None
            }
            _ => Some(command),
        }
    }

    /// Announcement of the fixtures this renderer can show
    #[must_use]
    pub fn fixture_list(&self, fixtures: Vec<FixturePath>) -> Event {
        Event::FixtureList(FixtureListPayload {
            renderer_id: self.renderer_id.clone(),
            fixtures,
        })
    }

    /// Snapshot of the selected fixture
    #[must_use]
    pub fn fixture_state(&self, fixture_path: FixturePath, fixture_state: FixtureState) -> Event {
        Event::FixtureState(FixtureStatePayload {
            renderer_id: self.renderer_id.clone(),
            fixture_path,
            fixture_state,
        })
    }
}

fn log_dropped(err: &ProtocolError) {
    tracing::debug!(error = %err, "dropping message");
}
