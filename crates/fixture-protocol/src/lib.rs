//! Fixture Protocol
//!
//! Wire envelopes and transports between a component sandbox (renderer)
//! and its control surface.
//!
//! # Messages
//!
//! | Direction | Type | Payload |
//! |---|---|---|
//! | → sandbox | `selectFixture` | `rendererId`, `fixturePath` |
//! | → sandbox | `unselectFixture` | `rendererId` |
//! | → sandbox | `setFixtureState` | `rendererId`, `fixturePath`, `fixtureStateChange` |
//! | → sandbox | `requestFixtureList` | none |
//! | ← sandbox | `fixtureList` | `rendererId`, `fixtures` |
//! | ← sandbox | `fixtureState` | `rendererId`, `fixturePath`, `fixtureState` |

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod messages;
pub mod transport;

// Re-exports
pub use error::{ProtocolError, TransportError};
pub use messages::{
    Command, Event, FixtureListPayload, FixtureStatePayload, SelectFixturePayload,
    SetFixtureStatePayload, UnselectFixturePayload, COMMAND_TYPES, EVENT_TYPES,
};
pub use transport::{BoxTransport, ChannelTransport, DuplexTransport, StreamTransport, Transport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for protocol endpoints
    pub use crate::{ChannelTransport, Command, Event, StreamTransport, Transport};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use fixture_state::{FixturePath, RendererId};

    #[tokio::test]
    async fn command_crosses_both_transports() {
        let command = Command::SelectFixture(SelectFixturePayload {
            renderer_id: RendererId::new("r1"),
            fixture_path: FixturePath::new("counter"),
        });

        let (mut a, mut b) = ChannelTransport::pair(1);
        a.send(command.to_value().unwrap()).await.unwrap();
        assert_eq!(Command::parse(b.recv().await.unwrap()).unwrap(), command);

        let (mut a, mut b) = DuplexTransport::duplex(4096);
        a.send(command.to_value().unwrap()).await.unwrap();
        assert_eq!(Command::parse(b.recv().await.unwrap()).unwrap(), command);
    }

    #[tokio::test]
    async fn boxed_transport_forwards() {
        let (a, b) = ChannelTransport::pair(1);
        let mut a: BoxTransport = Box::new(a);
        let mut b: BoxTransport = Box::new(b);

        a.send(serde_json::json!({ "type": "requestFixtureList" })).await.unwrap();
        assert_eq!(
            Command::parse(b.recv().await.unwrap()).unwrap(),
            Command::RequestFixtureList
        );
    }
}
