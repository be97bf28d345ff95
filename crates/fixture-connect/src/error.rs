//! Error types for the connection engine
//!
//! Most failures inside a session are per-operation: they are logged and
//! the session keeps serving. Only transport loss and bad configuration end
//! a session.

use fixture_protocol::{ProtocolError, TransportError};
use fixture_sandbox::{ApplyError, SandboxError};

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Configuration rejected
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be rendered
    #[error("config encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    /// Configuration file could not be read
    #[error("config i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Inbound message could not be decoded
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Transport failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Rendering environment refused an operation
    #[error("sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    /// An override could not be written
    #[error("apply error: {0}")]
    Apply(#[from] ApplyError),

    /// The session task is gone
    #[error("session closed")]
    SessionClosed,
}

impl ConnectError {
    /// Check if the error ends the session
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ConnectError::Transport(_) | ConnectError::SessionClosed | ConnectError::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixture_state::FixturePath;

    #[test]
    fn fatality() {
        assert!(ConnectError::Transport(TransportError::Closed).is_fatal());
        assert!(!ConnectError::Sandbox(SandboxError::UnknownFixture(FixturePath::new("x"))).is_fatal());
        assert!(!ConnectError::Protocol(ProtocolError::MissingType).is_fatal());
    }

    #[test]
    fn error_display() {
        let err = ConnectError::from(SandboxError::UnknownFixture(FixturePath::new("nope")));
        assert_eq!(err.to_string(), "sandbox error: unknown fixture: nope");
    }
}
