//! Error types for the sandbox side
//!
//! Covers:
//! - Rendering environment failures (unknown fixture)
//! - Detector lifecycle violations
//! - Override application against missing instances

use crate::detector::DetectorPhase;
use fixture_state::{DecoratorId, ElPath, FixturePath, ValueKind};

/// Errors from the rendering environment and detector lifecycle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SandboxError {
    /// No fixture registered under this path
    #[error("unknown fixture: {0}")]
    UnknownFixture(FixturePath),

    /// Detector lifecycle violated
    #[error("illegal detector transition: {from:?} -> {to:?}")]
    IllegalTransition { from: DetectorPhase, to: DetectorPhase },
}

/// Errors writing overrides onto live instances
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// The registry knows no slot with this identity
    #[error("no decorated instance {decorator_id} at '{el_path}'")]
    MissingInstance {
        decorator_id: DecoratorId,
        el_path: ElPath,
    },

    /// The registry has no slot with this id at any path
    #[error("decorator {decorator_id} is not registered")]
    UnknownInstance { decorator_id: DecoratorId },

    /// The slot exists but its live handle is gone
    #[error("{kind} handle unavailable at '{el_path}'")]
    HandleUnavailable { kind: ValueKind, el_path: ElPath },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_error_display() {
        let err = ApplyError::MissingInstance {
            decorator_id: DecoratorId(2),
            el_path: ElPath::root().child("children"),
        };
        assert_eq!(err.to_string(), "no decorated instance 2 at 'children'");
    }

    #[test]
    fn sandbox_error_display() {
        let err = SandboxError::UnknownFixture(FixturePath::new("missing"));
        assert_eq!(err.to_string(), "unknown fixture: missing");
    }
}
