//! Fixture Sandbox
//!
//! The sandbox half of fixture state synchronization: tracks decorated
//! instances across renders, writes overrides onto them, and watches them
//! for changes.
//!
//! # Architecture
//!
//! ```text
//! RenderEnvironment ──tree()──▶ InstanceRegistry ──ids──▶ ChangeDetector ──▶ FixtureStateStore
//!        ▲                                                                        │
//!        └──────────── with_decorator() ◀── OverrideApplier ◀──── ChangeStep ─────┘
//! ```
//!
//! Only the [`RenderEnvironment`] and [`Decorator`] traits touch the live
//! tree; everything else works on snapshots.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod applier;
mod decorator;
pub mod detector;
mod environment;
mod error;
mod registry;

// Test harness
pub mod test_harness;

// Re-exports
pub use applier::{ApplyReport, OverrideApplier};
pub use decorator::Decorator;
pub use detector::{until, ChangeDetector, DetectorPhase, Observed};
pub use environment::{InstanceSeed, MountedInstance, RenderEnvironment, TreeSnapshot};
pub use error::{ApplyError, SandboxError};
pub use registry::{InstanceRegistry, Reconciliation, RegisteredInstance};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for sandbox integrations
    pub use crate::{
        ChangeDetector, Decorator, DetectorPhase, InstanceRegistry, InstanceSeed,
        MountedInstance, OverrideApplier, RenderEnvironment, TreeSnapshot,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
