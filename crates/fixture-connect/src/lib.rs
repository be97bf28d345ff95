//! Fixture Connect
//!
//! Live props/state synchronization between a component sandbox and its
//! control surface. One [`FixtureConnect`] session runs per renderer
//! connection.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use fixture_connect::prelude::*;
//!
//! let config = ConnectConfig::default();
//! let (handle, mut surface) = connect(sandbox.clone(), TransportKind::Channel, &config)?;
//!
//! surface.select_fixture("counter").await?;
//! let state = surface.last_fixture_state().await;
//!
//! handle.shutdown().await?;
//! ```
//!
//! # Session lifecycle
//!
//! ```text
//! connect ─▶ fixtureList
//! selectFixture ─▶ mount ─▶ capture ─▶ fixtureState ─▶ watching
//!   watching: setFixtureState │ render commit │ poll tick ─▶ fixtureState (on change)
//! unselectFixture / disconnect ─▶ unmount ─▶ idle
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod demo;
pub mod dispatch;
pub mod error;
pub mod link;
pub mod session;
pub mod surface;

// Re-exports
pub use config::ConnectConfig;
pub use dispatch::Dispatcher;
pub use error::ConnectError;
pub use link::{connect, transport_pair, TransportKind};
pub use session::{ConnectHandle, FixtureConnect};
pub use surface::ControlSurface;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hosting or driving a session
    pub use crate::{
        connect, ConnectConfig, ConnectError, ConnectHandle, ControlSurface, FixtureConnect,
        TransportKind,
    };
    pub use fixture_sandbox::Observed;
    pub use fixture_state::{FixturePath, FixtureState, FixtureStateChange, RendererId};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
