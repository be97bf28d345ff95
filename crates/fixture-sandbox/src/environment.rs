//! Rendering environment collaborator
//!
//! The sandbox's renderer owns the live component tree. The engine only sees
//! it through [`RenderEnvironment`]: a snapshot of mounted decorated
//! instances, scoped access to their decorators, and a commit hook.

use crate::decorator::Decorator;
use crate::error::SandboxError;
use fixture_state::{ElPath, FixturePath, ValueKind, ValueMap};
use tokio::sync::watch;

/// Seeds of every decorator on one instance
///
/// This is the instance's configuration identity. The wrapped component's
/// type is deliberately not part of it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstanceSeed {
    pub props: Option<ValueMap>,
    pub state: Option<ValueMap>,
}

impl InstanceSeed {
    /// Seed of one kind, if the instance has that decorator
    #[inline]
    #[must_use]
    pub fn get(&self, kind: ValueKind) -> Option<&ValueMap> {
        match kind {
            ValueKind::Props => self.props.as_ref(),
            ValueKind::State => self.state.as_ref(),
        }
    }

    /// Kinds this instance exposes
    pub fn kinds(&self) -> impl Iterator<Item = ValueKind> + '_ {
        ValueKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_some())
    }
}

/// One decorated instance in the committed tree
#[derive(Debug, Clone, PartialEq)]
pub struct MountedInstance {
    pub el_path: ElPath,
    pub component_name: String,
    pub seed: InstanceSeed,
}

/// Decorated instances of the committed tree, in tree order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeSnapshot {
    pub instances: Vec<MountedInstance>,
}

impl TreeSnapshot {
    #[inline]
    #[must_use]
    pub fn new(instances: Vec<MountedInstance>) -> Self {
        Self { instances }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// The sandbox renderer as seen by the engine
///
/// Implementations use interior mutability; every method takes `&self` and
/// must not block on the engine.
pub trait RenderEnvironment: Send + Sync + 'static {
    /// Fixtures that can be selected
    fn fixture_paths(&self) -> Vec<FixturePath>;

    /// Render a fixture from scratch, replacing whatever is mounted
    ///
    /// # Errors
    /// `SandboxError::UnknownFixture` if the path is not registered
    fn mount(&self, fixture: &FixturePath) -> Result<(), SandboxError>;

    /// Tear down the mounted fixture
    fn unmount(&self);

    /// Decorated instances of the last commit
    fn tree(&self) -> TreeSnapshot;

    /// Run `f` against the live decorator of one instance
    ///
    /// Returns `None` if nothing of that kind is mounted at `el_path`.
    fn with_decorator<R>(
        &self,
        el_path: &ElPath,
        kind: ValueKind,
        f: impl FnOnce(&mut dyn Decorator) -> R,
    ) -> Option<R>;

    /// Commit hook
    ///
    /// The counter advances on every full render commit. Value-only updates
    /// made by components themselves do not advance it.
    fn commits(&self) -> watch::Receiver<u64>;
}
