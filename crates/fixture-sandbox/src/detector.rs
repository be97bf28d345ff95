//! Change detector
//!
//! Re-captures live values after every render commit and on a poll cadence,
//! so mutations a component performs on itself are eventually observed.
//! Observation is best effort: the detector only reads, and does not
//! serialize with the instances' own updates.
//!
//! Lifecycle per fixture selection:
//!
//! ```text
//! Idle → Mounted (capture) → Watching (commit/poll loop) → Idle
//! ```

use crate::environment::RenderEnvironment;
use crate::error::SandboxError;
use crate::registry::InstanceRegistry;
use fixture_state::{CapturedInstance, FixtureState, FixtureStateStore, ValueKind};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Default poll cadence
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default hard timeout for best-effort waits
pub const DEFAULT_UNTIL_TIMEOUT: Duration = Duration::from_secs(1);

/// Detector lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectorPhase {
    /// No fixture selected
    #[default]
    Idle,
    /// Fixture rendered, first capture pending
    Mounted,
    /// Capturing on commits and poll ticks
    Watching,
}

/// Phases reachable from `from`
#[must_use]
pub fn allowed_transitions(from: DetectorPhase) -> &'static [DetectorPhase] {
    use DetectorPhase::{Idle, Mounted, Watching};
    match from {
        Idle => &[Mounted],
        Mounted => &[Watching, Idle],
        Watching => &[Idle],
    }
}

/// Validate a lifecycle transition
///
/// # Errors
/// `SandboxError::IllegalTransition` if `to` is not reachable from `from`
pub fn validate_transition(from: DetectorPhase, to: DetectorPhase) -> Result<(), SandboxError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(SandboxError::IllegalTransition { from, to })
    }
}

/// Captures live values and feeds differences into the store
#[derive(Debug)]
pub struct ChangeDetector {
    phase: DetectorPhase,
    poll_interval: Duration,
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl ChangeDetector {
    #[inline]
    #[must_use]
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            phase: DetectorPhase::Idle,
            poll_interval,
        }
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> DetectorPhase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Check if the poll loop should run
    #[inline]
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.phase == DetectorPhase::Watching
    }

    /// Move to another phase
    ///
    /// # Errors
    /// `SandboxError::IllegalTransition` for transitions outside the lifecycle
    pub fn transition(&mut self, to: DetectorPhase) -> Result<(), SandboxError> {
        validate_transition(self.phase, to)?;
        tracing::trace!(from = ?self.phase, ?to, "detector transition");
        self.phase = to;
        Ok(())
    }

    /// Return to `Idle` from any phase
    #[inline]
    pub fn stop(&mut self) {
        self.phase = DetectorPhase::Idle;
    }

    /// Read the live values of every registered instance
    ///
    /// Instances whose handle has disappeared since the last commit are
    /// reported without values of that kind.
    #[must_use]
    pub fn capture<E: RenderEnvironment>(
        &self,
        env: &E,
        registry: &InstanceRegistry,
    ) -> Vec<CapturedInstance> {
        registry
            .instances()
            .map(|instance| {
                let read = |kind: ValueKind| {
                    instance.seed.get(kind)?;
                    env.with_decorator(&instance.el_path, kind, |decorator| decorator.read())
                };
                CapturedInstance {
                    decorator_id: instance.decorator_id,
                    el_path: instance.el_path.clone(),
                    component_name: instance.component_name.clone(),
                    props: read(ValueKind::Props),
                    state: read(ValueKind::State),
                }
            })
            .collect()
    }

    /// One detection pass: capture, store, and report divergence
    ///
    /// Returns the new snapshot when it differs from the last broadcast one.
    pub fn detect<E: RenderEnvironment>(
        &self,
        env: &E,
        registry: &InstanceRegistry,
        store: &mut FixtureStateStore,
    ) -> Option<FixtureState> {
        let captured = self.capture(env, registry);
        store.capture(&captured);
        store.take_if_changed()
    }
}

/// Result of a best-effort wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed<T> {
    /// The awaited condition held
    Converged(T),
    /// Timed out; carries the last observed value
    TimedOut(T),
}

impl<T> Observed<T> {
    /// The observed value, whether or not the wait converged
    #[inline]
    pub fn into_inner(self) -> T {
        match self {
            Observed::Converged(value) | Observed::TimedOut(value) => value,
        }
    }

    #[inline]
    #[must_use]
    pub fn converged(&self) -> bool {
        matches!(self, Observed::Converged(_))
    }
}

/// Poll `check` until it returns true or `timeout` elapses
///
/// Returns whether the condition was met. A timeout is not an error: callers
/// fall back to whatever they observed last.
pub async fn until<F>(mut check: F, interval: Duration, timeout: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(interval).await;
    }
}
