//! Seed changes under a renderer that keeps its live instances
//!
//! Unlike the simulated sandbox, this environment does not remount when a
//! decorator's seed changes: the live values survive the commit.

use fixture_connect::{connect, ConnectConfig, TransportKind};
use fixture_sandbox::{
    Decorator, InstanceSeed, MountedInstance, RenderEnvironment, SandboxError, TreeSnapshot,
};
use fixture_state::{
    ElPath, FixturePath, FixtureStateChange, LiveValue, ValueEntry, ValueKind, ValueMap,
};
use fixture_test_utils::{count_value, state_count, test_config};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio::sync::watch;

const FIXTURE: &str = "kept";

#[derive(Debug, Default)]
struct KeptState {
    mounted: bool,
    seed: ValueMap,
    live: ValueMap,
}

impl Decorator for KeptState {
    fn read(&self) -> ValueMap {
        self.live.clone()
    }

    fn write(&mut self, key: &str, value: LiveValue) {
        self.live.insert(key.to_string(), value);
    }

    fn delete(&mut self, key: &str) {
        self.live.shift_remove(key);
    }

    fn initial_seed(&self) -> ValueMap {
        self.seed.clone()
    }
}

/// One state-mocked counter at `children` that is never remounted
#[derive(Clone)]
struct KeepLiveEnv {
    state: Arc<Mutex<KeptState>>,
    commits: Arc<watch::Sender<u64>>,
}

impl KeepLiveEnv {
    fn new(count: i64) -> Self {
        let (commits, _) = watch::channel(0);
        let env = Self {
            state: Arc::default(),
            commits: Arc::new(commits),
        };
        env.state.lock().seed = count_seed(count);
        env
    }

    /// Swap the seed and commit, leaving live values in place
    fn reseed(&self, count: i64) {
        self.state.lock().seed = count_seed(count);
        self.commits.send_modify(|commit| *commit += 1);
    }

    fn live_count(&self) -> Option<LiveValue> {
        self.state.lock().live.get("count").cloned()
    }
}

fn count_seed(count: i64) -> ValueMap {
    let mut seed = ValueMap::new();
    seed.insert("count".to_string(), LiveValue::from(count));
    seed
}

fn children() -> ElPath {
    ElPath::root().child("children")
}

impl RenderEnvironment for KeepLiveEnv {
    fn fixture_paths(&self) -> Vec<FixturePath> {
        vec![FixturePath::new(FIXTURE)]
    }

    fn mount(&self, fixture: &FixturePath) -> Result<(), SandboxError> {
        if fixture.as_str() != FIXTURE {
            return Err(SandboxError::UnknownFixture(fixture.clone()));
        }
        let mut state = self.state.lock();
        state.mounted = true;
        state.live = state.seed.clone();
        drop(state);
        self.commits.send_modify(|commit| *commit += 1);
        Ok(())
    }

    fn unmount(&self) {
        self.state.lock().mounted = false;
        self.commits.send_modify(|commit| *commit += 1);
    }

    fn tree(&self) -> TreeSnapshot {
        let state = self.state.lock();
        if !state.mounted {
            return TreeSnapshot::default();
        }
        TreeSnapshot::new(vec![MountedInstance {
            el_path: children(),
            component_name: "Counter".to_string(),
            seed: InstanceSeed {
                props: None,
                state: Some(state.seed.clone()),
            },
        }])
    }

    fn with_decorator<R>(
        &self,
        el_path: &ElPath,
        kind: ValueKind,
        f: impl FnOnce(&mut dyn Decorator) -> R,
    ) -> Option<R> {
        let mut state = self.state.lock();
        if !state.mounted || kind != ValueKind::State || *el_path != children() {
            return None;
        }
        Some(f(&mut *state))
    }

    fn commits(&self) -> watch::Receiver<u64> {
        self.commits.subscribe()
    }
}

#[tokio::test]
async fn seed_change_resets_kept_instance() {
    let env = KeepLiveEnv::new(5);
    let (handle, mut surface) = connect(env.clone(), TransportKind::Channel, &test_config()).unwrap();

    surface.select_fixture(FIXTURE).await.unwrap();
    let state = surface.last_fixture_state().await.expect("first snapshot");
    assert_eq!(state_count(&state), Some("5"));
    let first = state.state[0].clone();

    let mut shape = first.clone();
    shape.values = vec![count_value(6)];
    surface
        .set_fixture_state(FIXTURE, FixtureStateChange::new().with_state(vec![shape]))
        .await
        .unwrap();
    assert!(surface
        .wait_for_fixture_state(|s| state_count(s) == Some("6"))
        .await
        .converged());

    env.reseed(50);

    let emitted = surface
        .wait_for_fixture_state(|s| {
            s.state
                .first()
                .is_some_and(|shape| shape.decorator_id != first.decorator_id)
        })
        .await;
    assert!(emitted.converged());
    let emitted = emitted.into_inner().unwrap();
    assert_eq!(
        emitted.state[0].values,
        vec![ValueEntry::serializable("count", "50")]
    );
    assert_eq!(env.live_count(), Some(LiveValue::from(50)));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn unchanged_seed_keeps_override_on_commit() {
    let env = KeepLiveEnv::new(5);
    let config: ConnectConfig = test_config();
    let (handle, mut surface) = connect(env.clone(), TransportKind::Channel, &config).unwrap();

    surface.select_fixture(FIXTURE).await.unwrap();
    let state = surface.last_fixture_state().await.expect("first snapshot");
    let mut shape = state.state[0].clone();
    shape.values = vec![count_value(6)];
    surface
        .set_fixture_state(FIXTURE, FixtureStateChange::new().with_state(vec![shape]))
        .await
        .unwrap();
    assert!(surface
        .wait_for_fixture_state(|s| state_count(s) == Some("6"))
        .await
        .converged());

    // Same seed: a plain re-render keeps identity and override
    env.reseed(5);
    let render_key = state.state[0].render_key;
    let emitted = surface
        .wait_for_fixture_state(|s| s.state.first().is_some_and(|shape| shape.render_key != render_key))
        .await;
    assert!(emitted.converged());
    let emitted = emitted.into_inner().unwrap();
    assert_eq!(emitted.state[0].decorator_id, state.state[0].decorator_id);
    assert_eq!(state_count(&emitted), Some("6"));

    handle.shutdown().await.unwrap();
}
