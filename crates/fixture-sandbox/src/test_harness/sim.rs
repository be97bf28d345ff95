//! In-memory renderer
//!
//! Element paths follow a fixed scheme: the fixture's root element sits at
//! the root path, a state mock's child at `children`, and fragment children
//! at their index.

use crate::decorator::Decorator;
use crate::environment::{InstanceSeed, MountedInstance, RenderEnvironment, TreeSnapshot};
use crate::error::SandboxError;
use fixture_state::{ElPath, FixturePath, LiveValue, ValueKind, ValueMap};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

type RenderFn = dyn Fn(&ValueMap, &ValueMap) -> String + Send + Sync;

/// A component: a name and a render function over `(props, state)`
#[derive(Clone)]
pub struct ComponentType {
    name: String,
    render: Arc<RenderFn>,
    initial_state: ValueMap,
}

impl ComponentType {
    pub fn new(
        name: impl Into<String>,
        render: impl Fn(&ValueMap, &ValueMap) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            render: Arc::new(render),
            initial_state: ValueMap::new(),
        }
    }

    /// State the component starts with before any mock seeds it
    #[must_use]
    pub fn with_initial_state(mut self, state: ValueMap) -> Self {
        self.initial_state = state;
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("name", &self.name)
            .field("initial_state", &self.initial_state)
            .finish_non_exhaustive()
    }
}

/// Fixture element tree
#[derive(Debug, Clone)]
pub enum Element {
    /// Plain text, no instance
    Text(String),
    /// A component with its props
    Component { ty: ComponentType, props: ValueMap },
    /// State decorator seeding its child component
    StateMock { state: ValueMap, child: Box<Element> },
    /// Siblings
    Fragment(Vec<Element>),
}

impl Element {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    #[must_use]
    pub fn component(ty: ComponentType, props: ValueMap) -> Self {
        Self::Component { ty, props }
    }

    #[must_use]
    pub fn state_mock(state: ValueMap, child: Element) -> Self {
        Self::StateMock {
            state,
            child: Box::new(child),
        }
    }

    #[must_use]
    pub fn fragment(children: Vec<Element>) -> Self {
        Self::Fragment(children)
    }
}

/// One side of an instance: configured seed and live values
#[derive(Debug, Clone)]
struct Slot {
    seed: ValueMap,
    initial: ValueMap,
    live: ValueMap,
}

impl Slot {
    fn seeded(seed: ValueMap, initial: ValueMap) -> Self {
        Self {
            seed,
            live: initial.clone(),
            initial,
        }
    }
}

impl Decorator for Slot {
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
        self.initial.clone()
    }
}

#[derive(Debug)]
struct SimInstance {
    component: ComponentType,
    props: Slot,
    state: Option<Slot>,
}

impl SimInstance {
    fn mount(decorated: &Decorated<'_>) -> Self {
        let state = decorated.state.map(|seed| {
            let mut initial = decorated.ty.initial_state.clone();
            initial.extend(seed.iter().map(|(k, v)| (k.clone(), v.clone())));
            Slot::seeded(seed.clone(), initial)
        });
        Self {
            component: decorated.ty.clone(),
            props: Slot::seeded(decorated.props.clone(), decorated.props.clone()),
            state,
        }
    }

    fn matches(&self, decorated: &Decorated<'_>) -> bool {
        self.component.name == decorated.ty.name
            && self.props.seed == *decorated.props
            && self.state.as_ref().map(|slot| &slot.seed) == decorated.state
    }

    fn slot_mut(&mut self, kind: ValueKind) -> Option<&mut Slot> {
        match kind {
            ValueKind::Props => Some(&mut self.props),
            ValueKind::State => self.state.as_mut(),
        }
    }
}

/// A component element found while walking a fixture
struct Decorated<'a> {
    el_path: ElPath,
    ty: &'a ComponentType,
    props: &'a ValueMap,
    state: Option<&'a ValueMap>,
}

fn collect<'a>(
    element: &'a Element,
    el_path: ElPath,
    mock: Option<&'a ValueMap>,
    out: &mut Vec<Decorated<'a>>,
) {
    match element {
        Element::Text(_) => {}
        Element::Component { ty, props } => out.push(Decorated {
            el_path,
            ty,
            props,
            state: mock,
        }),
        Element::StateMock { state, child } => {
            collect(child, el_path.child("children"), Some(state), out);
        }
        Element::Fragment(children) => {
            for (index, child) in children.iter().enumerate() {
                collect(child, el_path.index(index), None, out);
            }
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    fixtures: IndexMap<FixturePath, Element>,
    mounted: Option<FixturePath>,
    instances: IndexMap<ElPath, SimInstance>,
}

impl SimState {
    /// Commit `element`, keeping instances whose type and seeds are unchanged
    fn commit(&mut self, element: &Element) {
        let mut decorated = Vec::new();
        collect(element, ElPath::root(), None, &mut decorated);

        let mut previous = std::mem::take(&mut self.instances);
        for found in decorated {
            let instance = match previous.shift_remove(&found.el_path) {
                Some(prior) if prior.matches(&found) => prior,
                _ => SimInstance::mount(&found),
            };
            self.instances.insert(found.el_path, instance);
        }
    }

    fn mounted_element(&self) -> Option<&Element> {
        self.mounted
            .as_ref()
            .and_then(|path| self.fixtures.get(path))
    }

    fn render(&self, element: &Element, el_path: &ElPath) -> String {
        match element {
            Element::Text(text) => text.clone(),
            Element::Component { .. } => self
                .instances
                .get(el_path)
                .map(|instance| {
                    let empty = ValueMap::new();
                    let state = instance.state.as_ref().map_or(&empty, |slot| &slot.live);
                    (instance.component.render)(&instance.props.live, state)
                })
                .unwrap_or_default(),
            Element::StateMock { child, .. } => self.render(child, &el_path.child("children")),
            Element::Fragment(children) => children
                .iter()
                .enumerate()
                .map(|(index, child)| self.render(child, &el_path.index(index)))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Simulated sandbox renderer
///
/// Cloning shares the same renderer; the clone handed to the engine and the
/// one kept by a test observe each other's changes.
#[derive(Clone)]
pub struct SimSandbox {
    state: Arc<Mutex<SimState>>,
    commits: Arc<watch::Sender<u64>>,
}

impl fmt::Debug for SimSandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimSandbox")
            .field("mounted", &self.state.lock().mounted)
            .field("commits", &*self.commits.borrow())
            .finish_non_exhaustive()
    }
}

impl SimSandbox {
    pub fn new<P: Into<FixturePath>>(fixtures: impl IntoIterator<Item = (P, Element)>) -> Self {
        let (commits, _) = watch::channel(0);
        let state = SimState {
            fixtures: fixtures
                .into_iter()
                .map(|(path, element)| (path.into(), element))
                .collect(),
            ..SimState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            commits: Arc::new(commits),
        }
    }

    /// Re-render the mounted fixture from its current definition
    pub fn render(&self) {
        {
            let mut state = self.state.lock();
            let Some(element) = state.mounted_element().cloned() else {
                return;
            };
            state.commit(&element);
        }
        self.notify();
    }

    /// Swap the fixture definitions, as a hot reload would
    ///
    /// The mounted fixture re-renders from its new definition, or unmounts
    /// if it no longer exists.
    pub fn replace_fixtures<P: Into<FixturePath>>(
        &self,
        fixtures: impl IntoIterator<Item = (P, Element)>,
    ) {
        {
            let mut state = self.state.lock();
            state.fixtures = fixtures
                .into_iter()
                .map(|(path, element)| (path.into(), element))
                .collect();
            let element = state.mounted_element().cloned();
            match element {
                Some(element) => state.commit(&element),
                None => {
                    state.mounted = None;
                    state.instances.clear();
                }
            }
        }
        self.notify();
    }

    /// Set a state value from inside the component
    ///
    /// This does not advance the commit hook. Returns false if no stateful
    /// instance lives at `el_path`.
    pub fn set_component_state(&self, el_path: &ElPath, key: &str, value: impl Into<LiveValue>) -> bool {
        let mut state = self.state.lock();
        match state
            .instances
            .get_mut(el_path)
            .and_then(|instance| instance.slot_mut(ValueKind::State))
        {
            Some(slot) => {
                slot.write(key, value.into());
                true
            }
            None => false,
        }
    }

    /// Live state of the instance at `el_path`
    #[must_use]
    pub fn component_state(&self, el_path: &ElPath) -> Option<ValueMap> {
        let state = self.state.lock();
        state
            .instances
            .get(el_path)
            .and_then(|instance| instance.state.as_ref())
            .map(|slot| slot.live.clone())
    }

    /// Rendered text of the mounted fixture, empty if nothing is mounted
    #[must_use]
    pub fn output(&self) -> String {
        let state = self.state.lock();
        state
            .mounted_element()
            .map(|element| state.render(element, &ElPath::root()))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn mounted(&self) -> Option<FixturePath> {
        self.state.lock().mounted.clone()
    }

    /// Commits so far
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        *self.commits.borrow()
    }

    fn notify(&self) {
        self.commits.send_modify(|count| *count += 1);
    }
}

impl RenderEnvironment for SimSandbox {
    fn fixture_paths(&self) -> Vec<FixturePath> {
        self.state.lock().fixtures.keys().cloned().collect()
    }

    fn mount(&self, fixture: &FixturePath) -> Result<(), SandboxError> {
        {
            let mut state = self.state.lock();
            let element = state
                .fixtures
                .get(fixture)
                .cloned()
                .ok_or_else(|| SandboxError::UnknownFixture(fixture.clone()))?;
            state.instances.clear();
            state.mounted = Some(fixture.clone());
            state.commit(&element);
        }
        tracing::debug!(%fixture, "mounted fixture");
        self.notify();
        Ok(())
    }

    fn unmount(&self) {
        {
            let mut state = self.state.lock();
            state.mounted = None;
            state.instances.clear();
        }
        self.notify();
    }

    fn tree(&self) -> TreeSnapshot {
        let state = self.state.lock();
        TreeSnapshot::new(
            state
                .instances
                .iter()
                .map(|(el_path, instance)| MountedInstance {
                    el_path: el_path.clone(),
                    component_name: instance.component.name.clone(),
                    seed: InstanceSeed {
                        props: Some(instance.props.seed.clone()),
                        state: instance.state.as_ref().map(|slot| slot.seed.clone()),
                    },
                })
                .collect(),
        )
    }

    fn with_decorator<R>(
        &self,
        el_path: &ElPath,
        kind: ValueKind,
        f: impl FnOnce(&mut dyn Decorator) -> R,
    ) -> Option<R> {
        let mut state = self.state.lock();
        let slot = state.instances.get_mut(el_path)?.slot_mut(kind)?;
        Some(f(slot))
    }

    fn commits(&self) -> watch::Receiver<u64> {
        self.commits.subscribe()
    }
}
