//! Instance registry
//!
//! Assigns [`DecoratorId`]s to decorated instances and keeps them stable
//! across re-renders. Matching is pure data comparison over element paths
//! and decorator seeds; live object identity is never consulted.
//!
//! # Matching rules
//! 1. Same path, equal seed → retained, same ID (the wrapped component may
//!    have changed type)
//! 2. Same path, different seed → new logical instance: old ID released,
//!    new ID minted
//! 3. Path not seen before → added, new ID
//! 4. Previous path missing from the tree → removed

use crate::environment::{InstanceSeed, TreeSnapshot};
use fixture_state::{DecoratorId, ElPath, ValueKind};
use indexmap::IndexMap;

/// A registered slot
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredInstance {
    pub decorator_id: DecoratorId,
    pub el_path: ElPath,
    pub component_name: String,
    pub seed: InstanceSeed,
}

impl RegisteredInstance {
    /// Kinds this instance exposes
    pub fn kinds(&self) -> impl Iterator<Item = ValueKind> + '_ {
        self.seed.kinds()
    }
}

/// Outcome of matching a committed tree against the previous one
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reconciliation {
    /// Slots seen for the first time (including re-seeded ones)
    pub added: Vec<RegisteredInstance>,
    /// Slots that kept their identity
    pub retained: Vec<RegisteredInstance>,
    /// IDs no longer in use
    pub removed: Vec<DecoratorId>,
    /// Added slots that replaced a differently seeded one at the same path
    ///
    /// The live decorator may still hold values from the previous identity.
    pub reseeded: Vec<DecoratorId>,
}

impl Reconciliation {
    /// Check if identities changed at all
    #[inline]
    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Slot arena keyed by element path, in tree order
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    slots: IndexMap<ElPath, RegisteredInstance>,
    next_id: u64,
}

impl InstanceRegistry {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Match a committed tree against the previous reconciliation
    pub fn reconcile(&mut self, tree: &TreeSnapshot) -> Reconciliation {
        let mut previous = std::mem::take(&mut self.slots);
        let mut result = Reconciliation::default();

        for mounted in &tree.instances {
            let prior = previous.shift_remove(&mounted.el_path);

            let decorator_id = match prior {
                Some(prior) if prior.seed == mounted.seed => {
                    let instance = RegisteredInstance {
                        component_name: mounted.component_name.clone(),
                        ..prior
                    };
                    result.retained.push(instance.clone());
                    self.slots.insert(mounted.el_path.clone(), instance);
                    continue;
                }
                Some(prior) => {
                    tracing::debug!(
                        decorator_id = %prior.decorator_id,
                        el_path = %mounted.el_path,
                        "decorator seed changed; minting new identity"
                    );
                    result.removed.push(prior.decorator_id);
                    let decorator_id = self.mint();
                    result.reseeded.push(decorator_id);
                    decorator_id
                }
                None => self.mint(),
            };

            let instance = RegisteredInstance {
                decorator_id,
                el_path: mounted.el_path.clone(),
                component_name: mounted.component_name.clone(),
                seed: mounted.seed.clone(),
            };
            result.added.push(instance.clone());
            self.slots.insert(mounted.el_path.clone(), instance);
        }

        result
            .removed
            .extend(previous.into_values().map(|gone| gone.decorator_id));

        result
    }

    /// Resolve a slot by identity and position
    #[must_use]
    pub fn resolve(&self, decorator_id: DecoratorId, el_path: &ElPath) -> Option<&RegisteredInstance> {
        self.slots
            .get(el_path)
            .filter(|instance| instance.decorator_id == decorator_id)
    }

    /// Registered slots in tree order
    pub fn instances(&self) -> impl Iterator<Item = &RegisteredInstance> {
        self.slots.values()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Release every slot
    ///
    /// IDs keep counting so a later selection never sees a recycled one.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    fn mint(&mut self) -> DecoratorId {
        let id = DecoratorId(self.next_id);
        self.next_id += 1;
        id
    }
}
