//! Property tests for decorator identity assignment

use fixture_sandbox::{InstanceRegistry, InstanceSeed, MountedInstance, TreeSnapshot};
use fixture_state::{DecoratorId, ElPath, LiveValue, ValueMap};
use proptest::prelude::*;
use std::collections::HashSet;

/// A committed tree: up to four slots, each optionally present with a seed
fn tree_strategy() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::of(0i64..3), 4)
}

fn snapshot(slots: &[Option<i64>]) -> TreeSnapshot {
    TreeSnapshot::new(
        slots
            .iter()
            .enumerate()
            .filter_map(|(index, seed)| {
                seed.map(|count| {
                    let mut state = ValueMap::new();
                    state.insert("count".to_string(), LiveValue::from(count));
                    MountedInstance {
                        el_path: ElPath::root().index(index),
                        component_name: "Counter".to_string(),
                        seed: InstanceSeed {
                            props: Some(ValueMap::new()),
                            state: Some(state),
                        },
                    }
                })
            })
            .collect(),
    )
}

proptest! {
    #[test]
    fn released_ids_are_never_reissued(trees in prop::collection::vec(tree_strategy(), 1..12)) {
        let mut registry = InstanceRegistry::new();
        let mut released: HashSet<DecoratorId> = HashSet::new();

        for slots in &trees {
            let result = registry.reconcile(&snapshot(slots));
            for added in &result.added {
                prop_assert!(!released.contains(&added.decorator_id));
            }
            released.extend(result.removed.iter().copied());
        }
    }

    #[test]
    fn live_ids_are_unique(trees in prop::collection::vec(tree_strategy(), 1..12)) {
        let mut registry = InstanceRegistry::new();
        for slots in &trees {
            registry.reconcile(&snapshot(slots));
            let ids: HashSet<_> = registry.instances().map(|i| i.decorator_id).collect();
            prop_assert_eq!(ids.len(), registry.len());
        }
    }

    #[test]
    fn unchanged_tree_is_stable(slots in tree_strategy()) {
        let mut registry = InstanceRegistry::new();
        let tree = snapshot(&slots);
        registry.reconcile(&tree);
        let before: Vec<_> = registry.instances().map(|i| i.decorator_id).collect();

        let result = registry.reconcile(&tree);
        prop_assert!(result.is_stable());
        let after: Vec<_> = registry.instances().map(|i| i.decorator_id).collect();
        prop_assert_eq!(before, after);
    }
}
