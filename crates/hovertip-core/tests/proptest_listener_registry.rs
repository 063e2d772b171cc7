//! Property-based invariant tests for the in-memory listener registry.
//!
//! 1. A spec is registered at most once, however often it is added
//! 2. `add_calls`/`remove_calls` count every call
//! 3. After removing every spec ever added, the registry is empty
//! 4. Registration is independent of unrelated specs

use hovertip_core::element::ElementId;
use hovertip_core::event::{EventKind, HandlerId, ListenerPhase, ListenerSpec, ListenerTarget};
use hovertip_core::geometry::Rect;
use hovertip_core::host::Listeners;
use hovertip_core::memory::MemoryDocument;
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Op {
    Add(usize),
    Remove(usize),
}

const KINDS: [EventKind; 4] = [
    EventKind::MouseEnter,
    EventKind::MouseLeave,
    EventKind::TouchStart,
    EventKind::Click,
];

/// A small universe of specs so collisions are frequent.
fn universe(elements: &[ElementId]) -> Vec<ListenerSpec> {
    let mut specs = Vec::new();
    for handler in 1..=3 {
        for kind in KINDS {
            for phase in [ListenerPhase::Bubble, ListenerPhase::Capture] {
                specs.push(ListenerSpec::on_document(kind, phase, HandlerId::new(handler)));
            }
            for el in elements {
                specs.push(ListenerSpec::on_element(*el, kind, HandlerId::new(handler)));
            }
        }
    }
    specs
}

fn op_strategy(n: usize) -> impl Strategy<Value = Op> {
    prop_oneof![(0..n).prop_map(Op::Add), (0..n).prop_map(Op::Remove)]
}

fn setup() -> (MemoryDocument, Vec<ListenerSpec>) {
    let mut doc = MemoryDocument::new(800.0, 600.0);
    let a = doc.create_element(None, Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = doc.create_element(Some(a), Rect::new(0.0, 0.0, 5.0, 5.0));
    let specs = universe(&[a, b]);
    (doc, specs)
}

proptest! {
    #[test]
    fn registry_matches_set_model(ops in proptest::collection::vec(op_strategy(40), 0..200)) {
        let (mut doc, specs) = setup();
        let mut model: Vec<ListenerSpec> = Vec::new();
        let (mut adds, mut removes) = (0u64, 0u64);

        for op in &ops {
            match *op {
                Op::Add(i) => {
                    let spec = specs[i % specs.len()];
                    doc.add_listener(spec);
                    adds += 1;
                    if !model.contains(&spec) {
                        model.push(spec);
                    }
                }
                Op::Remove(i) => {
                    let spec = specs[i % specs.len()];
                    doc.remove_listener(&spec);
                    removes += 1;
                    model.retain(|s| *s != spec);
                }
            }
        }

        prop_assert_eq!(doc.live_listeners(), model.as_slice());
        let stats = doc.listener_stats();
        prop_assert_eq!(stats.add_calls, adds);
        prop_assert_eq!(stats.remove_calls, removes);
    }

    #[test]
    fn removing_everything_empties_registry(ops in proptest::collection::vec(op_strategy(40), 0..100)) {
        let (mut doc, specs) = setup();
        for op in &ops {
            match *op {
                Op::Add(i) => doc.add_listener(specs[i % specs.len()]),
                Op::Remove(i) => doc.remove_listener(&specs[i % specs.len()]),
            }
        }
        for spec in &specs {
            doc.remove_listener(spec);
        }
        prop_assert!(doc.live_listeners().is_empty());
        for kind in KINDS {
            prop_assert_eq!(doc.listener_count(ListenerTarget::Document, kind), 0);
        }
    }

    #[test]
    fn repeated_adds_register_once(n in 1usize..20, idx in 0usize..40) {
        let (mut doc, specs) = setup();
        let spec = specs[idx % specs.len()];
        for _ in 0..n {
            doc.add_listener(spec);
        }
        prop_assert_eq!(doc.live_listeners().len(), 1);
        prop_assert_eq!(doc.listener_stats().duplicate_adds, (n - 1) as u64);
    }
}
