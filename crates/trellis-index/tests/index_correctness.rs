//! Index Correctness Tests
//!
//! The index must equal the join computed from scratch over the final binding
//! collection, whatever sequence of updates produced it.

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use trellis_core::{Binding, BindingKey};
use trellis_index::{apply_event, BindingEvent, FeedObject, ReverseIndex};
use trellis_testkit::strategies::{arb_binding_updates, arb_template_name};

/// Final collection after applying `updates` in order
fn final_collection(updates: &[Binding]) -> BTreeMap<BindingKey, Binding> {
    let mut collection = BTreeMap::new();
    for binding in updates {
        collection.insert(binding.key(), binding.clone());
    }
    collection
}

fn expected_for(collection: &BTreeMap<BindingKey, Binding>, template: &str) -> Vec<Binding> {
    collection
        .values()
        .filter(|b| b.template_name == template)
        .cloned()
        .collect()
}

proptest! {
    #[test]
    fn lookup_equals_full_scan(updates in arb_binding_updates(), probe in arb_template_name()) {
        let index = ReverseIndex::new();
        for binding in &updates {
            index.update(&FeedObject::Binding(binding.clone()));
        }

        let collection = final_collection(&updates);
        prop_assert_eq!(index.lookup(&probe), expected_for(&collection, &probe));
        prop_assert_eq!(index.len(), collection.len());
    }

    #[test]
    fn redelivery_does_not_change_result(updates in arb_binding_updates()) {
        let once = ReverseIndex::new();
        let twice = ReverseIndex::new();
        for binding in &updates {
            once.upsert(binding.clone());
            twice.upsert(binding.clone());
            twice.upsert(binding.clone());
        }

        for n in 0..5 {
            let template = format!("template-{n}");
            prop_assert_eq!(once.lookup(&template), twice.lookup(&template));
        }
    }

    #[test]
    fn deletes_are_reflected(updates in arb_binding_updates(), drop_every in 1usize..4) {
        let index = ReverseIndex::new();
        for binding in &updates {
            apply_event(&index, BindingEvent::Applied(binding.clone().into()));
        }

        let mut collection = final_collection(&updates);
        let doomed: Vec<BindingKey> = collection.keys().step_by(drop_every).cloned().collect();
        for key in &doomed {
            apply_event(&index, BindingEvent::Deleted(key.clone()));
            collection.remove(key);
        }

        for n in 0..5 {
            let template = format!("template-{n}");
            prop_assert_eq!(index.lookup(&template), expected_for(&collection, &template));
        }
    }

    #[test]
    fn replay_matches_incremental(updates in arb_binding_updates()) {
        let incremental = ReverseIndex::new();
        for binding in &updates {
            incremental.upsert(binding.clone());
        }

        let replayed = ReverseIndex::new();
        replayed.upsert(Binding::new("stale", "stale", "template-0", "x"));
        let snapshot = final_collection(&updates)
            .into_values()
            .map(FeedObject::from)
            .collect();
        apply_event(&replayed, BindingEvent::Restarted(snapshot));

        prop_assert_eq!(incremental.len(), replayed.len());
        for n in 0..5 {
            let template = format!("template-{n}");
            prop_assert_eq!(incremental.lookup(&template), replayed.lookup(&template));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_and_lookups_settle_to_full_scan() {
    let index = Arc::new(ReverseIndex::new());

    let mut writers = Vec::new();
    for worker in 0..4u8 {
        let index = index.clone();
        writers.push(tokio::spawn(async move {
            for i in 0..200u32 {
                let template = format!("template-{}", (i + u32::from(worker)) % 3);
                index.upsert(Binding::new(
                    format!("p-{worker}"),
                    format!("b{}", i % 16),
                    template,
                    "local",
                ));
                let _ = index.lookup("template-0");
                tokio::task::yield_now().await;
            }
        }));
    }
    for writer in writers {
        writer.await.unwrap();
    }

    // Each worker's last write to b{n} is the largest i < 200 with i % 16 == n
    let mut expected: BTreeSet<BindingKey> = BTreeSet::new();
    for worker in 0..4u32 {
        for n in 0..16u32 {
            let last = if n < 8 { 192 + n } else { 176 + n };
            if (last + worker) % 3 == 0 {
                expected.insert(BindingKey::new(format!("p-{worker}"), format!("b{n}")));
            }
        }
    }
    let actual: BTreeSet<BindingKey> = index.lookup("template-0").iter().map(Binding::key).collect();
    assert_eq!(actual, expected);
    assert_eq!(index.len(), 64);
}
