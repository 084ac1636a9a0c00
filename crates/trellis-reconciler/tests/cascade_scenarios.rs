//! End-to-end lifecycle scenarios
//!
//! Wires the reconciler to a live reverse index fed over a channel and to an
//! in-memory fleet.

use assert_matches::assert_matches;
use std::sync::Arc;
use tokio::sync::mpsc;
use trellis_core::{BindingKey, CascadeConfig, CascadeError, CleanupStage, RemoteError};
use trellis_index::{spawn_feed, BindingEvent, ReverseIndex};
use trellis_reconciler::{
    CascadeReconciler, LifecycleOutcome, RemovalSummary, TemplateEvent, TemplateLifecycle,
};
use trellis_testkit::{binding, init_tracing, template, InMemoryFleet, RecordingScheduler};

struct Harness {
    index: Arc<ReverseIndex>,
    fleet: InMemoryFleet,
    scheduler: RecordingScheduler,
    reconciler: CascadeReconciler,
}

fn harness(config: CascadeConfig) -> Harness {
    init_tracing();
    let index = Arc::new(ReverseIndex::new());
    let fleet = InMemoryFleet::new();
    let scheduler = RecordingScheduler::new();
    let reconciler = CascadeReconciler::new(
        config,
        index.clone(),
        Arc::new(scheduler.clone()),
        Arc::new(fleet.clone()),
        Arc::new(fleet.clone()),
    );
    Harness {
        index,
        fleet,
        scheduler,
        reconciler,
    }
}

#[tokio::test]
async fn t1_scenario_skips_unreachable_and_succeeds() {
    let h = harness(CascadeConfig::default());

    let (tx, rx) = mpsc::channel(4);
    let feed = spawn_feed(h.index.clone(), rx);
    tx.send(BindingEvent::Applied(binding("p-1", "b1", "T1").into()))
        .await
        .unwrap();
    tx.send(BindingEvent::Applied(binding("p-2", "b2", "T1").into()))
        .await
        .unwrap();
    drop(tx);
    feed.await.unwrap();

    h.fleet.with_mirror("clusterA", "T1");
    h.fleet.add_cluster("clusterB").with_mirror("clusterB", "T1");
    h.fleet.set_unreachable("clusterB", true);
    h.fleet.add_cluster("clusterC");

    let enqueued = h.reconciler.create(&template("T1")).await.unwrap();
    assert_eq!(enqueued, 2);
    assert_eq!(
        h.scheduler.enqueued(),
        vec![BindingKey::new("p-1", "b1"), BindingKey::new("p-2", "b2")]
    );

    let summary = h.reconciler.remove(&template("T1")).await.unwrap();
    assert_eq!(
        summary,
        RemovalSummary {
            deleted: vec!["clusterA".into()],
            already_clean: vec!["clusterC".into()],
            unreachable: vec!["clusterB".into()],
        }
    );
    assert!(!h.fleet.has_mirror("clusterA", "T1"));
    assert!(h.fleet.has_mirror("clusterB", "T1"));
}

#[tokio::test]
async fn repeated_updates_never_omit_a_binding() {
    let h = harness(CascadeConfig::default());
    h.index.upsert(binding("p-1", "b1", "owner"));
    h.index.upsert(binding("p-2", "b2", "owner"));
    h.index.upsert(binding("p-3", "b3", "member"));

    h.reconciler.updated(&template("owner")).await.unwrap();
    let single = h.scheduler.unique();
    h.scheduler.clear();

    h.reconciler.updated(&template("owner")).await.unwrap();
    h.reconciler.updated(&template("owner")).await.unwrap();

    assert!(h.scheduler.unique().is_superset(&single));
    assert_eq!(h.scheduler.enqueued().len(), 4);
}

#[tokio::test]
async fn index_changes_are_visible_to_next_enqueue() {
    let h = harness(CascadeConfig::default());
    h.index.upsert(binding("p-1", "b1", "owner"));
    h.index.upsert(binding("p-1", "b1", "member"));

    assert_eq!(h.reconciler.create(&template("owner")).await.unwrap(), 0);
    assert_eq!(h.reconciler.create(&template("member")).await.unwrap(), 1);
}

#[tokio::test]
async fn deletes_from_every_reachable_cluster() {
    let h = harness(CascadeConfig::default());
    for n in 0..12 {
        let cluster = format!("c-{n:02}");
        h.fleet.with_mirror(&cluster, "owner");
        if n % 4 == 0 {
            h.fleet.set_unreachable(&cluster, true);
        }
    }

    let summary = h.reconciler.remove(&template("owner")).await.unwrap();

    assert_eq!(summary.deleted.len(), 9);
    assert_eq!(summary.unreachable, vec!["c-00", "c-04", "c-08"]);
    assert_eq!(summary.visited(), 12);
    assert_eq!(
        h.fleet.clusters_with_mirror("owner"),
        vec!["c-00", "c-04", "c-08"]
    );
}

#[tokio::test]
async fn one_failing_cluster_is_isolated() {
    for config in [CascadeConfig::sequential(), CascadeConfig::default()] {
        let h = harness(config);
        for cluster in ["c-a", "c-b", "c-c", "c-d"] {
            h.fleet.with_mirror(cluster, "owner");
        }
        h.fleet
            .fail_delete("c-c", RemoteError::other("admission webhook denied the request"));

        let err = h.reconciler.remove(&template("owner")).await.unwrap_err();

        let aggregate = assert_matches!(err, CascadeError::Aggregate(a) => a);
        assert_eq!(aggregate.clusters(), vec!["c-c"]);
        assert_eq!(aggregate.failures[0].stage, CleanupStage::Delete);
        assert_eq!(h.fleet.clusters_with_mirror("owner"), vec!["c-c"]);
    }
}

#[tokio::test]
async fn retry_after_recovery_converges() {
    let h = harness(CascadeConfig::default());
    for cluster in ["c-a", "c-b", "c-c"] {
        h.fleet.with_mirror(cluster, "owner");
    }
    h.fleet
        .fail_context("c-a", RemoteError::other("token expired"))
        .fail_get("c-b", RemoteError::timeout("get", 10_000));

    let first = h.reconciler.remove(&template("owner")).await;
    let aggregate = assert_matches!(first, Err(CascadeError::Aggregate(a)) => a);
    assert_eq!(aggregate.clusters(), vec!["c-a", "c-b"]);
    assert!(!h.fleet.has_mirror("c-c", "owner"));

    h.fleet.heal();
    let second = h.reconciler.remove(&template("owner")).await.unwrap();

    assert_eq!(second.deleted, vec!["c-a", "c-b"]);
    assert_eq!(second.already_clean, vec!["c-c"]);
    assert!(h.fleet.clusters_with_mirror("owner").is_empty());

    // A third pass is a no-op
    let third = h.reconciler.remove(&template("owner")).await.unwrap();
    assert!(third.deleted.is_empty());
    assert_eq!(third.already_clean.len(), 3);
}

#[tokio::test]
async fn handle_routes_events() {
    let h = harness(CascadeConfig::sequential());
    h.index.upsert(binding("p-1", "b1", "owner"));
    h.fleet.with_mirror("c-a", "owner");

    let created = h
        .reconciler
        .handle(TemplateEvent::Created(template("owner")))
        .await
        .unwrap();
    assert_eq!(created, LifecycleOutcome::Enqueued(1));

    let event = TemplateEvent::Removed(template("owner"));
    assert_eq!(event.template().name, "owner");
    let removed = h.reconciler.handle(event).await.unwrap();
    assert_matches!(removed, LifecycleOutcome::Removed(summary) if summary.deleted == vec!["c-a"]);
}

#[tokio::test]
async fn registry_failure_is_fatal() {
    let h = harness(CascadeConfig::default());
    h.fleet
        .with_mirror("c-a", "owner")
        .fail_list(RemoteError::unavailable("local", "management plane restarting"));

    let err = h
        .reconciler
        .handle(TemplateEvent::Removed(template("owner")))
        .await
        .unwrap_err();

    assert!(err.is_fatal());
    assert!(h.fleet.has_mirror("c-a", "owner"));
}
