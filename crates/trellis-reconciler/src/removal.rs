//! Cascading removal of mirrored permission objects across the fleet
//!
//! Every cluster is visited independently: acquire context, look the mirror
//! up, delete it. Lookup always precedes delete so that an absent object is
//! classified as already clean rather than attempted blind.
//!
//! | step | absorbed | recorded |
//! |------|----------|----------|
//! | acquire context | `Unavailable` | anything else |
//! | lookup | `NotFound` | anything else |
//! | delete | `NotFound` | anything else |

use crate::reconciler::CascadeReconciler;
use futures::stream::{self, StreamExt};
use tracing::instrument;
use trellis_core::{
    AggregateError, CascadeError, CascadeResult, CleanupStage, ClusterFailure, PermissionStore,
    RemoteError, Template,
};

/// Per-cluster outcome of a successful removal.
///
/// Cluster names are sorted within each list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalSummary {
    /// Clusters whose mirror was deleted by this call
    pub deleted: Vec<String>,
    /// Clusters with no mirror, or whose mirror vanished before the delete
    pub already_clean: Vec<String>,
    /// Clusters skipped because they could not be reached
    pub unreachable: Vec<String>,
}

impl RemovalSummary {
    /// Number of clusters visited
    pub fn visited(&self) -> usize {
        self.deleted.len() + self.already_clean.len() + self.unreachable.len()
    }
}

#[derive(Debug)]
enum ClusterOutcome {
    Deleted,
    AlreadyClean,
    Unreachable,
    Failed(ClusterFailure),
}

fn failure(cluster: &str, stage: CleanupStage, source: RemoteError) -> ClusterOutcome {
    tracing::warn!(
        cluster = %cluster,
        stage = %stage,
        error = %source,
        "Failed to clean up mirrored permission object"
    );
    ClusterOutcome::Failed(ClusterFailure {
        cluster: cluster.to_string(),
        stage,
        source,
    })
}

impl CascadeReconciler {
    /// Delete the mirror of `template` from every reachable cluster.
    ///
    /// Fails immediately if the registry cannot be listed. Otherwise every
    /// cluster is visited, at most `max_concurrent_clusters` at a time, and
    /// all unexpected failures are returned as one [`AggregateError`].
    #[instrument(skip(self, template), fields(lifecycle = %self.config.lifecycle_name, template = %template.name))]
    pub async fn remove_mirrors(&self, template: &Template) -> CascadeResult<RemovalSummary> {
        let clusters = self
            .registry
            .list()
            .await
            .map_err(CascadeError::ListClusters)?;

        let width = self.config.max_concurrent_clusters.max(1);
        let outcomes: Vec<(String, ClusterOutcome)> = stream::iter(clusters)
            .map(|cluster| self.cleanup_cluster(cluster.name, &template.name))
            .buffer_unordered(width)
            .collect()
            .await;

        let mut summary = RemovalSummary::default();
        let mut failures = Vec::new();
        for (cluster, outcome) in outcomes {
            match outcome {
                ClusterOutcome::Deleted => summary.deleted.push(cluster),
                ClusterOutcome::AlreadyClean => summary.already_clean.push(cluster),
                ClusterOutcome::Unreachable => summary.unreachable.push(cluster),
                ClusterOutcome::Failed(f) => failures.push(f),
            }
        }

        if !failures.is_empty() {
            failures.sort_by(|a, b| a.cluster.cmp(&b.cluster));
            return Err(AggregateError {
                template: template.name.clone(),
                failures,
            }
            .into());
        }

        summary.deleted.sort();
        summary.already_clean.sort();
        summary.unreachable.sort();
        tracing::info!(
            deleted = summary.deleted.len(),
            already_clean = summary.already_clean.len(),
            unreachable = summary.unreachable.len(),
            "Removed mirrored permission objects"
        );
        Ok(summary)
    }

    async fn cleanup_cluster(&self, cluster: String, name: &str) -> (String, ClusterOutcome) {
        let outcome = match self.contexts.context(&cluster).await {
            Ok(store) => delete_mirror(&cluster, store.as_ref(), name).await,
            Err(err) if err.is_unavailable() => {
                tracing::debug!(cluster = %cluster, error = %err, "Skipping unreachable cluster");
                ClusterOutcome::Unreachable
            }
            Err(err) => failure(&cluster, CleanupStage::AcquireContext, err),
        };
        (cluster, outcome)
    }
}

async fn delete_mirror(cluster: &str, store: &dyn PermissionStore, name: &str) -> ClusterOutcome {
    let mirror = match store.get(name).await {
        Ok(mirror) => mirror,
        Err(err) if err.is_not_found() => {
            tracing::debug!(cluster = %cluster, "No mirrored permission object");
            return ClusterOutcome::AlreadyClean;
        }
        Err(err) => return failure(cluster, CleanupStage::Lookup, err),
    };

    match store.delete(&mirror.name).await {
        Ok(()) => {
            tracing::info!(cluster = %cluster, object = %mirror.name, "Deleted mirrored permission object");
            ClusterOutcome::Deleted
        }
        Err(err) if err.is_not_found() => {
            tracing::debug!(cluster = %cluster, "Mirrored permission object deleted concurrently");
            ClusterOutcome::AlreadyClean
        }
        Err(err) => failure(cluster, CleanupStage::Delete, err),
    }
}
