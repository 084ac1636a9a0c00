//! In-memory fleet
//!
//! One value plays the cluster registry, the context provider and every
//! cluster's permission store. Faults can be injected per cluster and per
//! step, and cleared again to simulate recovery.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use trellis_core::{
    ClusterContextProvider, ClusterDescriptor, ClusterRegistry, MirroredPermission,
    PermissionStore, RemoteError,
};

#[derive(Debug, Default)]
struct ClusterState {
    unreachable: bool,
    context_fault: Option<RemoteError>,
    get_fault: Option<RemoteError>,
    delete_fault: Option<RemoteError>,
    /// Object disappears between lookup and delete
    racing_delete: bool,
    objects: BTreeSet<String>,
    delete_calls: usize,
}

#[derive(Debug, Default)]
struct FleetState {
    clusters: BTreeMap<String, ClusterState>,
    list_fault: Option<RemoteError>,
}

/// Shared-state fleet double. Clones observe the same clusters.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFleet {
    state: Arc<Mutex<FleetState>>,
}

impl InMemoryFleet {
    /// Create an empty fleet
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reachable cluster with no objects
    pub fn add_cluster(&self, cluster: &str) -> &Self {
        self.state
            .lock()
            .clusters
            .entry(cluster.to_string())
            .or_default();
        self
    }

    /// Place a mirrored object in `cluster`
    pub fn with_mirror(&self, cluster: &str, name: &str) -> &Self {
        self.with_cluster(cluster, |c| {
            c.objects.insert(name.to_string());
        })
    }

    /// Toggle whether the cluster's control plane can be contacted
    pub fn set_unreachable(&self, cluster: &str, unreachable: bool) -> &Self {
        self.with_cluster(cluster, |c| c.unreachable = unreachable)
    }

    /// Fail context acquisition with `error`
    pub fn fail_context(&self, cluster: &str, error: RemoteError) -> &Self {
        self.with_cluster(cluster, |c| c.context_fault = Some(error))
    }

    /// Fail object lookup with `error`
    pub fn fail_get(&self, cluster: &str, error: RemoteError) -> &Self {
        self.with_cluster(cluster, |c| c.get_fault = Some(error))
    }

    /// Fail object deletion with `error`
    pub fn fail_delete(&self, cluster: &str, error: RemoteError) -> &Self {
        self.with_cluster(cluster, |c| c.delete_fault = Some(error))
    }

    /// Remove the object out-of-band right after it is looked up
    pub fn race_delete(&self, cluster: &str) -> &Self {
        self.with_cluster(cluster, |c| c.racing_delete = true)
    }

    /// Fail `list` with `error`
    pub fn fail_list(&self, error: RemoteError) -> &Self {
        self.state.lock().list_fault = Some(error);
        self
    }

    /// Remove every injected fault and make every cluster reachable
    pub fn heal(&self) -> &Self {
        let mut state = self.state.lock();
        state.list_fault = None;
        for cluster in state.clusters.values_mut() {
            cluster.unreachable = false;
            cluster.context_fault = None;
            cluster.get_fault = None;
            cluster.delete_fault = None;
            cluster.racing_delete = false;
        }
        self
    }

    /// Whether `cluster` still holds the mirrored object `name`
    pub fn has_mirror(&self, cluster: &str, name: &str) -> bool {
        self.state
            .lock()
            .clusters
            .get(cluster)
            .is_some_and(|c| c.objects.contains(name))
    }

    /// Clusters still holding the mirrored object `name`
    pub fn clusters_with_mirror(&self, name: &str) -> Vec<String> {
        self.state
            .lock()
            .clusters
            .iter()
            .filter(|(_, c)| c.objects.contains(name))
            .map(|(cluster, _)| cluster.clone())
            .collect()
    }

    /// Number of delete calls that reached `cluster`
    pub fn delete_calls(&self, cluster: &str) -> usize {
        self.state
            .lock()
            .clusters
            .get(cluster)
            .map_or(0, |c| c.delete_calls)
    }

    fn with_cluster(&self, cluster: &str, f: impl FnOnce(&mut ClusterState)) -> &Self {
        let mut state = self.state.lock();
        f(state.clusters.entry(cluster.to_string()).or_default());
        self
    }
}

#[async_trait]
impl ClusterRegistry for InMemoryFleet {
    async fn list(&self) -> Result<Vec<ClusterDescriptor>, RemoteError> {
        let state = self.state.lock();
        if let Some(fault) = &state.list_fault {
            return Err(fault.clone());
        }
        Ok(state
            .clusters
            .keys()
            .map(|name| ClusterDescriptor::new(name.clone()))
            .collect())
    }
}

#[async_trait]
impl ClusterContextProvider for InMemoryFleet {
    async fn context(&self, cluster: &str) -> Result<Arc<dyn PermissionStore>, RemoteError> {
        let state = self.state.lock();
        let Some(entry) = state.clusters.get(cluster) else {
            return Err(RemoteError::other(format!("cluster {cluster} not registered")));
        };
        if entry.unreachable {
            return Err(RemoteError::unavailable(cluster, "control plane not reachable"));
        }
        if let Some(fault) = &entry.context_fault {
            return Err(fault.clone());
        }
        Ok(Arc::new(ClusterStore {
            cluster: cluster.to_string(),
            state: self.state.clone(),
        }))
    }
}

/// Permission store view onto one cluster of an [`InMemoryFleet`].
struct ClusterStore {
    cluster: String,
    state: Arc<Mutex<FleetState>>,
}

#[async_trait]
impl PermissionStore for ClusterStore {
    async fn get(&self, name: &str) -> Result<MirroredPermission, RemoteError> {
        let mut state = self.state.lock();
        let Some(cluster) = state.clusters.get_mut(&self.cluster) else {
            return Err(RemoteError::unavailable(&self.cluster, "cluster deregistered"));
        };
        if let Some(fault) = &cluster.get_fault {
            return Err(fault.clone());
        }
        if !cluster.objects.contains(name) {
            return Err(RemoteError::not_found(name));
        }
        if cluster.racing_delete {
            cluster.objects.remove(name);
        }
        Ok(MirroredPermission::new(name))
    }

    async fn delete(&self, name: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock();
        let Some(cluster) = state.clusters.get_mut(&self.cluster) else {
            return Err(RemoteError::unavailable(&self.cluster, "cluster deregistered"));
        };
        cluster.delete_calls += 1;
        if let Some(fault) = &cluster.delete_fault {
            return Err(fault.clone());
        }
        if cluster.objects.remove(name) {
            Ok(())
        } else {
            Err(RemoteError::not_found(name))
        }
    }
}
