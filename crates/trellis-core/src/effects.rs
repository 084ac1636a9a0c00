//! Collaborator interfaces
//!
//! The reconciler owns no I/O. Everything it touches outside its own memory is
//! reached through one of these traits: the binding index, the binding
//! reconciliation scheduler, the cluster registry, the per-cluster context
//! provider, and each cluster's permission-object store.
//!
//! Implementations are expected to apply their own timeout policy and surface
//! expiry as [`RemoteError::Timeout`].

use crate::errors::{IndexError, RemoteError, SchedulerError};
use crate::types::{Binding, ClusterDescriptor, MirroredPermission};
use async_trait::async_trait;
use std::sync::Arc;

/// Answers "which bindings reference template T".
#[async_trait]
pub trait BindingLookup: Send + Sync {
    /// All bindings currently referencing `template_name`
    async fn bindings_for_template(
        &self,
        template_name: &str,
    ) -> Result<Vec<Binding>, IndexError>;
}

/// Schedules a binding for independent reconciliation.
///
/// Fire-and-forget; duplicate requests for the same binding are coalesced by
/// the scheduler.
#[async_trait]
pub trait BindingScheduler: Send + Sync {
    /// Enqueue the binding `(namespace, name)`
    async fn enqueue(&self, namespace: &str, name: &str) -> Result<(), SchedulerError>;
}

/// Snapshot access to the fleet.
#[async_trait]
pub trait ClusterRegistry: Send + Sync {
    /// Every registered cluster
    async fn list(&self) -> Result<Vec<ClusterDescriptor>, RemoteError>;
}

/// Hands out per-cluster execution contexts.
#[async_trait]
pub trait ClusterContextProvider: Send + Sync {
    /// Context for `cluster`, or [`RemoteError::Unavailable`] when its control
    /// plane cannot be reached
    async fn context(&self, cluster: &str) -> Result<Arc<dyn PermissionStore>, RemoteError>;
}

/// Mirrored permission objects inside one remote cluster.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Fetch the mirrored object named `name`
    async fn get(&self, name: &str) -> Result<MirroredPermission, RemoteError>;

    /// Delete the mirrored object named `name`
    async fn delete(&self, name: &str) -> Result<(), RemoteError>;
}
