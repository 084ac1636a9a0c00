//! Lifecycle contract exposed to the controller runtime.

use crate::removal::RemovalSummary;
use async_trait::async_trait;
use trellis_core::{CascadeResult, Template};

/// Template lifecycle trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateEvent {
    /// Template was created
    Created(Template),
    /// Template was updated
    Updated(Template),
    /// Template is being removed
    Removed(Template),
}

impl TemplateEvent {
    /// Template the event concerns
    pub fn template(&self) -> &Template {
        match self {
            Self::Created(t) | Self::Updated(t) | Self::Removed(t) => t,
        }
    }
}

/// Successful result of handling a [`TemplateEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// Number of dependent bindings enqueued
    Enqueued(usize),
    /// Per-cluster outcome of the cascading removal
    Removed(RemovalSummary),
}

/// Entry points invoked by the controller runtime.
///
/// The runtime serializes calls for one template and may run different
/// templates concurrently. An `Err` asks the runtime to retry.
#[async_trait]
pub trait TemplateLifecycle: Send + Sync {
    /// Template created
    async fn create(&self, template: &Template) -> CascadeResult<usize>;

    /// Template updated
    async fn updated(&self, template: &Template) -> CascadeResult<usize>;

    /// Template removed
    async fn remove(&self, template: &Template) -> CascadeResult<RemovalSummary>;

    /// Route an event to the matching entry point
    async fn handle(&self, event: TemplateEvent) -> CascadeResult<LifecycleOutcome> {
        match event {
            TemplateEvent::Created(template) => {
                self.create(&template).await.map(LifecycleOutcome::Enqueued)
            }
            TemplateEvent::Updated(template) => {
                self.updated(&template).await.map(LifecycleOutcome::Enqueued)
            }
            TemplateEvent::Removed(template) => {
                self.remove(&template).await.map(LifecycleOutcome::Removed)
            }
        }
    }
}
