//! Cascade reconciler.

use crate::lifecycle::TemplateLifecycle;
use crate::removal::RemovalSummary;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;
use trellis_core::{
    BindingLookup, BindingScheduler, CascadeConfig, CascadeError, CascadeResult,
    ClusterContextProvider, ClusterRegistry, Template,
};

/// Keeps bindings and fleet mirrors consistent with template lifecycle.
///
/// Holds no mutable state of its own; one instance can serve every worker of
/// the controller runtime.
pub struct CascadeReconciler {
    pub(crate) config: CascadeConfig,
    bindings: Arc<dyn BindingLookup>,
    scheduler: Arc<dyn BindingScheduler>,
    pub(crate) registry: Arc<dyn ClusterRegistry>,
    pub(crate) contexts: Arc<dyn ClusterContextProvider>,
}

impl CascadeReconciler {
    /// Create a reconciler over its collaborators
    pub fn new(
        config: CascadeConfig,
        bindings: Arc<dyn BindingLookup>,
        scheduler: Arc<dyn BindingScheduler>,
        registry: Arc<dyn ClusterRegistry>,
        contexts: Arc<dyn ClusterContextProvider>,
    ) -> Self {
        Self {
            config,
            bindings,
            scheduler,
            registry,
            contexts,
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Enqueue every binding referencing `template`.
    ///
    /// A failed index query fails the call before anything is enqueued. A
    /// rejected enqueue fails the call; the runtime retries and duplicates are
    /// coalesced by the scheduler.
    #[instrument(skip(self, template), fields(lifecycle = %self.config.lifecycle_name, template = %template.name))]
    pub async fn enqueue_dependents(&self, template: &Template) -> CascadeResult<usize> {
        let bindings = self.bindings.bindings_for_template(&template.name).await?;

        for binding in &bindings {
            self.scheduler
                .enqueue(&binding.namespace, &binding.name)
                .await
                .map_err(|source| CascadeError::Enqueue {
                    namespace: binding.namespace.clone(),
                    name: binding.name.clone(),
                    source,
                })?;
        }

        tracing::debug!(bindings = bindings.len(), "Enqueued dependent bindings");
        Ok(bindings.len())
    }
}

#[async_trait]
impl TemplateLifecycle for CascadeReconciler {
    async fn create(&self, template: &Template) -> CascadeResult<usize> {
        self.enqueue_dependents(template).await
    }

    async fn updated(&self, template: &Template) -> CascadeResult<usize> {
        self.enqueue_dependents(template).await
    }

    async fn remove(&self, template: &Template) -> CascadeResult<RemovalSummary> {
        self.remove_mirrors(template).await
    }
}
