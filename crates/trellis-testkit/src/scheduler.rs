//! Recording binding scheduler.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use trellis_core::{BindingKey, BindingScheduler, SchedulerError};

#[derive(Debug, Default)]
struct SchedulerState {
    enqueued: Vec<BindingKey>,
    rejected: BTreeSet<BindingKey>,
}

/// Scheduler double that records every enqueue in call order.
///
/// Unlike a real work queue it does not coalesce duplicates, so tests can
/// observe exactly what was emitted.
#[derive(Debug, Clone, Default)]
pub struct RecordingScheduler {
    state: Arc<Mutex<SchedulerState>>,
}

impl RecordingScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject enqueues of `(namespace, name)`
    pub fn reject(&self, namespace: &str, name: &str) -> &Self {
        self.state
            .lock()
            .rejected
            .insert(BindingKey::new(namespace, name));
        self
    }

    /// Every accepted enqueue, in call order
    pub fn enqueued(&self) -> Vec<BindingKey> {
        self.state.lock().enqueued.clone()
    }

    /// Accepted enqueues with duplicates coalesced
    pub fn unique(&self) -> BTreeSet<BindingKey> {
        self.state.lock().enqueued.iter().cloned().collect()
    }

    /// Forget recorded enqueues
    pub fn clear(&self) {
        self.state.lock().enqueued.clear();
    }
}

#[async_trait]
impl BindingScheduler for RecordingScheduler {
    async fn enqueue(&self, namespace: &str, name: &str) -> Result<(), SchedulerError> {
        let key = BindingKey::new(namespace, name);
        let mut state = self.state.lock();
        if state.rejected.contains(&key) {
            return Err(SchedulerError::new(format!("queue closed for {key}")));
        }
        state.enqueued.push(key);
        Ok(())
    }
}
