//! Binding change-feed consumer
//!
//! Events arrive at-least-once from the external watch machinery. Applying an
//! event twice leaves the index unchanged, so redelivery needs no bookkeeping.

use crate::index::ReverseIndex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use trellis_core::{Binding, BindingKey};

/// Object delivered by the change feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedObject {
    /// A binding
    Binding(Binding),
    /// Any other object kind sharing the feed
    Foreign {
        /// Object kind
        kind: String,
        /// Object namespace
        namespace: String,
        /// Object name
        name: String,
    },
}

impl From<Binding> for FeedObject {
    fn from(binding: Binding) -> Self {
        Self::Binding(binding)
    }
}

/// Change notification for the binding collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingEvent {
    /// Object created or updated
    Applied(FeedObject),
    /// Binding removed
    Deleted(BindingKey),
    /// Watch restarted; the payload is the complete current collection
    Restarted(Vec<FeedObject>),
}

/// Apply a single event to the index.
pub fn apply_event(index: &ReverseIndex, event: BindingEvent) {
    match event {
        BindingEvent::Applied(object) => {
            index.update(&object);
        }
        BindingEvent::Deleted(key) => {
            if index.remove(&key).is_none() {
                tracing::trace!(binding = %key, "Delete for unindexed binding");
            }
        }
        BindingEvent::Restarted(objects) => {
            let count = objects.len();
            index.replace_all(objects);
            tracing::debug!(
                objects = count,
                bindings = index.len(),
                "Rebuilt binding index from feed replay"
            );
        }
    }
}

/// Drain `events` into `index` until every sender is dropped.
///
/// The task resolves to the number of events applied.
pub fn spawn_feed(
    index: Arc<ReverseIndex>,
    mut events: mpsc::Receiver<BindingEvent>,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut applied = 0usize;
        while let Some(event) = events.recv().await {
            tracing::trace!(event = ?event, "Applying binding event");
            apply_event(&index, event);
            applied += 1;
        }
        tracing::debug!(applied, "Binding feed closed");
        applied
    })
}
