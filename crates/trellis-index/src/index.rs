//! Reverse index storage.

use crate::feed::FeedObject;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use trellis_core::{Binding, BindingKey, BindingLookup, IndexError, BINDING_BY_TEMPLATE_INDEX};

/// Index keys for a feed object: the referenced template name, or nothing for
/// objects that are not bindings.
pub fn template_keys(object: &FeedObject) -> BTreeSet<String> {
    match object {
        FeedObject::Binding(binding) => BTreeSet::from([binding.template_name.clone()]),
        FeedObject::Foreign { .. } => BTreeSet::new(),
    }
}

#[derive(Debug, Default)]
struct IndexState {
    /// Template name -> bindings referencing it
    by_template: HashMap<String, BTreeMap<BindingKey, Binding>>,
    /// Binding -> template it is currently indexed under
    template_of: HashMap<BindingKey, String>,
}

impl IndexState {
    fn insert(&mut self, binding: Binding) {
        let key = binding.key();
        if let Some(previous) = self.template_of.get(&key).cloned() {
            if previous != binding.template_name {
                self.detach(&previous, &key);
            }
        }
        self.template_of
            .insert(key.clone(), binding.template_name.clone());
        self.by_template
            .entry(binding.template_name.clone())
            .or_default()
            .insert(key, binding);
    }

    fn remove(&mut self, key: &BindingKey) -> Option<Binding> {
        let template = self.template_of.remove(key)?;
        self.detach(&template, key)
    }

    fn detach(&mut self, template: &str, key: &BindingKey) -> Option<Binding> {
        let bindings = self.by_template.get_mut(template)?;
        let removed = bindings.remove(key);
        if bindings.is_empty() {
            self.by_template.remove(template);
        }
        removed
    }
}

/// Concurrent template-name -> bindings index.
///
/// Every mutation touches at most two template entries under one short write
/// lock, so each binding's membership is linearizable. Lookups of different
/// templates give no joint snapshot guarantee.
#[derive(Debug, Default)]
pub struct ReverseIndex {
    state: RwLock<IndexState>,
}

impl ReverseIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of this secondary index
    pub fn name(&self) -> &'static str {
        BINDING_BY_TEMPLATE_INDEX
    }

    /// Apply a create/update notification.
    ///
    /// Supersedes any previous association of the same binding. Objects that
    /// are not bindings are ignored. Returns whether anything was indexed.
    pub fn update(&self, object: &FeedObject) -> bool {
        match object {
            FeedObject::Binding(binding) => {
                self.upsert(binding.clone());
                true
            }
            FeedObject::Foreign { kind, .. } => {
                tracing::trace!(kind = %kind, "Ignoring non-binding object");
                false
            }
        }
    }

    /// Index a binding under its template
    pub fn upsert(&self, binding: Binding) {
        self.state.write().insert(binding);
    }

    /// Apply a removal notification; unknown keys are a no-op
    pub fn remove(&self, key: &BindingKey) -> Option<Binding> {
        self.state.write().remove(key)
    }

    /// Replace the whole content with a replayed collection
    pub fn replace_all<I>(&self, objects: I)
    where
        I: IntoIterator<Item = FeedObject>,
    {
        let mut rebuilt = IndexState::default();
        for object in objects {
            if let FeedObject::Binding(binding) = object {
                rebuilt.insert(binding);
            }
        }
        *self.state.write() = rebuilt;
    }

    /// Bindings currently referencing `template_name`, ordered by key
    pub fn lookup(&self, template_name: &str) -> Vec<Binding> {
        self.state
            .read()
            .by_template
            .get(template_name)
            .map(|bindings| bindings.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of indexed bindings
    pub fn len(&self) -> usize {
        self.state.read().template_of.len()
    }

    /// Whether no binding is indexed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of templates with at least one binding
    pub fn template_count(&self) -> usize {
        self.state.read().by_template.len()
    }
}

#[async_trait]
impl BindingLookup for ReverseIndex {
    async fn bindings_for_template(
        &self,
        template_name: &str,
    ) -> Result<Vec<Binding>, IndexError> {
        Ok(self.lookup(template_name))
    }
}
