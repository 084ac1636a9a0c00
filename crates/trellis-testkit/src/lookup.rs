//! Binding lookup doubles.

use async_trait::async_trait;
use std::collections::BTreeMap;
use trellis_core::{Binding, BindingLookup, IndexError, BINDING_BY_TEMPLATE_INDEX};

/// Lookup whose every query fails, as an unsynced informer cache would.
#[derive(Debug, Clone)]
pub struct FailingLookup {
    message: String,
}

impl FailingLookup {
    /// Create a lookup failing with `message`
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl BindingLookup for FailingLookup {
    async fn bindings_for_template(
        &self,
        _template_name: &str,
    ) -> Result<Vec<Binding>, IndexError> {
        Err(IndexError::new(BINDING_BY_TEMPLATE_INDEX, self.message.clone()))
    }
}

/// Fixed answer set, grouped by template name.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    by_template: BTreeMap<String, Vec<Binding>>,
}

impl StaticLookup {
    /// Build from a binding collection
    pub fn from_bindings<I>(bindings: I) -> Self
    where
        I: IntoIterator<Item = Binding>,
    {
        let mut by_template: BTreeMap<String, Vec<Binding>> = BTreeMap::new();
        for binding in bindings {
            by_template
                .entry(binding.template_name.clone())
                .or_default()
                .push(binding);
        }
        Self { by_template }
    }
}

#[async_trait]
impl BindingLookup for StaticLookup {
    async fn bindings_for_template(
        &self,
        template_name: &str,
    ) -> Result<Vec<Binding>, IndexError> {
        Ok(self
            .by_template
            .get(template_name)
            .cloned()
            .unwrap_or_default())
    }
}
