//! Templates, bindings and fleet descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name under which the template lifecycle handler registers.
pub const LIFECYCLE_NAME: &str = "mgmt-auth-roletemplate-lifecycle";

/// Name of the binding-by-template secondary index.
pub const BINDING_BY_TEMPLATE_INDEX: &str = "management.cattle.io/prtb-by-role-template";

/// A named, reusable bundle of permission grants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Template {
    /// Unique template name
    pub name: String,
}

impl Template {
    /// Create a template reference by name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Identity of a binding: `(namespace, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BindingKey {
    /// Namespace the binding lives in
    pub namespace: String,
    /// Binding name, unique within its namespace
    pub name: String,
}

impl BindingKey {
    /// Create a binding key
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Association of a template with a scope.
///
/// A binding references exactly one template by name. The scope is opaque to
/// this crate (a project id, for instance).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    /// Namespace the binding lives in
    pub namespace: String,
    /// Binding name
    pub name: String,
    /// Name of the referenced template
    pub template_name: String,
    /// Scope the template is granted in
    pub scope: String,
}

impl Binding {
    /// Create a binding
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        template_name: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            template_name: template_name.into(),
            scope: scope.into(),
        }
    }

    /// Identity of this binding
    pub fn key(&self) -> BindingKey {
        BindingKey::new(self.namespace.clone(), self.name.clone())
    }
}

/// Entry of the cluster registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterDescriptor {
    /// Cluster name
    pub name: String,
}

impl ClusterDescriptor {
    /// Create a descriptor
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Remote-cluster object mirroring a template, named after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirroredPermission {
    /// Object name, equal to the template name
    pub name: String,
}

impl MirroredPermission {
    /// Create a mirrored object reference
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
