//! Trellis Core - shared vocabulary for the cascading binding reconciler
//!
//! This crate defines the types every other Trellis crate speaks in. It has no
//! runtime behaviour of its own.
//!
//! # Contents
//!
//! - **Types**: `Template`, `Binding`, `BindingKey`, `ClusterDescriptor`,
//!   `MirroredPermission`
//! - **Errors**: the classified error taxonomy (`RemoteError`, `CascadeError`,
//!   `AggregateError`, ...)
//! - **Effects**: async collaborator interfaces at the boundary to the object
//!   store, the binding scheduler and the cluster fleet
//! - **Config**: `CascadeConfig`, loadable from TOML

#![forbid(unsafe_code)]

/// Domain types for templates, bindings and the fleet
pub mod types;

/// Classified error taxonomy
pub mod errors;

/// Collaborator interfaces consumed by the index and reconciler
pub mod effects;

/// Reconciler configuration
pub mod config;

pub use config::CascadeConfig;
pub use effects::{
    BindingLookup, BindingScheduler, ClusterContextProvider, ClusterRegistry, PermissionStore,
};
pub use errors::{
    AggregateError, CascadeError, CascadeResult, CleanupStage, ClusterFailure, ConfigError,
    IndexError, RemoteError, SchedulerError,
};
pub use types::{
    Binding, BindingKey, ClusterDescriptor, MirroredPermission, Template,
    BINDING_BY_TEMPLATE_INDEX, LIFECYCLE_NAME,
};
