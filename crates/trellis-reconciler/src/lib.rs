//! # Trellis Reconciler - template lifecycle handling
//!
//! Reacts to template lifecycle events:
//!
//! - **Created / Updated**: every binding referencing the template is
//!   re-enqueued for independent reconciliation.
//! - **Removed**: the template's mirrored permission object is deleted from
//!   every reachable cluster in the fleet. Failures are collected per cluster
//!   and reported together; unreachable clusters and already-absent objects
//!   are not failures.
//!
//! The reconciler only schedules binding work and attempts remote deletes.
//! Retrying a failed removal is left to the controller runtime; every step
//! tolerates "not found", so retries converge.

#![forbid(unsafe_code)]

pub mod lifecycle;
pub mod reconciler;
pub mod removal;

pub use lifecycle::{LifecycleOutcome, TemplateEvent, TemplateLifecycle};
pub use reconciler::CascadeReconciler;
pub use removal::RemovalSummary;
