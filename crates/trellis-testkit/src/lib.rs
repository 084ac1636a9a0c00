//! Trellis Testing Infrastructure
//!
//! In-memory stand-ins for every collaborator the reconciler talks to, plus
//! fixtures and proptest strategies shared by the workspace's tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```rust,no_run
//! use trellis_testkit::*;
//!
//! let fleet = InMemoryFleet::new();
//! fleet.add_cluster("c-a").with_mirror("c-a", "project-owner");
//! fleet.add_cluster("c-b").set_unreachable("c-b", true);
//! ```

pub mod fixtures;
pub mod fleet;
pub mod lookup;
pub mod scheduler;
pub mod strategies;

pub use fixtures::*;
pub use fleet::InMemoryFleet;
pub use lookup::{FailingLookup, StaticLookup};
pub use scheduler::RecordingScheduler;

/// Install a test-friendly tracing subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
