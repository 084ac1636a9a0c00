//! # Trellis Index - template-to-binding reverse index
//!
//! Maintains "which bindings reference template T" as a materialized join over
//! the binding collection, kept current from a change feed instead of being
//! recomputed by full scan.
//!
//! ## Lifecycle
//!
//! 1. Built from the feed's replay (`BindingEvent::Restarted`) at startup
//! 2. Updated incrementally by `Applied` / `Deleted` events thereafter
//! 3. Dropped with its last `Arc` owner
//!
//! The index is never global state; callers own it and share it by `Arc`.

#![forbid(unsafe_code)]

pub mod feed;
pub mod index;

pub use feed::{apply_event, spawn_feed, BindingEvent, FeedObject};
pub use index::{template_keys, ReverseIndex};
