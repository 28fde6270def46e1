//! # Event subscribers for the savevisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`] (feature `logging`).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   SaveOrchestrator ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet
//!                                                                            │
//!                                                          ┌─────────┬───────┴───┐
//!                                                          ▼         ▼           ▼
//!                                                      LogWriter  Metrics     Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use savevisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ComponentFailed {
//!             // increment failure counter
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
