//! # Runtime events emitted during save cycles.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Cycle events**: admission, cancellation and completion of a save cycle
//! - **Component events**: per-component outcome and per-group completion
//! - **Phase-2 events**: stale-data cleanup and commit
//! - **Subscriber events**: overflow and panic of subscriber workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, component
//! name, group, reasons and durations.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use savevisor::{Capability, Event, EventKind};
//!
//! let ev = Event::new(EventKind::ComponentFailed)
//!     .with_component("scheme-manager")
//!     .with_group(Capability::UiBound)
//!     .with_reason("disk full");
//!
//! assert_eq!(ev.kind, EventKind::ComponentFailed);
//! assert_eq!(ev.component.as_deref(), Some("scheme-manager"));
//! assert_eq!(ev.reason.as_deref(), Some("disk full"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::components::Capability;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `component` (subscriber name), `reason` (panic info).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `component` (subscriber name), `reason` ("full" / "closed").
    SubscriberOverflow,

    // === Cycle events ===
    /// The guard admitted a save cycle.
    ///
    /// Sets: `force`.
    CycleStarted,

    /// Another cycle was in progress; the request was dropped.
    CycleRejected,

    /// The cycle was cancelled and exited without (completing) the commit step.
    ///
    /// Sets: `elapsed_ms`.
    CycleCanceled,

    /// The cycle completed, possibly with collected failures.
    ///
    /// Sets: `elapsed_ms`, `count` (number of collected failures).
    CycleFinished,

    // === Component events ===
    /// A component saved successfully.
    ///
    /// Sets: `component`, `group`.
    ComponentSaved,

    /// A component save failed, timed out or panicked; the group continues.
    ///
    /// Sets: `component`, `group`, `reason`.
    ComponentFailed,

    /// A group finished iterating (completely or by cancellation).
    ///
    /// Sets: `group`, `count` (number of components saved).
    GroupFinished,

    // === Phase-2 events ===
    /// A stale component's persisted state was cleared.
    ///
    /// Sets: `file`, `component`.
    StateCleared,

    /// A cleanup step failed; the failure was swallowed.
    ///
    /// Sets: `reason`, optionally `file` and `component`.
    CleanupFailed,

    /// The commit collaborator is about to run.
    ///
    /// Sets: `force`.
    CommitStarting,

    /// The commit collaborator returned successfully.
    CommitFinished,

    /// The commit collaborator failed; the failure was collected.
    ///
    /// Sets: `reason`.
    CommitFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Component (or subscriber) name, if applicable.
    pub component: Option<Arc<str>>,
    /// Registry group, if applicable.
    pub group: Option<Capability>,
    /// Storage file identifier (cleanup events).
    pub file: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Whether the cycle was requested with `force_all`.
    pub force: Option<bool>,
    /// Generic counter (saved components, collected failures).
    pub count: Option<u32>,
    /// Elapsed time in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            component: None,
            group: None,
            file: None,
            reason: None,
            force: None,
            count: None,
            elapsed_ms: None,
        }
    }

    /// Attaches a component name.
    #[inline]
    pub fn with_component(mut self, component: impl Into<Arc<str>>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Attaches a registry group.
    #[inline]
    pub fn with_group(mut self, group: Capability) -> Self {
        self.group = Some(group);
        self
    }

    /// Attaches a storage file identifier.
    #[inline]
    pub fn with_file(mut self, file: impl Into<Arc<str>>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the `force_all` flag of the cycle.
    #[inline]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = Some(force);
        self
    }

    /// Attaches a counter (saturates at `u32::MAX`).
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// Attaches an elapsed duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.elapsed_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_component(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_component(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::CycleStarted);
        let b = Event::new(EventKind::CycleFinished);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn elapsed_and_count_saturate() {
        let ev = Event::new(EventKind::CycleFinished)
            .with_elapsed(Duration::from_secs(u64::MAX / 2))
            .with_count(usize::MAX);
        assert_eq!(ev.elapsed_ms, Some(u32::MAX));
        assert_eq!(ev.count, Some(u32::MAX));
    }
}
