//! # LogWriter: event renderer backed by `tracing`
//!
//! A subscriber that renders incoming [`Event`]s as `tracing` records.
//! Failures are emitted at `WARN`, cycle boundaries at `INFO`, per-component
//! progress at `DEBUG`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO  savevisor: save cycle started force=false
//! WARN  savevisor: component save failed component="scheme-manager" group=ui_bound reason="disk full"
//! WARN  savevisor: save cycle rejected, another cycle is in progress
//! INFO  savevisor: save cycle finished elapsed_ms=12 failures=1
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let component = e.component.as_deref().unwrap_or("-");
        let group = e.group.map(|g| g.as_label()).unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let file = e.file.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::CycleStarted => {
                tracing::info!(target: "savevisor", force = ?e.force, "save cycle started");
            }
            EventKind::CycleRejected => {
                tracing::warn!(target: "savevisor", "save cycle rejected, another cycle is in progress");
            }
            EventKind::CycleCanceled => {
                tracing::info!(target: "savevisor", elapsed_ms = ?e.elapsed_ms, "save cycle cancelled");
            }
            EventKind::CycleFinished => {
                tracing::info!(target: "savevisor", elapsed_ms = ?e.elapsed_ms, failures = ?e.count, "save cycle finished");
            }
            EventKind::ComponentSaved => {
                tracing::debug!(target: "savevisor", component, group, "component saved");
            }
            EventKind::ComponentFailed => {
                tracing::warn!(target: "savevisor", component, group, reason, "component save failed");
            }
            EventKind::GroupFinished => {
                tracing::debug!(target: "savevisor", group, saved = ?e.count, "group finished");
            }
            EventKind::StateCleared => {
                tracing::debug!(target: "savevisor", file, component, "stale state cleared");
            }
            EventKind::CleanupFailed => {
                tracing::warn!(target: "savevisor", file, component, reason, "stale state cleanup failed");
            }
            EventKind::CommitStarting => {
                tracing::debug!(target: "savevisor", force = ?e.force, "commit starting");
            }
            EventKind::CommitFinished => {
                tracing::debug!(target: "savevisor", "commit finished");
            }
            EventKind::CommitFailed => {
                tracing::warn!(target: "savevisor", reason, "commit failed");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "savevisor", subscriber = component, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!(target: "savevisor", subscriber = component, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
