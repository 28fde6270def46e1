//! Error types used by the savevisor runtime and save components.
//!
//! This module defines the error enums of a save cycle:
//!
//! - [`SaveError`]: errors raised by a single component save (or by the commit step).
//! - [`CycleError`]: control-flow signal surfaced by [`SaveOrchestrator::save`](crate::SaveOrchestrator::save).
//! - [`CleanupError`]: failures of the stale-data cleanup pass (always swallowed).
//! - [`ContextError`]: a scheduling context could not run a group task.
//!
//! Types with a stable label provide `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// Boxed error returned by external storage collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Errors produced by a component save.
///
/// Every variant except [`SaveError::Canceled`] is isolated: it is recorded into the
/// cycle's [`SaveResult`](crate::SaveResult) and the group continues with the next component.
/// `Canceled` aborts the group and surfaces as [`CycleError::Canceled`].
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum SaveError {
    /// The component failed to persist its state.
    #[error("save failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The component did not finish within the configured per-component timeout.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The component panicked while saving.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The enclosing save cycle was cancelled.
    #[error("save cancelled")]
    Canceled,
}

impl SaveError {
    /// Shorthand for [`SaveError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        SaveError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use savevisor::SaveError;
    /// use std::time::Duration;
    ///
    /// let err = SaveError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "save_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SaveError::Fail { .. } => "save_failed",
            SaveError::Timeout { .. } => "save_timeout",
            SaveError::Panicked { .. } => "save_panicked",
            SaveError::Canceled => "save_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SaveError::Fail { error } => format!("error: {error}"),
            SaveError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            SaveError::Panicked { info } => format!("panic: {info}"),
            SaveError::Canceled => "cycle cancelled".to_string(),
        }
    }

    /// Indicates whether this error is the cancellation signal rather than a failure.
    ///
    /// ```
    /// use savevisor::SaveError;
    ///
    /// assert!(SaveError::Canceled.is_cancellation());
    /// assert!(!SaveError::fail("disk full").is_cancellation());
    /// ```
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SaveError::Canceled)
    }
}

/// # Control-flow errors of a save cycle.
///
/// Component and cleanup failures never show up here; they are collected.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// The cycle was cancelled; the commit step did not run to completion.
    #[error("save cycle cancelled")]
    Canceled,
}

impl CycleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CycleError::Canceled => "cycle_canceled",
        }
    }
}

/// # Errors produced by the stale-data cleanup pass.
///
/// These are logged and swallowed by the orchestrator; they never abort the commit step.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CleanupError {
    /// The session producer refused to clear a component's state.
    #[error("failed to clear state of {component:?} in {file:?}: {source}")]
    ClearFailed {
        /// File identifier of the storage.
        file: String,
        /// Name of the stale component.
        component: String,
        /// Error reported by the storage.
        #[source]
        source: BoxError,
    },

    /// The cleanup pass panicked.
    #[error("cleanup panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl CleanupError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CleanupError::ClearFailed { .. } => "cleanup_clear_failed",
            CleanupError::Panicked { .. } => "cleanup_panicked",
        }
    }
}

/// # Errors produced by a scheduling context.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The context no longer accepts work (its executor has shut down).
    #[error("scheduling context closed")]
    Closed,

    /// The job was accepted but never produced a result (panic or executor shutdown).
    #[error("scheduled job lost before completion")]
    Lost,
}

/// Renders a panic payload the way it is reported in events and errors.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(SaveError::fail("x").as_label(), "save_failed");
        assert_eq!(
            SaveError::Panicked { info: "boom".into() }.as_label(),
            "save_panicked"
        );
        assert_eq!(SaveError::Canceled.as_label(), "save_canceled");
        assert_eq!(CycleError::Canceled.as_label(), "cycle_canceled");
    }

    #[test]
    fn clear_failed_keeps_source() {
        let err = CleanupError::ClearFailed {
            file: "workspace.xml".into(),
            component: "RunManager".into(),
            source: "read-only".into(),
        };
        assert_eq!(err.as_label(), "cleanup_clear_failed");
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("RunManager"));
    }

    #[test]
    fn panic_message_handles_payload_kinds() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
