//! # Failure collection for one save cycle.
//!
//! [`SaveResult`] is the caller-owned, thread-safe, insertion-ordered list of
//! [`SaveFailure`]s. Group runners collect failures task-locally and the
//! orchestrator merges them after Phase 1; the commit step may append more.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::SaveError;

/// One non-fatal failure recorded during a save cycle.
#[derive(Debug, Clone)]
pub struct SaveFailure {
    /// Component name (or `"commit"` / a group label for non-component failures).
    pub source: Arc<str>,
    /// What went wrong.
    pub error: SaveError,
}

impl SaveFailure {
    /// Creates a new failure record.
    pub fn new(source: impl Into<Arc<str>>, error: SaveError) -> Self {
        Self {
            source: source.into(),
            error,
        }
    }
}

impl fmt::Display for SaveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// Thread-safe aggregator of failures encountered during a save cycle.
///
/// ## Example
/// ```
/// use savevisor::{SaveError, SaveResult};
///
/// let errors = SaveResult::new();
/// errors.add("workspace", SaveError::fail("read-only file"));
/// assert_eq!(errors.len(), 1);
/// assert_eq!(&*errors.failures()[0].source, "workspace");
/// ```
#[derive(Debug, Default)]
pub struct SaveResult {
    failures: Mutex<Vec<SaveFailure>>,
}

impl SaveResult {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one failure.
    pub fn push(&self, failure: SaveFailure) {
        self.failures.lock().push(failure);
    }

    /// Shorthand for `push(SaveFailure::new(source, error))`.
    pub fn add(&self, source: impl Into<Arc<str>>, error: SaveError) {
        self.push(SaveFailure::new(source, error));
    }

    /// Appends all failures, keeping their order.
    pub fn extend(&self, failures: impl IntoIterator<Item = SaveFailure>) {
        self.failures.lock().extend(failures);
    }

    /// Number of collected failures.
    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    /// Returns true if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }

    /// Returns a copy of the collected failures in insertion order.
    pub fn failures(&self) -> Vec<SaveFailure> {
        self.failures.lock().clone()
    }

    /// Consumes the collector and returns its failures.
    pub fn into_failures(self) -> Vec<SaveFailure> {
        self.failures.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let errors = SaveResult::new();
        errors.add("a", SaveError::fail("first"));
        errors.extend(vec![
            SaveFailure::new("b", SaveError::Canceled),
            SaveFailure::new("c", SaveError::fail("third")),
        ]);

        let sources: Vec<_> = errors
            .into_failures()
            .into_iter()
            .map(|f| f.source.to_string())
            .collect();
        assert_eq!(sources, ["a", "b", "c"]);
    }

    #[test]
    fn concurrent_pushes_are_all_recorded() {
        let errors = SaveResult::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        errors.add("c", SaveError::fail("x"));
                    }
                });
            }
        });
        assert_eq!(errors.len(), 400);
    }

    #[test]
    fn display_names_source() {
        let failure = SaveFailure::new("scheme-manager", SaveError::fail("disk full"));
        assert_eq!(failure.to_string(), "scheme-manager: save failed: disk full");
    }
}
