//! Contracts of the storage machinery consumed by the cleanup pass.
//!
//! Implementations handle their own concurrency; the cleaner only calls them
//! from one cleanup pass at a time.

use std::sync::Arc;

use crate::error::BoxError;

/// Resolves storage file identifiers.
pub trait StorageResolver: Send + Sync + 'static {
    /// Returns the storage for `file`, or `None` if it is unknown.
    fn resolve(&self, file: &str) -> Option<Arc<dyn Storage>>;
}

/// One persisted storage file.
pub trait Storage: Send + Sync {
    /// Returns the producer of the current save session, if the storage supports one.
    fn session_producer(&self) -> Option<Arc<dyn SessionProducer>>;
}

/// Writes component state into a storage during a save session.
pub trait SessionProducer: Send + Sync {
    /// Sets the persisted state of `component` to absent.
    fn clear_state(&self, component: &str) -> Result<(), BoxError>;
}
