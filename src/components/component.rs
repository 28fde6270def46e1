//! # Save component abstraction.
//!
//! This module defines the [`SaveComponent`] trait (async, cancelable).
//! The common handle type is [`ComponentRef`], an `Arc<dyn SaveComponent>` suitable for
//! registering with the [`Registry`](crate::Registry) and sharing across save cycles.
//!
//! A component receives the cycle's [`CancellationToken`] and should return
//! [`SaveError::Canceled`] once it observes cancellation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::SaveError;

/// Shared handle to a save component.
///
/// Identity is `Arc` identity; components need no `Eq`/`Hash`.
pub type ComponentRef = Arc<dyn SaveComponent>;

/// # Unit of in-memory state that must be flushed to durable storage.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use savevisor::{SaveComponent, SaveError};
///
/// struct RecentFiles;
///
/// #[async_trait]
/// impl SaveComponent for RecentFiles {
///     fn name(&self) -> &str { "recent-files" }
///
///     async fn save(&self, ctx: CancellationToken) -> Result<(), SaveError> {
///         if ctx.is_cancelled() {
///             return Err(SaveError::Canceled);
///         }
///         // write state...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait SaveComponent: Send + Sync + 'static {
    /// Returns a stable, human-readable component name used in failure records and events.
    fn name(&self) -> &str;

    /// Flushes the component's state.
    ///
    /// Errors other than [`SaveError::Canceled`] are recorded and do not affect sibling components.
    async fn save(&self, ctx: CancellationToken) -> Result<(), SaveError>;
}
