//! # Commit collaborator.
//!
//! The commit step persists the finalized component state once every save
//! component has run. It is invoked exactly once per completed Phase 1 and is
//! never re-entered concurrently by the orchestrator.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::SaveResult;
use crate::error::SaveError;

/// Finalizes and persists component state after the save phase.
///
/// Implementations may append their own failures to `errors`. `ctx` is the
/// cycle token: a long commit should watch it and return `Err(SaveError::Canceled)`,
/// which surfaces as [`CycleError::Canceled`](crate::CycleError::Canceled).
/// Any other error is recorded under the source `"commit"`.
#[async_trait]
pub trait Commit: Send + Sync + 'static {
    /// Commits the state; `force` mirrors the cycle's `force_all`.
    async fn commit(
        &self,
        errors: &SaveResult,
        force: bool,
        ctx: CancellationToken,
    ) -> Result<(), SaveError>;
}

/// Function-backed commit collaborator.
///
/// ```
/// use savevisor::{Commit, CommitFn, SaveError};
/// use tokio_util::sync::CancellationToken;
///
/// let commit = CommitFn::arc(|force: bool, ctx: CancellationToken| async move {
///     if ctx.is_cancelled() {
///         return Err(SaveError::Canceled);
///     }
///     // write storages...
///     let _ = force;
///     Ok(())
/// });
/// # let _: std::sync::Arc<dyn Commit> = commit;
/// ```
#[derive(Debug)]
pub struct CommitFn<F> {
    f: F,
}

impl<F> CommitFn<F> {
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps `f` into a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Commit for CommitFn<F>
where
    F: Fn(bool, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SaveError>> + Send + 'static,
{
    async fn commit(
        &self,
        _errors: &SaveResult,
        force: bool,
        ctx: CancellationToken,
    ) -> Result<(), SaveError> {
        (self.f)(force, ctx).await
    }
}
