//! # Function-backed save component (`SaveFn`)
//!
//! [`SaveFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a fresh
//! future per save. Shared state goes into an explicit `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use savevisor::{ComponentRef, SaveError, SaveFn};
//!
//! let c: ComponentRef = SaveFn::arc("editor-state", |_ctx: CancellationToken| async move {
//!     // flush state...
//!     Ok::<_, SaveError>(())
//! });
//!
//! assert_eq!(c.name(), "editor-state");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::components::component::SaveComponent;
use crate::error::SaveError;

/// Function-backed component implementation.
#[derive(Debug)]
pub struct SaveFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SaveFn<F> {
    /// Creates a new function-backed component.
    ///
    /// Prefer [`SaveFn::arc`] when you immediately need a [`ComponentRef`](crate::ComponentRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the component and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> SaveComponent for SaveFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SaveError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn save(&self, ctx: CancellationToken) -> Result<(), SaveError> {
        (self.f)(ctx).await
    }
}
