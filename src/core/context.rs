//! # Scheduling contexts for the two component groups.
//!
//! - [`UiContext`]: one FIFO job queue drained by a single executor; every job
//!   (save groups and any other UI work submitted through [`UiContext::run`]) runs
//!   strictly after the previous one finished.
//! - [`BackgroundContext`]: a tokio runtime handle; jobs run on its worker pool.
//!
//! ## Architecture
//! ```text
//! UiContext::run(fut) ──► [mpsc queue] ──► drain loop: job.await; job.await; ...
//!        ▲                                     │
//!        └──────────── oneshot result ◄────────┘
//!
//! BackgroundContext::run(fut) ──► handle.spawn(fut) ──► JoinHandle
//! ```
//!
//! A panicking job is caught by the drain loop; its caller observes
//! [`ContextError::Lost`] and the queue keeps serving later jobs.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use crate::error::ContextError;

type UiJob = BoxFuture<'static, ()>;

/// Serialized, FIFO scheduling context standing in for the UI thread.
#[derive(Clone, Debug)]
pub struct UiContext {
    tx: mpsc::Sender<UiJob>,
}

impl UiContext {
    /// Starts a context drained by a task on the current tokio runtime.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(drain(rx));
        Self { tx }
    }

    /// Starts a context drained by a dedicated OS thread running its own
    /// current-thread runtime. The thread exits once every handle is dropped.
    pub fn on_thread(name: impl Into<String>, capacity: usize) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        std::thread::Builder::new()
            .name(name.into())
            .spawn(move || rt.block_on(drain(rx)))?;
        Ok(Self { tx })
    }

    /// Runs `fut` on the UI context after every previously submitted job.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ContextError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job: UiJob = Box::pin(async move {
            let _ = done_tx.send(fut.await);
        });
        self.tx.send(job).await.map_err(|_| ContextError::Closed)?;
        done_rx.await.map_err(|_| ContextError::Lost)
    }

    /// Returns true once the drain loop has stopped accepting jobs.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

async fn drain(mut rx: mpsc::Receiver<UiJob>) {
    while let Some(job) = rx.recv().await {
        let _ = AssertUnwindSafe(job).catch_unwind().await;
    }
}

/// Unordered worker-pool context for background components.
#[derive(Clone, Debug)]
pub struct BackgroundContext {
    handle: Handle,
}

impl BackgroundContext {
    /// Uses the runtime the caller is running on.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    /// Uses the given runtime handle.
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// Runs `fut` on the worker pool and waits for its output.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ContextError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.handle.spawn(fut).await.map_err(|_| ContextError::Lost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    #[tokio::test]
    async fn ui_jobs_run_in_submission_order_without_overlap() {
        let ui = UiContext::spawn(8);
        let log = Arc::new(Mutex::new(Vec::new()));

        let slow = {
            let log = Arc::clone(&log);
            ui.run(async move {
                log.lock().push("slow:start");
                tokio::time::sleep(Duration::from_millis(30)).await;
                log.lock().push("slow:end");
            })
        };
        let fast = {
            let log = Arc::clone(&log);
            ui.run(async move {
                log.lock().push("fast");
            })
        };
        let (a, b) = tokio::join!(slow, fast);
        a.unwrap();
        b.unwrap();

        assert_eq!(*log.lock(), ["slow:start", "slow:end", "fast"]);
    }

    #[tokio::test]
    async fn panicking_job_is_lost_but_queue_survives() {
        let ui = UiContext::spawn(4);
        let lost = ui.run::<_, ()>(async { panic!("ui job boom") }).await;
        assert_eq!(lost, Err(ContextError::Lost));

        assert_eq!(ui.run(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn dedicated_thread_context_runs_jobs() {
        let ui = UiContext::on_thread("ui-test", 4).unwrap();
        let name = ui
            .run(async { std::thread::current().name().map(str::to_string) })
            .await
            .unwrap();
        assert_eq!(name.as_deref(), Some("ui-test"));
    }

    #[tokio::test]
    async fn background_context_returns_output() {
        let bg = BackgroundContext::current();
        assert_eq!(bg.run(async { 1 + 1 }).await, Ok(2));
        assert_eq!(
            bg.run::<_, ()>(async { panic!("bg boom") }).await,
            Err(ContextError::Lost)
        );
    }
}
