use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio_util::sync::CancellationToken;

use crate::{
    cleanup::{DescriptorSource, StaleDataCleaner, StaticDescriptors, StorageResolver},
    commit::Commit,
    config::SaveConfig,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

use super::{
    context::{BackgroundContext, UiContext},
    guard::SaveGuard,
    orchestrator::SaveOrchestrator,
    registry::Registry,
};

/// Builder for constructing a [`SaveOrchestrator`] with optional collaborators.
pub struct SaveOrchestratorBuilder {
    cfg: SaveConfig,
    commit: Arc<dyn Commit>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    registry: Option<Arc<Registry>>,
    cleaner: Option<StaleDataCleaner>,
    descriptors: Option<Arc<dyn DescriptorSource>>,
    ui: Option<UiContext>,
    background: Option<BackgroundContext>,
    guard: Option<Arc<SaveGuard>>,
}

impl SaveOrchestratorBuilder {
    /// Creates a new builder with the given configuration and commit collaborator.
    pub fn new(cfg: SaveConfig, commit: Arc<dyn Commit>) -> Self {
        Self {
            cfg,
            commit,
            subscribers: Vec::new(),
            registry: None,
            cleaner: None,
            descriptors: None,
            ui: None,
            background: None,
            guard: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Shares an existing registry (e.g. one the lifecycle registrar already fills).
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Enables stale-data cleanup through `resolver`, driven by `descriptors`.
    pub fn with_cleanup(
        mut self,
        resolver: Arc<dyn StorageResolver>,
        descriptors: Arc<dyn DescriptorSource>,
    ) -> Self {
        self.cleaner = Some(StaleDataCleaner::new(resolver));
        self.descriptors = Some(descriptors);
        self
    }

    /// Runs UI-bound components on `ui` instead of a freshly spawned context.
    pub fn with_ui_context(mut self, ui: UiContext) -> Self {
        self.ui = Some(ui);
        self
    }

    /// Runs background components on `background` instead of the current runtime.
    pub fn with_background_context(mut self, background: BackgroundContext) -> Self {
        self.background = Some(background);
        self
    }

    /// Shares a single-flight guard with other orchestrators, so that at most
    /// one save cycle runs across all of them.
    pub fn with_guard(mut self, guard: Arc<SaveGuard>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Builds and returns the orchestrator.
    ///
    /// Must be called from within a tokio runtime: the default contexts and the
    /// subscriber workers are spawned on it.
    pub fn build(self) -> Arc<SaveOrchestrator> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let shutdown = CancellationToken::new();

        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            subscriber_listener(&bus, subs, shutdown.clone());
        }

        let ui = self
            .ui
            .unwrap_or_else(|| UiContext::spawn(self.cfg.ui_queue_capacity_clamped()));
        let background = self.background.unwrap_or_else(BackgroundContext::current);

        Arc::new(SaveOrchestrator {
            cfg: self.cfg,
            bus,
            registry: self.registry.unwrap_or_default(),
            guard: self.guard.unwrap_or_default(),
            ui,
            background,
            commit: self.commit,
            cleaner: self.cleaner,
            descriptors: self
                .descriptors
                .unwrap_or_else(|| Arc::new(StaticDescriptors::default())),
            shutdown,
        })
    }
}

/// Forwards bus events to the subscriber set until `shutdown` fires.
///
/// On shutdown, events already on the bus are still delivered before the
/// subscriber workers are drained and stopped.
fn subscriber_listener(bus: &Bus, subs: SubscriberSet, shutdown: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => subs.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                _ = shutdown.cancelled() => {
                    loop {
                        match rx.try_recv() {
                            Ok(ev) => subs.emit(&ev),
                            Err(TryRecvError::Lagged(_)) => continue,
                            Err(_) => break,
                        }
                    }
                    break;
                }
            }
        }
        subs.shutdown().await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::error::SaveError;
    use crate::events::{Event, EventKind};
    use crate::{CommitFn, SaveResult};

    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().push(event.kind);
        }
    }

    fn noop_commit() -> Arc<dyn Commit> {
        CommitFn::arc(|_force: bool, _ctx: CancellationToken| async {
            Ok::<_, SaveError>(())
        })
    }

    #[tokio::test]
    async fn dropping_orchestrator_stops_subscriber_workers() {
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let orch = SaveOrchestrator::builder(SaveConfig::default(), noop_commit())
            .with_subscribers(vec![Arc::clone(&recorder) as Arc<dyn Subscribe>])
            .build();

        let errors = SaveResult::new();
        orch.save(false, &errors, &CancellationToken::new())
            .await
            .unwrap();
        drop(orch);

        // The worker owns the only other reference to the subscriber.
        let stopped = tokio::time::timeout(Duration::from_secs(1), async {
            while Arc::strong_count(&recorder) > 1 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(stopped.is_ok(), "subscriber worker still running");
        assert!(recorder.seen.lock().contains(&EventKind::CycleFinished));
    }

    #[tokio::test]
    async fn shared_guard_excludes_other_orchestrators() {
        let guard = Arc::new(SaveGuard::new());
        let first = SaveOrchestrator::builder(SaveConfig::default(), noop_commit())
            .with_guard(Arc::clone(&guard))
            .build();
        let second = SaveOrchestrator::builder(SaveConfig::default(), noop_commit())
            .with_guard(Arc::clone(&guard))
            .build();

        let held = guard.try_acquire().unwrap();
        assert!(first.is_saving());
        assert!(second.is_saving());

        let errors = SaveResult::new();
        let ctx = CancellationToken::new();
        assert!(second.save(false, &errors, &ctx).await.unwrap().is_rejected());

        drop(held);
        assert!(!first.save(false, &errors, &ctx).await.unwrap().is_rejected());
    }
}
