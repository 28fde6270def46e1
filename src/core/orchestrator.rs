//! # SaveOrchestrator: single-flight, two-phase save cycles.
//!
//! The [`SaveOrchestrator`] owns the registry, the guard, the scheduling
//! contexts, the event bus and the Phase-2 collaborators.
//!
//! ## Save cycle
//! ```text
//! save(force_all, errors, ctx)
//!   ├─► guard.try_acquire_owned()
//!   │     └─ busy → warn + CycleRejected → Ok(Rejected)
//!   ├─► publish CycleStarted; cycle = ctx.child_token() (cancelled on drop)
//!   │
//!   ├─► Phase 1 (structured, both groups concurrently, each holding the permit):
//!   │     ├─ UiContext::run(run_group(UiBound snapshot))
//!   │     └─ BackgroundContext::run(run_group(Background snapshot))
//!   │     join both → merge failures into `errors`
//!   │     any group cancelled / cycle cancelled → CycleCanceled → Err(Canceled)
//!   │
//!   ├─► Phase 2 (sequential):
//!   │     ├─ stale cleanup (spawn_blocking; failures logged and swallowed)
//!   │     ├─ cycle cancelled → CycleCanceled → Err(Canceled)
//!   │     └─ commit(errors, force_all, cycle) exactly once
//!   │
//!   └─► publish CycleFinished → Ok(Completed(summary))
//! ```
//!
//! If the `save` future is dropped mid-cycle, the cycle token is cancelled and
//! the guard stays busy until both group tasks have observed it and returned.
//!
//! ## Rules
//! - Within a group saves are sequential in registration order
//! - No ordering between the two groups; Phase 2 starts only after both finished
//! - Component and cleanup failures never abort the cycle
//! - Cancellation is never recorded as a failure

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::cleanup::{DescriptorSource, StaleDataCleaner};
use crate::commit::Commit;
use crate::components::Capability;
use crate::config::SaveConfig;
use crate::core::builder::SaveOrchestratorBuilder;
use crate::core::collector::{SaveFailure, SaveResult};
use crate::core::context::{BackgroundContext, UiContext};
use crate::core::group::{GroupReport, run_group};
use crate::core::guard::{OwnedSavePermit, SaveGuard};
use crate::core::registry::Registry;
use crate::error::{CleanupError, CycleError, SaveError, panic_message};
use crate::events::{Bus, Event, EventKind};

/// Statistics of a completed save cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    /// Components that saved successfully.
    pub saved: usize,
    /// Failures collected during this cycle (components and commit).
    pub failed: usize,
    /// Stale component states removed by the cleanup pass.
    pub cleared: usize,
    /// Wall-clock duration of the cycle.
    pub elapsed: Duration,
}

/// What happened to a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The cycle ran both phases.
    Completed(CycleSummary),
    /// Another cycle was in progress; nothing was saved.
    Rejected,
}

impl SaveOutcome {
    /// Returns true if the request was dropped by the guard.
    pub fn is_rejected(&self) -> bool {
        matches!(self, SaveOutcome::Rejected)
    }
}

/// Coordinates save cycles over the registered components.
///
/// Single-flight admission is per guard: orchestrators built independently
/// do not exclude each other unless they share one through
/// [`SaveOrchestratorBuilder::with_guard`].
///
/// Dropping the orchestrator stops its subscriber workers.
pub struct SaveOrchestrator {
    pub(crate) cfg: SaveConfig,
    pub(crate) bus: Bus,
    pub(crate) registry: Arc<Registry>,
    pub(crate) guard: Arc<SaveGuard>,
    pub(crate) ui: UiContext,
    pub(crate) background: BackgroundContext,
    pub(crate) commit: Arc<dyn Commit>,
    pub(crate) cleaner: Option<StaleDataCleaner>,
    pub(crate) descriptors: Arc<dyn DescriptorSource>,
    pub(crate) shutdown: CancellationToken,
}

impl Drop for SaveOrchestrator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl SaveOrchestrator {
    /// Creates a builder; `commit` is the Phase-2 collaborator.
    pub fn builder(cfg: SaveConfig, commit: Arc<dyn Commit>) -> SaveOrchestratorBuilder {
        SaveOrchestratorBuilder::new(cfg, commit)
    }

    /// Registry the lifecycle registrar appends components to.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Returns true while a save cycle is running, including the groups of an
    /// abandoned cycle that have not stopped yet.
    pub fn is_saving(&self) -> bool {
        self.guard.is_busy()
    }

    /// Subscribes to runtime events published after this call.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Configuration the orchestrator was built with.
    pub fn config(&self) -> &SaveConfig {
        &self.cfg
    }

    /// Runs one save cycle.
    ///
    /// Failures are appended to `errors`; the caller reads them once this returns.
    /// `ctx` is the cooperative cancellation signal of the cycle; it is checked
    /// before every component, after cleanup and handed to the commit step.
    ///
    /// # Errors
    /// [`CycleError::Canceled`] if a component, the commit step or `ctx` signalled
    /// cancellation. A concurrent request is not an error: it returns
    /// [`SaveOutcome::Rejected`] without saving anything.
    pub async fn save(
        &self,
        force_all: bool,
        errors: &SaveResult,
        ctx: &CancellationToken,
    ) -> Result<SaveOutcome, CycleError> {
        let Some(permit) = self.guard.try_acquire_owned() else {
            tracing::warn!(target: "savevisor", force_all, "save already in progress, request dropped");
            self.bus.publish(Event::new(EventKind::CycleRejected));
            return Ok(SaveOutcome::Rejected);
        };

        let started = Instant::now();
        let baseline = errors.len();
        self.bus
            .publish(Event::new(EventKind::CycleStarted).with_force(force_all));

        let cycle = ctx.child_token();
        let _abandon = cycle.clone().drop_guard();
        let permit = Arc::new(permit);
        let (ui, background) = self.save_components(&cycle, &permit).await;
        let saved = ui.saved + background.saved;
        let canceled = ui.canceled || background.canceled;
        errors.extend(ui.failures);
        errors.extend(background.failures);

        if canceled || cycle.is_cancelled() {
            return Err(self.canceled(started));
        }

        let cleared = self.clean_stale_data().await;
        if cycle.is_cancelled() {
            return Err(self.canceled(started));
        }
        if self.run_commit(errors, force_all, &cycle).await.is_err() {
            return Err(self.canceled(started));
        }

        let summary = CycleSummary {
            saved,
            failed: errors.len().saturating_sub(baseline),
            cleared,
            elapsed: started.elapsed(),
        };
        self.bus.publish(
            Event::new(EventKind::CycleFinished)
                .with_elapsed(summary.elapsed)
                .with_count(summary.failed),
        );
        Ok(SaveOutcome::Completed(summary))
    }

    /// Phase 1: both groups concurrently, each on its own context.
    ///
    /// Each group task owns a share of `permit`, so the guard is released only
    /// once both groups returned, even if this future is dropped first.
    async fn save_components(
        &self,
        cycle: &CancellationToken,
        permit: &Arc<OwnedSavePermit>,
    ) -> (GroupReport, GroupReport) {
        let timeout = self.cfg.timeout();

        let ui = self.ui.run(holding(
            Arc::clone(permit),
            run_group(
                Capability::UiBound,
                self.registry.ui_bound_components(),
                cycle.clone(),
                timeout,
                self.bus.clone(),
            ),
        ));
        let background = self.background.run(holding(
            Arc::clone(permit),
            run_group(
                Capability::Background,
                self.registry.background_components(),
                cycle.clone(),
                timeout,
                self.bus.clone(),
            ),
        ));

        let (ui, background) = tokio::join!(ui, background);
        (
            ui.unwrap_or_else(|e| GroupReport::lost(Capability::UiBound, e)),
            background.unwrap_or_else(|e| GroupReport::lost(Capability::Background, e)),
        )
    }

    /// Phase 2a: remove stale state; every failure is logged and swallowed.
    async fn clean_stale_data(&self) -> usize {
        let Some(cleaner) = self.cleaner.clone() else {
            return 0;
        };
        let descriptors = self.descriptors.descriptors();
        if descriptors.is_empty() {
            return 0;
        }
        let project_level = self.cfg.project_level;

        let pass =
            tokio::task::spawn_blocking(move || cleaner.clean(&descriptors, project_level)).await;
        let report = match pass {
            Ok(report) => report,
            Err(join_err) => {
                let info = match join_err.try_into_panic() {
                    Ok(panic) => panic_message(panic.as_ref()),
                    Err(join_err) => join_err.to_string(),
                };
                self.report_cleanup_failure(&CleanupError::Panicked { info }, None, None);
                return 0;
            }
        };

        for failure in &report.failures {
            let (file, component) = match failure {
                CleanupError::ClearFailed {
                    file, component, ..
                } => (Some(file.as_str()), Some(component.as_str())),
                _ => (None, None),
            };
            self.report_cleanup_failure(failure, file, component);
        }
        for state in &report.cleared {
            self.bus.publish(
                Event::new(EventKind::StateCleared)
                    .with_file(state.file.as_str())
                    .with_component(state.component.as_str()),
            );
        }
        report.cleared.len()
    }

    fn report_cleanup_failure(
        &self,
        failure: &CleanupError,
        file: Option<&str>,
        component: Option<&str>,
    ) {
        tracing::warn!(target: "savevisor", error = %failure, label = failure.as_label(), "stale data cleanup failed");
        let mut ev = Event::new(EventKind::CleanupFailed).with_reason(failure.to_string());
        if let Some(file) = file {
            ev = ev.with_file(file);
        }
        if let Some(component) = component {
            ev = ev.with_component(component);
        }
        self.bus.publish(ev);
    }

    /// Phase 2b: commit once; only cancellation escapes as an error.
    async fn run_commit(
        &self,
        errors: &SaveResult,
        force_all: bool,
        cycle: &CancellationToken,
    ) -> Result<(), CycleError> {
        self.bus
            .publish(Event::new(EventKind::CommitStarting).with_force(force_all));

        let res = AssertUnwindSafe(self.commit.commit(errors, force_all, cycle.clone()))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(SaveError::Panicked {
                    info: panic_message(panic.as_ref()),
                })
            });

        match res {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::CommitFinished));
                Ok(())
            }
            Err(SaveError::Canceled) => Err(CycleError::Canceled),
            Err(e) => {
                self.bus.publish(
                    Event::new(EventKind::CommitFailed).with_reason(e.to_string()),
                );
                errors.push(SaveFailure::new("commit", e));
                Ok(())
            }
        }
    }

    fn canceled(&self, started: Instant) -> CycleError {
        self.bus
            .publish(Event::new(EventKind::CycleCanceled).with_elapsed(started.elapsed()));
        CycleError::Canceled
    }
}

/// Runs `fut` while keeping `permit` alive.
async fn holding<F: Future>(permit: Arc<OwnedSavePermit>, fut: F) -> F::Output {
    let out = fut.await;
    drop(permit);
    out
}
