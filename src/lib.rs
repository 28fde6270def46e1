//! # savevisor
//!
//! **Savevisor** coordinates persistence of state scattered across many
//! independently registered components.
//!
//! It provides a single-flight, two-phase save cycle: every registered
//! component saves (UI-bound and background groups concurrently, failures
//! isolated per component), then stale persisted state is cleaned up and a
//! commit step finalizes the result.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   lifecycle registrar ──► Registry::register(component, capability)
//!                              ├─ UiBound    [A, B, C, ...]  (append-only)
//!                              └─ Background [X, Y, ...]     (append-only)
//!
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  SaveOrchestrator                                                 │
//! │  - SaveGuard (single-flight admission)                            │
//! │  - UiContext (FIFO, serialized) / BackgroundContext (worker pool) │
//! │  - StaleDataCleaner + DescriptorSource                            │
//! │  - Commit collaborator                                            │
//! │  - Bus ──► SubscriberSet ──► LogWriter / custom subscribers       │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! save(force_all, errors, ctx)
//!   ├─► guard busy? ─► Rejected (logged, dropped)
//!   ├─► Phase 1:  UiContext: A → B → C      BackgroundContext: X → Y
//!   │             (failures collected, siblings continue; both joined)
//!   ├─► Phase 2:  stale cleanup (failures swallowed) → commit(errors, force_all)
//!   └─► guard released on every path
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                          |
//! |-------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Components**    | Define save-capable components as types or closures.     | [`SaveComponent`], [`SaveFn`], [`Capability`] |
//! | **Orchestration** | Single-flight two-phase save cycles.                     | [`SaveOrchestrator`], [`SaveOutcome`]       |
//! | **Errors**        | Collected failures and typed control-flow errors.        | [`SaveResult`], [`SaveError`], [`CycleError`] |
//! | **Cleanup**       | Remove persisted state of vanished components.           | [`StaleDataCleaner`], [`StaleStorageDescriptor`] |
//! | **Subscriber API**| Hook into cycle events (logging, metrics).               | [`Subscribe`], [`Event`]                    |
//! | **Configuration** | Centralize runtime settings.                             | [`SaveConfig`]                              |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], rendering events through `tracing`.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use savevisor::{
//!     Capability, CommitFn, ComponentRef, SaveConfig, SaveError, SaveFn, SaveOrchestrator,
//!     SaveOutcome, SaveResult,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let commit = CommitFn::arc(|_force: bool, _ctx: CancellationToken| async {
//!         Ok::<_, SaveError>(())
//!     });
//!     let orchestrator = SaveOrchestrator::builder(SaveConfig::default(), commit).build();
//!
//!     let layout: ComponentRef = SaveFn::arc("window-layout", |_ctx: CancellationToken| async {
//!         Ok::<_, SaveError>(())
//!     });
//!     orchestrator.registry().register(layout, Capability::UiBound);
//!
//!     let errors = SaveResult::new();
//!     let outcome = orchestrator.save(false, &errors, &CancellationToken::new()).await?;
//!
//!     assert!(matches!(outcome, SaveOutcome::Completed(s) if s.saved == 1));
//!     assert!(errors.is_empty());
//!     Ok(())
//! }
//! ```
mod cleanup;
mod commit;
mod components;
mod config;
mod core;
mod error;
mod events;
mod subscribers;

// ---- Public re-exports ----

pub use cleanup::{
    ClearedState, CleanupReport, DescriptorSource, SessionProducer, StaleDataCleaner,
    StaleStorageDescriptor, StaticDescriptors, Storage, StorageResolver,
};
pub use commit::{Commit, CommitFn};
pub use components::{Capability, ComponentRef, SaveComponent, SaveFn};
pub use config::SaveConfig;
pub use crate::core::{
    BackgroundContext, CycleSummary, OwnedSavePermit, Registry, SaveFailure, SaveGuard,
    SaveOrchestrator, SaveOrchestratorBuilder, SaveOutcome, SavePermit, SaveResult, UiContext,
};
pub use error::{BoxError, CleanupError, ContextError, CycleError, SaveError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: built-in tracing-backed subscriber.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
