//! Runtime core: registry, admission and the save protocol.
//!
//! The public API from this module is [`SaveOrchestrator`] and the building
//! blocks it is made of.
//!
//! Internal modules:
//! - [`registry`]: append-only two-group component registry;
//! - [`guard`]: single-flight admission with scoped release;
//! - [`collector`]: thread-safe failure aggregation;
//! - [`context`]: UI and background scheduling contexts;
//! - [`group`]: runs one group of a save cycle;
//! - [`orchestrator`]: the two-phase save protocol;
//! - [`builder`]: wiring of collaborators, contexts and subscribers.

mod builder;
mod collector;
mod context;
mod group;
mod guard;
mod orchestrator;
mod registry;

pub use builder::SaveOrchestratorBuilder;
pub use collector::{SaveFailure, SaveResult};
pub use context::{BackgroundContext, UiContext};
pub use guard::{OwnedSavePermit, SaveGuard, SavePermit};
pub use orchestrator::{CycleSummary, SaveOrchestrator, SaveOutcome};
pub use registry::Registry;
