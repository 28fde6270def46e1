//! # Global runtime configuration.
//!
//! Provides [`SaveConfig`] centralized settings for the save orchestrator.
//!
//! ## Sentinel values
//! - `component_timeout = 0s` → no per-component timeout
//! - `bus_capacity = 0` / `ui_queue_capacity = 0` → clamped to 1

use std::time::Duration;

/// Global configuration for the save orchestrator.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `ui_queue_capacity`: Pending job capacity of the default UI context (min 1)
/// - `component_timeout`: Per-component save timeout (`0s` = no timeout)
/// - `project_level`: Cleanup scope; only descriptors with the same flag are processed
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct SaveConfig {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Capacity of the job queue of the UI context created by the builder.
    ///
    /// Ignored when a context is supplied with
    /// [`SaveOrchestratorBuilder::with_ui_context`](crate::SaveOrchestratorBuilder::with_ui_context).
    pub ui_queue_capacity: usize,

    /// Per-component save timeout.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = a slower component is recorded as [`SaveError::Timeout`](crate::SaveError::Timeout)
    pub component_timeout: Duration,

    /// Whether this orchestrator persists project-level (per-workspace) state.
    ///
    /// Selects which stale-data descriptors the cleanup pass acts on.
    pub project_level: bool,
}

impl SaveConfig {
    /// Returns the per-component timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → timeout applied per component save
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        if self.component_timeout == Duration::ZERO {
            None
        } else {
            Some(self.component_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a UI queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn ui_queue_capacity_clamped(&self) -> usize {
        self.ui_queue_capacity.max(1)
    }
}

impl Default for SaveConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `ui_queue_capacity = 256`
    /// - `component_timeout = 0s` (no timeout)
    /// - `project_level = false` (application-level cleanup scope)
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            ui_queue_capacity: 256,
            component_timeout: Duration::ZERO,
            project_level: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_means_none() {
        let cfg = SaveConfig::default();
        assert_eq!(cfg.timeout(), None);

        let cfg = SaveConfig {
            component_timeout: Duration::from_millis(250),
            ..SaveConfig::default()
        };
        assert_eq!(cfg.timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn capacities_are_clamped() {
        let cfg = SaveConfig {
            bus_capacity: 0,
            ui_queue_capacity: 0,
            ..SaveConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.ui_queue_capacity_clamped(), 1);
    }
}
