//! # Single-flight save guard.
//!
//! At most one save cycle runs at a time. Entry is a compare-and-swap on a single
//! flag; a losing caller is rejected without side effects (never queued).
//!
//! ## Rules
//! - `try_enter` transitions idle → busy, or returns `false` if already busy
//! - `leave` unconditionally transitions busy → idle
//! - A permit calls `leave` on drop, covering success, failure and cancellation
//! - The orchestrator uses [`SaveGuard::try_acquire_owned`]; the permit is shared
//!   with both group tasks, so a dropped `save` future keeps the guard busy until
//!   the abandoned groups have stopped
//!
//! One guard is scoped to one orchestrator. Orchestrators that must exclude each
//! other share a guard through
//! [`SaveOrchestratorBuilder::with_guard`](crate::SaveOrchestratorBuilder::with_guard).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Busy flag for save cycles.
#[derive(Debug, Default)]
pub struct SaveGuard {
    busy: AtomicBool,
}

impl SaveGuard {
    /// Creates an idle guard.
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Atomically marks the guard busy. Returns `false` if it already was.
    pub fn try_enter(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Marks the guard idle.
    pub fn leave(&self) {
        self.busy.store(false, Ordering::Release);
    }

    /// Scoped form of [`try_enter`](Self::try_enter): the permit leaves on drop.
    #[must_use = "dropping the permit immediately releases the guard"]
    pub fn try_acquire(&self) -> Option<SavePermit<'_>> {
        self.try_enter().then_some(SavePermit { guard: self })
    }

    /// Owned form of [`try_acquire`](Self::try_acquire) for permits that
    /// outlive the borrow, e.g. when moved into spawned tasks.
    #[must_use = "dropping the permit immediately releases the guard"]
    pub fn try_acquire_owned(self: &Arc<Self>) -> Option<OwnedSavePermit> {
        self.try_enter().then(|| OwnedSavePermit {
            guard: Arc::clone(self),
        })
    }

    /// Returns true while a cycle holds the guard.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof of admission; releases the [`SaveGuard`] when dropped.
#[derive(Debug)]
pub struct SavePermit<'a> {
    guard: &'a SaveGuard,
}

impl Drop for SavePermit<'_> {
    fn drop(&mut self) {
        self.guard.leave();
    }
}

/// Owned [`SavePermit`]; releases the shared [`SaveGuard`] when dropped.
#[derive(Debug)]
pub struct OwnedSavePermit {
    guard: Arc<SaveGuard>,
}

impl Drop for OwnedSavePermit {
    fn drop(&mut self) {
        self.guard.leave();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_entry_is_rejected_until_leave() {
        let guard = SaveGuard::new();
        assert!(!guard.is_busy());
        assert!(guard.try_enter());
        assert!(!guard.try_enter());
        guard.leave();
        assert!(guard.try_enter());
    }

    #[test]
    fn permit_releases_on_drop() {
        let guard = SaveGuard::new();
        {
            let permit = guard.try_acquire();
            assert!(permit.is_some());
            assert!(guard.try_acquire().is_none());
            assert!(guard.is_busy());
        }
        assert!(!guard.is_busy());
    }

    #[test]
    fn permit_releases_on_unwind() {
        let guard = SaveGuard::new();
        let result = std::panic::catch_unwind(|| {
            let _permit = guard.try_acquire();
            panic!("cycle blew up");
        });
        assert!(result.is_err());
        assert!(!guard.is_busy());
    }

    #[test]
    fn owned_permit_held_by_clones_until_last_drop() {
        let guard = Arc::new(SaveGuard::new());
        let permit = Arc::new(guard.try_acquire_owned().unwrap());
        let worker = Arc::clone(&permit);

        drop(permit);
        assert!(guard.is_busy());
        assert!(guard.try_acquire_owned().is_none());

        drop(worker);
        assert!(!guard.is_busy());
        assert!(guard.try_acquire_owned().is_some());
    }

    #[test]
    fn exactly_one_thread_wins() {
        let guard = SaveGuard::new();
        let winners = std::thread::scope(|s| {
            let handles: Vec<_> = (0..16).map(|_| s.spawn(|| guard.try_enter())).collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or(false))
                .filter(|won| *won)
                .count()
        });
        assert_eq!(winners, 1);
    }
}
