//! # Component registry - append-only, two groups.
//!
//! Registration happens whenever a component initializes, possibly from several
//! threads at once, while a save cycle may be iterating the same groups.
//!
//! ## Architecture
//! ```text
//! register(c, UiBound)    ──► ArcSwap<Vec<ComponentRef>>  (ui_bound)
//! register(c, Background) ──► ArcSwap<Vec<ComponentRef>>  (background)
//!                                   │
//!                  save cycle ──► load_full() → Arc<Vec<..>> snapshot
//! ```
//!
//! ## Rules
//! - Append-only: components are never removed or reordered
//! - Insertion order = registration order
//! - `register` is lock-free (read-copy-update) and never blocks
//! - A snapshot never observes appends made after it was taken

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::components::{Capability, ComponentRef};

/// Concurrent, append-only collection of save components partitioned by [`Capability`].
pub struct Registry {
    ui_bound: ArcSwap<Vec<ComponentRef>>,
    background: ArcSwap<Vec<ComponentRef>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            ui_bound: ArcSwap::from_pointee(Vec::new()),
            background: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Appends `component` to the group selected by `capability`.
    ///
    /// Safe to call concurrently from any number of threads, including while a
    /// save cycle iterates a snapshot.
    pub fn register(&self, component: ComponentRef, capability: Capability) {
        self.group(capability).rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::clone(&component));
            next
        });
    }

    /// Returns the UI-bound group in registration order.
    pub fn ui_bound_components(&self) -> Arc<Vec<ComponentRef>> {
        self.ui_bound.load_full()
    }

    /// Returns the background group in registration order.
    pub fn background_components(&self) -> Arc<Vec<ComponentRef>> {
        self.background.load_full()
    }

    /// Returns the total number of registered components.
    pub fn len(&self) -> usize {
        self.ui_bound.load().len() + self.background.load().len()
    }

    /// Returns true if no component has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn group(&self, capability: Capability) -> &ArcSwap<Vec<ComponentRef>> {
        match capability {
            Capability::UiBound => &self.ui_bound,
            Capability::Background => &self.background,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::SaveFn;
    use crate::error::SaveError;
    use tokio_util::sync::CancellationToken;

    fn component(name: &'static str) -> ComponentRef {
        SaveFn::arc(name, |_ctx: CancellationToken| async { Ok::<_, SaveError>(()) })
    }

    fn names(group: &[ComponentRef]) -> Vec<String> {
        group.iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn keeps_registration_order_per_group() {
        let registry = Registry::new();
        registry.register(component("a"), Capability::UiBound);
        registry.register(component("x"), Capability::Background);
        registry.register(component("b"), Capability::UiBound);

        assert_eq!(names(&registry.ui_bound_components()), ["a", "b"]);
        assert_eq!(names(&registry.background_components()), ["x"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn snapshot_is_stable_under_append() {
        let registry = Registry::new();
        registry.register(component("a"), Capability::UiBound);

        let snapshot = registry.ui_bound_components();
        registry.register(component("b"), Capability::UiBound);

        assert_eq!(names(&snapshot), ["a"]);
        assert_eq!(names(&registry.ui_bound_components()), ["a", "b"]);
    }

    #[test]
    fn concurrent_registration_loses_nothing() {
        let registry = Arc::new(Registry::new());
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let capability = if t % 2 == 0 {
                        Capability::UiBound
                    } else {
                        Capability::Background
                    };
                    for _ in 0..50 {
                        registry.register(component("c"), capability);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(registry.ui_bound_components().len(), 200);
        assert_eq!(registry.background_components().len(), 200);
    }
}
