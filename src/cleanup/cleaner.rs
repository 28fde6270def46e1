//! # Stale-data cleaner.
//!
//! ## Flow
//! ```text
//! for descriptor in snapshot:
//!   ├─ descriptor.project_level != project_level → skip (no lookup)
//!   ├─ resolver.resolve(file) == None            → skip (already clean)
//!   ├─ storage.session_producer() == None        → skip
//!   └─ for component in descriptor.components:
//!         producer.clear_state(component)
//!           ├─ Ok  → cleared
//!           └─ Err → CleanupError::ClearFailed, continue
//! ```

use std::sync::Arc;

use crate::cleanup::descriptor::StaleStorageDescriptor;
use crate::cleanup::storage::StorageResolver;
use crate::error::CleanupError;

/// A component state removed by a cleanup pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearedState {
    /// Storage file identifier.
    pub file: String,
    /// Component whose state was removed.
    pub component: String,
}

/// Result of one cleanup pass.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Number of descriptors whose file resolved to a storage.
    pub resolved: usize,
    /// States removed, in descriptor order.
    pub cleared: Vec<ClearedState>,
    /// Failures; the pass continued past each of them.
    pub failures: Vec<CleanupError>,
}

/// Deletes persisted state of components that no longer exist.
#[derive(Clone)]
pub struct StaleDataCleaner {
    resolver: Arc<dyn StorageResolver>,
}

impl StaleDataCleaner {
    /// Creates a cleaner resolving files through `resolver`.
    pub fn new(resolver: Arc<dyn StorageResolver>) -> Self {
        Self { resolver }
    }

    /// Runs one cleanup pass over `descriptors` for the given scope.
    pub fn clean(
        &self,
        descriptors: &[StaleStorageDescriptor],
        project_level: bool,
    ) -> CleanupReport {
        let mut report = CleanupReport::default();

        for descriptor in descriptors {
            if descriptor.project_level != project_level {
                continue;
            }
            let Some(storage) = self.resolver.resolve(&descriptor.file) else {
                continue;
            };
            report.resolved += 1;
            let Some(producer) = storage.session_producer() else {
                continue;
            };

            for component in &descriptor.components {
                match producer.clear_state(component) {
                    Ok(()) => report.cleared.push(ClearedState {
                        file: descriptor.file.clone(),
                        component: component.clone(),
                    }),
                    Err(source) => report.failures.push(CleanupError::ClearFailed {
                        file: descriptor.file.clone(),
                        component: component.clone(),
                        source,
                    }),
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::storage::{SessionProducer, Storage};
    use crate::error::BoxError;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Calls {
        resolved: Mutex<Vec<String>>,
        cleared: Mutex<Vec<String>>,
    }

    struct FakeResolver {
        calls: Arc<Calls>,
        known: Vec<&'static str>,
        with_producer: bool,
    }

    struct FakeStorage {
        calls: Arc<Calls>,
        with_producer: bool,
    }

    struct FakeProducer {
        calls: Arc<Calls>,
    }

    impl StorageResolver for FakeResolver {
        fn resolve(&self, file: &str) -> Option<Arc<dyn Storage>> {
            self.calls.resolved.lock().push(file.to_string());
            self.known.iter().any(|k| *k == file).then(|| {
                Arc::new(FakeStorage {
                    calls: Arc::clone(&self.calls),
                    with_producer: self.with_producer,
                }) as Arc<dyn Storage>
            })
        }
    }

    impl Storage for FakeStorage {
        fn session_producer(&self) -> Option<Arc<dyn SessionProducer>> {
            self.with_producer.then(|| {
                Arc::new(FakeProducer {
                    calls: Arc::clone(&self.calls),
                }) as Arc<dyn SessionProducer>
            })
        }
    }

    impl SessionProducer for FakeProducer {
        fn clear_state(&self, component: &str) -> Result<(), BoxError> {
            if component == "locked" {
                return Err("file is read-only".into());
            }
            self.calls.cleared.lock().push(component.to_string());
            Ok(())
        }
    }

    fn cleaner(known: Vec<&'static str>, with_producer: bool) -> (StaleDataCleaner, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let resolver = FakeResolver {
            calls: Arc::clone(&calls),
            known,
            with_producer,
        };
        (StaleDataCleaner::new(Arc::new(resolver)), calls)
    }

    #[test]
    fn only_matching_scope_is_resolved() {
        let (cleaner, calls) = cleaner(vec!["app.xml", "workspace.xml"], true);
        let descriptors = vec![
            StaleStorageDescriptor::new("app.xml", ["y"], false),
            StaleStorageDescriptor::new("workspace.xml", ["x"], true),
        ];

        let report = cleaner.clean(&descriptors, true);

        assert_eq!(*calls.resolved.lock(), ["workspace.xml"]);
        assert_eq!(*calls.cleared.lock(), ["x"]);
        assert_eq!(report.resolved, 1);
        assert_eq!(
            report.cleared,
            [ClearedState {
                file: "workspace.xml".into(),
                component: "x".into()
            }]
        );
    }

    #[test]
    fn unknown_file_and_missing_producer_are_skipped_silently() {
        let (cleaner, calls) = cleaner(vec!["known.xml"], false);
        let descriptors = vec![
            StaleStorageDescriptor::new("gone.xml", ["a"], false),
            StaleStorageDescriptor::new("known.xml", ["b"], false),
        ];

        let report = cleaner.clean(&descriptors, false);

        assert_eq!(*calls.resolved.lock(), ["gone.xml", "known.xml"]);
        assert!(calls.cleared.lock().is_empty());
        assert_eq!(report.resolved, 1);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn failing_component_does_not_stop_the_pass() {
        let (cleaner, calls) = cleaner(vec!["other.xml"], true);
        let descriptors = vec![StaleStorageDescriptor::new(
            "other.xml",
            ["alpha", "locked", "zulu"],
            false,
        )];

        let report = cleaner.clean(&descriptors, false);

        assert_eq!(*calls.cleared.lock(), ["alpha", "zulu"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].as_label(), "cleanup_clear_failed");
    }
}
