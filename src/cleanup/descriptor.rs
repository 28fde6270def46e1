//! # Stale-storage descriptors.
//!
//! A [`StaleStorageDescriptor`] names a storage file and the components whose
//! persisted state in it is obsolete. A [`DescriptorSource`] hands the cleaner
//! one snapshot per pass; [`StaticDescriptors`] keeps that snapshot in an
//! `ArcSwap` so an external discovery step can [`replace`](StaticDescriptors::replace)
//! it without blocking a running cycle.

use std::collections::BTreeSet;
use std::sync::Arc;

use arc_swap::ArcSwap;

/// Persisted state that may belong to components which no longer exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleStorageDescriptor {
    /// Storage file identifier.
    pub file: String,
    /// Names of components whose state should be removed from that file.
    pub components: BTreeSet<String>,
    /// Whether the file belongs to project-level (per-workspace) storage.
    pub project_level: bool,
}

impl StaleStorageDescriptor {
    /// Creates a descriptor; duplicate component names collapse.
    pub fn new<I, S>(file: impl Into<String>, components: I, project_level: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            file: file.into(),
            components: components.into_iter().map(Into::into).collect(),
            project_level,
        }
    }
}

/// Read-only, ordered list of stale descriptors, refreshed externally.
///
/// The cleaner takes one snapshot per cleanup pass.
pub trait DescriptorSource: Send + Sync + 'static {
    /// Returns the current descriptors.
    fn descriptors(&self) -> Arc<Vec<StaleStorageDescriptor>>;
}

/// [`DescriptorSource`] holding an injected list that can be swapped atomically.
///
/// ```
/// use savevisor::{DescriptorSource, StaleStorageDescriptor, StaticDescriptors};
///
/// let source = StaticDescriptors::new(vec![]);
/// let before = source.descriptors();
/// source.replace(vec![StaleStorageDescriptor::new("other.xml", ["Legacy"], false)]);
///
/// assert!(before.is_empty());
/// assert_eq!(source.descriptors().len(), 1);
/// ```
#[derive(Debug)]
pub struct StaticDescriptors {
    current: ArcSwap<Vec<StaleStorageDescriptor>>,
}

impl StaticDescriptors {
    /// Creates a source serving `descriptors`.
    pub fn new(descriptors: Vec<StaleStorageDescriptor>) -> Self {
        Self {
            current: ArcSwap::from_pointee(descriptors),
        }
    }

    /// Replaces the served list; passes already in flight keep their snapshot.
    pub fn replace(&self, descriptors: Vec<StaleStorageDescriptor>) {
        self.current.store(Arc::new(descriptors));
    }
}

impl Default for StaticDescriptors {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl DescriptorSource for StaticDescriptors {
    fn descriptors(&self) -> Arc<Vec<StaleStorageDescriptor>> {
        self.current.load_full()
    }
}
