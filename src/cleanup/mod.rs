//! # Stale-data cleanup.
//!
//! Deletes persisted state of components that no longer exist, as described by
//! externally supplied [`StaleStorageDescriptor`]s.
//!
//! ## Contents
//! - [`StaleStorageDescriptor`], [`DescriptorSource`], [`StaticDescriptors`] descriptor input
//! - [`StorageResolver`], [`Storage`], [`SessionProducer`] storage collaborator contracts
//! - [`StaleDataCleaner`], [`CleanupReport`] the cleanup pass itself

mod cleaner;
mod descriptor;
mod storage;

pub use cleaner::{ClearedState, CleanupReport, StaleDataCleaner};
pub use descriptor::{DescriptorSource, StaleStorageDescriptor, StaticDescriptors};
pub use storage::{SessionProducer, Storage, StorageResolver};
