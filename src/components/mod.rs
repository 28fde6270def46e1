//! # Save-capable components.
//!
//! This module provides the component-related types:
//! - [`SaveComponent`] - trait for implementing async cancelable saves
//! - [`SaveFn`] - function-based component implementation
//! - [`ComponentRef`] - shared reference to a component (`Arc<dyn SaveComponent>`)
//! - [`Capability`] - scheduling requirement selecting the registry group

mod capability;
mod component;
mod component_fn;

pub use capability::Capability;
pub use component::{ComponentRef, SaveComponent};
pub use component_fn::SaveFn;
