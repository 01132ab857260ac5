// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lookup of component descriptors by handle or name.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::node::{ComponentHandle, ComponentName};

use super::descriptor::ComponentDescriptor;
use super::root::RootComponentDescriptor;
use super::view::ViewComponentDescriptor;

#[derive(Default)]
struct Entries {
    by_handle: HashMap<ComponentHandle, Arc<dyn ComponentDescriptor>>,
    by_name: HashMap<ComponentName, ComponentHandle>,
}

/// A registry of component descriptors, shared by everything that creates or
/// clones nodes for a set of surfaces.
///
/// Registries are plain values: construct one per renderer (or per test) and
/// pass it where it is needed.
#[derive(Default)]
pub struct ComponentDescriptorRegistry {
    entries: RwLock<Entries>,
}

impl ComponentDescriptorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in root and view descriptors.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.add(Arc::new(RootComponentDescriptor));
        registry.add(Arc::new(ViewComponentDescriptor::view()));
        registry
    }

    /// Registers `descriptor`, replacing any descriptor with the same handle
    /// or name.
    pub fn add(&self, descriptor: Arc<dyn ComponentDescriptor>) {
        let mut entries = self.entries.write();
        let handle = descriptor.component_handle();
        entries.by_name.insert(descriptor.component_name(), handle);
        entries.by_handle.insert(handle, descriptor);
    }

    /// Returns the descriptor for `handle`.
    #[must_use]
    pub fn get(&self, handle: ComponentHandle) -> Option<Arc<dyn ComponentDescriptor>> {
        self.entries.read().by_handle.get(&handle).cloned()
    }

    /// Returns the descriptor registered under `name`.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn ComponentDescriptor>> {
        let entries = self.entries.read();
        let handle = entries.by_name.get(name)?;
        entries.by_handle.get(handle).cloned()
    }

    /// Returns the number of registered descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().by_handle.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl core::fmt::Debug for ComponentDescriptorRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let entries = self.entries.read();
        let mut names: Vec<&ComponentName> = entries.by_name.keys().collect();
        names.sort();
        f.debug_struct("ComponentDescriptorRegistry")
            .field("names", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::root::ROOT_COMPONENT_HANDLE;

    #[test]
    fn builtins_are_found_by_handle_and_name() {
        let registry = ComponentDescriptorRegistry::with_builtins();
        assert_eq!(registry.len(), 2);
        assert!(registry.get(ROOT_COMPONENT_HANDLE).is_some());
        let view = registry.get_by_name("View").expect("view is registered");
        assert_eq!(view.component_name(), "View");
        assert!(registry.get_by_name("Slider").is_none());
    }

    #[test]
    fn add_replaces_same_handle() {
        let registry = ComponentDescriptorRegistry::new();
        registry.add(Arc::new(ViewComponentDescriptor::view()));
        registry.add(Arc::new(ViewComponentDescriptor::view()));
        assert_eq!(registry.len(), 1);
    }
}
