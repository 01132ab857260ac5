// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The component descriptor boundary.

use core::any::Any;
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::node::{
    ComponentHandle, ComponentName, EventDispatcher, EventEmitter, RawProps, ShadowNode,
    ShadowNodeFamily, ShadowNodeFragment, ShadowNodeTraits, SharedProps, State, SurfaceId, Tag,
};

/// Type-erased, shared values a host makes available to props parsing.
#[derive(Default)]
pub struct ContextContainer {
    values: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl ContextContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert<T: Any + Send + Sync>(&self, key: &str, value: Arc<T>) {
        self.values.write().insert(key.to_owned(), value);
    }

    /// Returns the value under `key` if it is a `T`.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let value = self.values.read().get(key).cloned()?;
        value.downcast::<T>().ok()
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }
}

impl fmt::Debug for ContextContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.values.read();
        let mut keys: Vec<&String> = values.keys().collect();
        keys.sort();
        f.debug_struct("ContextContainer")
            .field("keys", &keys)
            .finish()
    }
}

/// Everything props parsing may consult besides the raw props themselves.
#[derive(Clone, Copy, Debug)]
pub struct PropsParserContext<'a> {
    /// Surface the props belong to.
    pub surface_id: SurfaceId,
    /// Host-provided shared values.
    pub context_container: &'a ContextContainer,
}

/// Creates, clones, and parses props for one kind of component.
///
/// Descriptors are looked up from a
/// [`ComponentDescriptorRegistry`](super::ComponentDescriptorRegistry) by
/// handle or name. The default methods cover kinds whose nodes differ only in
/// their props; override them to derive traits or initial state.
pub trait ComponentDescriptor: Send + Sync {
    /// Returns the handle identifying this kind.
    fn component_handle(&self) -> ComponentHandle;

    /// Returns the name identifying this kind.
    fn component_name(&self) -> ComponentName;

    /// Returns props used when a node is created without any.
    fn default_props(&self) -> SharedProps;

    /// Parses `raw` on top of `base` (or the defaults) into new immutable props.
    fn clone_props(
        &self,
        context: &PropsParserContext<'_>,
        base: Option<&SharedProps>,
        raw: &RawProps,
    ) -> SharedProps;

    /// Returns the traits a node with `props` carries.
    fn traits_for_props(&self, props: &SharedProps) -> ShadowNodeTraits {
        _ = props;
        ShadowNodeTraits::NONE
    }

    /// Returns the drawing order a node with `props` uses.
    fn order_index_for_props(&self, props: &SharedProps) -> i32 {
        _ = props;
        0
    }

    /// Creates the family for a new logical node.
    fn create_family(
        &self,
        tag: Tag,
        surface_id: SurfaceId,
        dispatcher: Option<Arc<dyn EventDispatcher>>,
    ) -> Arc<ShadowNodeFamily> {
        let emitter = EventEmitter::new(surface_id, tag, dispatcher);
        ShadowNodeFamily::new(
            tag,
            surface_id,
            self.component_name(),
            self.component_handle(),
            Some(Arc::new(emitter)),
        )
    }

    /// Returns the state a freshly created node starts with.
    fn create_initial_state(
        &self,
        props: &SharedProps,
        family: &Arc<ShadowNodeFamily>,
    ) -> Option<Arc<State>> {
        _ = (props, family);
        None
    }

    /// Creates the first version of a node.
    fn create_shadow_node(
        &self,
        fragment: ShadowNodeFragment,
        family: Arc<ShadowNodeFamily>,
    ) -> ShadowNode {
        let props = fragment.props.unwrap_or_else(|| self.default_props());
        let traits = self
            .traits_for_props(&props)
            .with(fragment.traits.unwrap_or_default());
        let state = fragment
            .state
            .or_else(|| self.create_initial_state(&props, &family));
        let order_index = self.order_index_for_props(&props);
        let mut node = ShadowNode::new(family, props, state, traits);
        node.set_order_index(order_index);
        if let Some(children) = fragment.children {
            node.children_mut().extend(children.iter().cloned());
        }
        node
    }

    /// Creates the next version of `source`.
    fn clone_shadow_node(&self, source: &ShadowNode, fragment: ShadowNodeFragment) -> ShadowNode {
        let new_props = fragment.props.clone();
        let mut node = source.clone_with(fragment);
        if let Some(props) = new_props {
            let derived = self.traits_for_props(&props);
            let kept = node.traits().without(ShadowNodeTraits::LAYOUT_ONLY);
            node.set_traits(kept.with(derived));
            node.set_order_index(self.order_index_for_props(&props));
        }
        node
    }
}

impl fmt::Debug for dyn ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.component_name())
            .field("handle", &self.component_handle())
            .finish()
    }
}
