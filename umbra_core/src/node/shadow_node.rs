// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The persistent shadow node.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::layout::LayoutMetrics;

use super::event::EventEmitter;
use super::family::ShadowNodeFamily;
use super::id::{ComponentHandle, ComponentName, SurfaceId, Tag};
use super::props::SharedProps;
use super::state::State;
use super::traits::ShadowNodeTraits;

/// A reference-counted, shareable shadow node.
pub type SharedShadowNode = Arc<ShadowNode>;

/// An immutable, shareable list of children.
///
/// Clones that do not touch children share the same list allocation.
pub type SharedChildren = Arc<Vec<SharedShadowNode>>;

/// The parts of a node that a clone replaces. `None` keeps the source value.
#[derive(Clone, Debug, Default)]
pub struct ShadowNodeFragment {
    /// Replacement props.
    pub props: Option<SharedProps>,
    /// Replacement children.
    pub children: Option<SharedChildren>,
    /// Replacement state.
    pub state: Option<Arc<State>>,
    /// Traits added to the clone.
    pub traits: Option<ShadowNodeTraits>,
}

impl ShadowNodeFragment {
    /// A fragment that replaces only the children.
    #[must_use]
    pub fn children(children: Vec<SharedShadowNode>) -> Self {
        Self {
            children: Some(Arc::new(children)),
            ..Self::default()
        }
    }

    /// A fragment that replaces only the props.
    #[must_use]
    pub fn props(props: SharedProps) -> Self {
        Self {
            props: Some(props),
            ..Self::default()
        }
    }

    /// A fragment that replaces only the state.
    #[must_use]
    pub fn state(state: Arc<State>) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }
}

/// One version of one UI element.
///
/// A node is freely mutable while it is owned and unsealed (during
/// construction and layout). Once sealed, and in practice once it is shared
/// through an [`Arc`], it never changes again; every edit produces a clone that
/// shares all untouched structure with its source.
pub struct ShadowNode {
    family: Arc<ShadowNodeFamily>,
    props: SharedProps,
    children: SharedChildren,
    state: Option<Arc<State>>,
    layout_metrics: LayoutMetrics,
    traits: ShadowNodeTraits,
    order_index: i32,
    sealed: AtomicBool,
}

impl ShadowNode {
    /// Creates a childless, unsealed node.
    #[must_use]
    pub fn new(
        family: Arc<ShadowNodeFamily>,
        props: SharedProps,
        state: Option<Arc<State>>,
        traits: ShadowNodeTraits,
    ) -> Self {
        Self {
            family,
            props,
            children: Arc::new(Vec::new()),
            state,
            layout_metrics: LayoutMetrics::default(),
            traits,
            order_index: 0,
            sealed: AtomicBool::new(false),
        }
    }

    /// Returns an unsealed copy with the parts in `fragment` replaced.
    ///
    /// Layout metrics and order index carry over. The
    /// [`CLONED_BY_NATIVE_STATE_UPDATE`](ShadowNodeTraits::CLONED_BY_NATIVE_STATE_UPDATE)
    /// trait only survives if the fragment sets it again.
    #[must_use]
    pub fn clone_with(&self, fragment: ShadowNodeFragment) -> Self {
        let traits = self
            .traits
            .without(ShadowNodeTraits::CLONED_BY_NATIVE_STATE_UPDATE)
            .with(fragment.traits.unwrap_or_default());
        Self {
            family: Arc::clone(&self.family),
            props: fragment.props.unwrap_or_else(|| Arc::clone(&self.props)),
            children: fragment
                .children
                .unwrap_or_else(|| Arc::clone(&self.children)),
            state: fragment.state.or_else(|| self.state.clone()),
            layout_metrics: self.layout_metrics,
            traits,
            order_index: self.order_index,
            sealed: AtomicBool::new(false),
        }
    }

    // -- Identity --

    /// Returns the family shared by all versions of this node.
    #[must_use]
    pub fn family(&self) -> &Arc<ShadowNodeFamily> {
        &self.family
    }

    /// Returns `true` if both nodes are versions of the same logical node.
    #[must_use]
    pub fn same_family(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.family, &other.family)
    }

    /// Returns the tag.
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.family.tag()
    }

    /// Returns the surface id.
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.family.surface_id()
    }

    /// Returns the component name.
    #[must_use]
    pub fn component_name(&self) -> ComponentName {
        self.family.component_name()
    }

    /// Returns the component handle.
    #[must_use]
    pub fn component_handle(&self) -> ComponentHandle {
        self.family.component_handle()
    }

    /// Returns the event emitter.
    #[must_use]
    pub fn event_emitter(&self) -> Option<&Arc<EventEmitter>> {
        self.family.event_emitter()
    }

    // -- Content --

    /// Returns the props.
    #[must_use]
    pub fn props(&self) -> &SharedProps {
        &self.props
    }

    /// Returns the children.
    #[must_use]
    pub fn children(&self) -> &SharedChildren {
        &self.children
    }

    /// Returns the native state.
    #[must_use]
    pub fn state(&self) -> Option<&Arc<State>> {
        self.state.as_ref()
    }

    /// Returns the layout metrics.
    #[must_use]
    pub fn layout_metrics(&self) -> &LayoutMetrics {
        &self.layout_metrics
    }

    /// Returns the traits.
    #[must_use]
    pub fn traits(&self) -> ShadowNodeTraits {
        self.traits
    }

    /// Returns `true` if this node is flattened away when mounting.
    #[must_use]
    pub fn is_layout_only(&self) -> bool {
        self.traits.contains(ShadowNodeTraits::LAYOUT_ONLY)
    }

    /// Returns the drawing order among surfaced siblings.
    #[must_use]
    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    // -- Mutation while unsealed --

    /// Sets the layout metrics.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the node is sealed.
    pub fn set_layout_metrics(&mut self, layout_metrics: LayoutMetrics) {
        self.ensure_unsealed();
        self.layout_metrics = layout_metrics;
    }

    /// Replaces the traits.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the node is sealed.
    pub fn set_traits(&mut self, traits: ShadowNodeTraits) {
        self.ensure_unsealed();
        self.traits = traits;
    }

    /// Sets the drawing order index.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the node is sealed.
    pub fn set_order_index(&mut self, order_index: i32) {
        self.ensure_unsealed();
        self.order_index = order_index;
    }

    /// Appends a child.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the node is sealed.
    pub fn append_child(&mut self, child: SharedShadowNode) {
        self.children_mut().push(child);
    }

    /// Replaces the child at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds, or in debug builds if the node is
    /// sealed.
    pub fn replace_child(&mut self, index: usize, child: SharedShadowNode) {
        self.children_mut()[index] = child;
    }

    /// Returns the child list for editing, copying it first if it is shared.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the node is sealed.
    pub fn children_mut(&mut self) -> &mut Vec<SharedShadowNode> {
        self.ensure_unsealed();
        Arc::make_mut(&mut self.children)
    }

    /// Clones the child at `index`, lets `f` edit the clone, and puts the
    /// clone in place of the original.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds, or in debug builds if the node is
    /// sealed.
    pub fn mutate_child(&mut self, index: usize, f: impl FnOnce(&mut Self)) {
        let mut child = self.children[index].clone_with(ShadowNodeFragment::default());
        f(&mut child);
        self.replace_child(index, Arc::new(child));
    }

    // -- Sealing --

    /// Returns `true` once the node has been committed.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Seals this node and, recursively, every unsealed descendant.
    pub fn seal_recursive(&self) {
        if self.sealed.swap(true, Ordering::AcqRel) {
            // A sealed node's subtree is sealed already.
            return;
        }
        for child in self.children.iter() {
            child.seal_recursive();
        }
    }

    fn ensure_unsealed(&self) {
        debug_assert!(
            !self.is_sealed(),
            "attempt to mutate a sealed shadow node (tag {})",
            self.tag()
        );
    }

    // -- Tree queries --

    /// Returns the path from `self` to the node of `family`.
    ///
    /// Each entry is a node on the path and the index of the next step among
    /// its children; the last entry is the target's parent. Returns an empty
    /// path if `self` is the target and `None` if the family is not in this
    /// subtree.
    #[must_use]
    pub fn ancestors(&self, family: &ShadowNodeFamily) -> Option<Vec<(&Self, usize)>> {
        let mut path = Vec::new();
        find_path(self, family, &mut path).then_some(path)
    }

    /// Returns the version of the node of `family` among the descendants of
    /// this node. The node itself is not a candidate.
    #[must_use]
    pub fn find_in_subtree(&self, family: &ShadowNodeFamily) -> Option<&SharedShadowNode> {
        let path = self.ancestors(family)?;
        let &(parent, index) = path.last()?;
        parent.children.get(index)
    }

    /// Clones every node on the path to the node of `family`, replacing that
    /// node with the result of `callback`.
    ///
    /// Returns the new root, or `None` if the family is not in this subtree.
    #[must_use]
    pub fn clone_tree(
        &self,
        family: &ShadowNodeFamily,
        callback: impl FnOnce(&Self) -> Self,
    ) -> Option<Self> {
        let path = self.ancestors(family)?;
        let Some(&(parent, index)) = path.last() else {
            return Some(callback(self));
        };
        let mut replacement = callback(parent.children[index].as_ref());
        for &(node, index) in path.iter().rev() {
            let mut clone = node.clone_with(ShadowNodeFragment::default());
            clone.replace_child(index, Arc::new(replacement));
            replacement = clone;
        }
        Some(replacement)
    }
}

fn find_path<'a>(
    node: &'a ShadowNode,
    family: &ShadowNodeFamily,
    path: &mut Vec<(&'a ShadowNode, usize)>,
) -> bool {
    if core::ptr::eq(node.family.as_ref(), family) {
        return true;
    }
    for (index, child) in node.children.iter().enumerate() {
        path.push((node, index));
        if find_path(child, family, path) {
            return true;
        }
        path.pop();
    }
    false
}

impl fmt::Debug for ShadowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowNode")
            .field("tag", &self.tag())
            .field("component_name", &self.component_name())
            .field("traits", &self.traits)
            .field("layout_metrics", &self.layout_metrics)
            .field("state", &self.state.as_ref().map(|s| s.revision()))
            .field("children", &self.children)
            .field("sealed", &self.is_sealed())
            .finish_non_exhaustive()
    }
}
