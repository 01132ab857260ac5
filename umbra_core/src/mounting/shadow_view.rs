// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat node snapshots and sibling-list slicing.

use core::fmt;
use std::sync::Arc;

use kurbo::Vec2;

use crate::layout::LayoutMetrics;
use crate::node::{
    ComponentHandle, ComponentName, EventEmitter, ShadowNode, SharedProps, State, SurfaceId, Tag,
};

/// A flat snapshot of the directly comparable fields of a [`ShadowNode`].
///
/// Equality is structural for plain fields and pointer identity for props,
/// event emitter and state.
#[derive(Clone, Default)]
pub struct ShadowView {
    /// Node tag.
    pub tag: Tag,
    /// Surface the node belongs to.
    pub surface_id: SurfaceId,
    /// Component kind name.
    pub component_name: ComponentName,
    /// Component kind handle.
    pub component_handle: ComponentHandle,
    /// Props; `None` only for the empty view.
    pub props: Option<SharedProps>,
    /// Event emitter.
    pub event_emitter: Option<Arc<EventEmitter>>,
    /// Layout metrics, possibly translated by flattened ancestors.
    pub layout_metrics: LayoutMetrics,
    /// Native state.
    pub state: Option<Arc<State>>,
}

impl ShadowView {
    /// Snapshots `node`.
    #[must_use]
    pub fn new(node: &ShadowNode) -> Self {
        Self {
            tag: node.tag(),
            surface_id: node.surface_id(),
            component_name: node.component_name(),
            component_handle: node.component_handle(),
            props: Some(Arc::clone(node.props())),
            event_emitter: node.event_emitter().cloned(),
            layout_metrics: *node.layout_metrics(),
            state: node.state().cloned(),
        }
    }
}

fn same_arc<T: ?Sized>(a: Option<&Arc<T>>, b: Option<&Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl PartialEq for ShadowView {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.surface_id == other.surface_id
            && self.component_name == other.component_name
            && self.component_handle == other.component_handle
            && same_arc(self.props.as_ref(), other.props.as_ref())
            && same_arc(self.event_emitter.as_ref(), other.event_emitter.as_ref())
            && self.layout_metrics == other.layout_metrics
            && same_arc(self.state.as_ref(), other.state.as_ref())
    }
}

impl fmt::Debug for ShadowView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowView")
            .field("tag", &self.tag)
            .field("component_name", &self.component_name)
            .field("frame", &self.layout_metrics.frame)
            .field("state", &self.state.as_ref().map(|s| s.revision()))
            .finish_non_exhaustive()
    }
}

/// A view paired with the node it was taken from.
///
/// The view drives comparison; the node lets the differentiator recurse.
#[derive(Clone, Debug)]
pub struct ShadowViewNodePair {
    /// Snapshot, translated by any flattened ancestors.
    pub view: ShadowView,
    /// The node the snapshot came from.
    pub node: Arc<ShadowNode>,
}

impl ShadowViewNodePair {
    /// Pairs `node` with its snapshot.
    #[must_use]
    pub fn new(node: &Arc<ShadowNode>) -> Self {
        Self {
            view: ShadowView::new(node),
            node: Arc::clone(node),
        }
    }

    /// Returns `true` if both pairs reference the same node allocation.
    #[must_use]
    pub fn same_node(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl PartialEq for ShadowViewNodePair {
    fn eq(&self, other: &Self) -> bool {
        self.view == other.view && self.same_node(other)
    }
}

/// Returns the mounted children of `node`: its children with layout-only
/// nodes flattened away and their origins folded into their descendants.
///
/// The result is stably sorted by order index when any entry has a non-zero
/// one.
#[must_use]
pub fn slice_child_shadow_node_view_pairs(node: &ShadowNode) -> Vec<ShadowViewNodePair> {
    let mut pairs = Vec::new();
    slice_into(node, Vec2::ZERO, &mut pairs);
    if pairs.iter().any(|pair| pair.node.order_index() != 0) {
        pairs.sort_by_key(|pair| pair.node.order_index());
    }
    pairs
}

fn slice_into(node: &ShadowNode, offset: Vec2, pairs: &mut Vec<ShadowViewNodePair>) {
    for child in node.children().iter() {
        let mut pair = ShadowViewNodePair::new(child);
        let translated = pair.view.layout_metrics != LayoutMetrics::EMPTY;
        if translated {
            pair.view.layout_metrics.frame = pair.view.layout_metrics.frame + offset;
        }
        if child.is_layout_only() {
            let child_offset = if translated {
                pair.view.layout_metrics.origin().to_vec2()
            } else {
                offset
            };
            slice_into(child, child_offset, pairs);
        } else {
            pairs.push(pair);
        }
    }
}
