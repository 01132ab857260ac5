// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The immutable shadow-node data model.
//!
//! A [`ShadowNode`] is one version of one UI element. Versions of the same
//! element share a [`ShadowNodeFamily`], which is the authoritative identity
//! test. Nodes form persistent trees: children live in an
//! `Arc<Vec<Arc<ShadowNode>>>`, so a commit that changes one leaf clones only
//! the path from the root to that leaf.

mod event;
mod family;
mod id;
mod props;
mod shadow_node;
mod state;
mod traits;

pub use event::{EventDispatcher, EventEmitter};
pub use family::ShadowNodeFamily;
pub use id::{ComponentHandle, ComponentName, SurfaceId, Tag};
pub use props::{Props, RawProps, SharedProps, downcast_props};
pub use shadow_node::{ShadowNode, ShadowNodeFragment, SharedChildren, SharedShadowNode};
pub use state::{SharedStateData, State, StateData};
pub use traits::ShadowNodeTraits;

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use kurbo::Rect;

    use super::*;
    use crate::layout::LayoutMetrics;

    #[derive(Debug)]
    pub(crate) struct TestProps;
    impl Props for TestProps {}

    pub(crate) fn plain_node(tag: i32) -> ShadowNode {
        let family = ShadowNodeFamily::new(
            Tag(tag),
            SurfaceId(1),
            "View",
            ComponentHandle(1),
            None,
        );
        ShadowNode::new(family, Arc::new(TestProps), None, ShadowNodeTraits::NONE)
    }

    pub(crate) fn leaf(tag: i32, frame: Rect) -> SharedShadowNode {
        node_with_children(tag, frame, Vec::new())
    }

    pub(crate) fn node_with_children(
        tag: i32,
        frame: Rect,
        children: Vec<SharedShadowNode>,
    ) -> SharedShadowNode {
        let mut node = plain_node(tag);
        node.set_layout_metrics(LayoutMetrics::with_frame(frame));
        for child in children {
            node.append_child(child);
        }
        Arc::new(node)
    }
}
