// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A layout engine that only understands absolute positioning.

use std::sync::Arc;

use kurbo::{Point, Rect, Size};
use umbra_core::component::ViewProps;
use umbra_core::layout::{LayoutConstraints, LayoutContext, LayoutEngine, LayoutMetrics};
use umbra_core::node::{ShadowNode, ShadowNodeFragment, downcast_props};

/// Places every view at its `left`/`top` offset with its `width`/`height`
/// size; missing values count as zero. The root takes the smallest size its
/// constraints allow.
///
/// Nodes whose frame is already right are left alone, so unchanged subtrees
/// stay shared with the previous revision.
#[derive(Clone, Copy, Debug, Default)]
pub struct StubLayoutEngine;

impl LayoutEngine for StubLayoutEngine {
    fn layout_if_needed(
        &self,
        root: &mut ShadowNode,
        constraints: &LayoutConstraints,
        context: &LayoutContext,
    ) {
        let size = constraints.clamp(Size::ZERO);
        let metrics = LayoutMetrics {
            frame: Rect::from_origin_size(Point::ZERO, size),
            point_scale_factor: context.point_scale_factor,
            layout_direction: constraints.layout_direction,
            ..*root.layout_metrics()
        };
        if *root.layout_metrics() != metrics {
            root.set_layout_metrics(metrics);
        }
        for index in 0..root.children().len() {
            let child = Arc::clone(&root.children()[index]);
            if let Some(laid_out) = relayout(&child, context) {
                root.replace_child(index, Arc::new(laid_out));
            }
        }
    }
}

fn target_metrics(node: &ShadowNode, context: &LayoutContext) -> LayoutMetrics {
    let current = *node.layout_metrics();
    let Some(props) = downcast_props::<ViewProps>(node.props()) else {
        return current;
    };
    let origin = Point::new(props.left.unwrap_or(0.0), props.top.unwrap_or(0.0));
    let size = Size::new(props.width.unwrap_or(0.0), props.height.unwrap_or(0.0));
    LayoutMetrics {
        frame: Rect::from_origin_size(origin, size),
        display_type: props.display,
        point_scale_factor: context.point_scale_factor,
        ..current
    }
}

/// Returns a laid out copy of `node`, or `None` if nothing in its subtree
/// changes.
fn relayout(node: &ShadowNode, context: &LayoutContext) -> Option<ShadowNode> {
    let mut children = None;
    for (index, child) in node.children().iter().enumerate() {
        if let Some(laid_out) = relayout(child, context) {
            let list = children.get_or_insert_with(|| node.children().to_vec());
            list[index] = Arc::new(laid_out);
        }
    }
    let metrics = target_metrics(node, context);
    if children.is_none() && *node.layout_metrics() == metrics {
        return None;
    }
    let fragment = ShadowNodeFragment {
        children: children.map(Arc::new),
        ..ShadowNodeFragment::default()
    };
    let mut clone = node.clone_with(fragment);
    clone.set_layout_metrics(metrics);
    Some(clone)
}
