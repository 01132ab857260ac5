// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout metrics, constraints, and the layout engine boundary.
//!
//! The core never computes layout itself. A [`LayoutEngine`] receives the
//! unsealed root of a tree that is about to be committed and writes
//! [`LayoutMetrics`] into it (cloning whichever children it needs to touch).
//! After the commit seals the tree, metrics are read-only.

use std::sync::Arc;

use kurbo::{Insets, Point, Rect, Size, Vec2};

use crate::node::{ShadowNode, ShadowNodeFamily};

/// Whether a node takes part in layout and mounting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayType {
    /// The node is laid out normally.
    #[default]
    Flex,
    /// The node and its subtree are skipped by layout and hit testing.
    None,
}

/// Writing direction used by layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutDirection {
    /// Inherit from the parent.
    #[default]
    Undefined,
    /// Left to right.
    LeftToRight,
    /// Right to left.
    RightToLeft,
}

/// The output of layout for one node, in the parent's coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutMetrics {
    /// Position and size relative to the parent.
    pub frame: Rect,
    /// Padding plus border, measured inward from the frame.
    pub content_insets: Insets,
    /// Border widths.
    pub border_width: Insets,
    /// Display type.
    pub display_type: DisplayType,
    /// Resolved writing direction.
    pub layout_direction: LayoutDirection,
    /// Physical pixels per layout point.
    pub point_scale_factor: f64,
}

const ZERO_INSETS: Insets = Insets {
    x0: 0.0,
    y0: 0.0,
    x1: 0.0,
    y1: 0.0,
};

impl LayoutMetrics {
    /// Metrics of a node that has no layout at all.
    ///
    /// Differs from [`Default`] (a zero-sized frame at the origin) so callers
    /// can tell "laid out to nothing" apart from "never laid out".
    pub const EMPTY: Self = Self {
        frame: Rect {
            x0: 0.0,
            y0: 0.0,
            x1: -1.0,
            y1: -1.0,
        },
        content_insets: ZERO_INSETS,
        border_width: ZERO_INSETS,
        display_type: DisplayType::Flex,
        layout_direction: LayoutDirection::Undefined,
        point_scale_factor: 1.0,
    };

    /// Returns metrics with the given frame and defaults elsewhere.
    #[must_use]
    pub fn with_frame(frame: Rect) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    /// Returns the frame origin.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.frame.origin()
    }

    /// Returns the frame size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.frame.size()
    }

    /// Returns the frame inset by the content insets.
    #[must_use]
    pub fn content_frame(&self) -> Rect {
        let size = self.frame.size();
        Rect::new(
            self.content_insets.x0,
            self.content_insets.y0,
            (size.width - self.content_insets.x1).max(self.content_insets.x0),
            (size.height - self.content_insets.y1).max(self.content_insets.y0),
        )
    }
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            frame: Rect::ZERO,
            content_insets: ZERO_INSETS,
            border_width: ZERO_INSETS,
            display_type: DisplayType::Flex,
            layout_direction: LayoutDirection::Undefined,
            point_scale_factor: 1.0,
        }
    }
}

/// Size bounds for laying out a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConstraints {
    /// Smallest allowed size.
    pub minimum_size: Size,
    /// Largest allowed size; infinite dimensions are unbounded.
    pub maximum_size: Size,
    /// Writing direction of the surface.
    pub layout_direction: LayoutDirection,
}

impl LayoutConstraints {
    /// Constraints that force exactly `size`.
    #[must_use]
    pub fn exact(size: Size) -> Self {
        Self {
            minimum_size: size,
            maximum_size: size,
            layout_direction: LayoutDirection::LeftToRight,
        }
    }

    /// Clamps `size` into the constraint range.
    #[must_use]
    pub fn clamp(&self, size: Size) -> Size {
        Size::new(
            size.width
                .min(self.maximum_size.width)
                .max(self.minimum_size.width),
            size.height
                .min(self.maximum_size.height)
                .max(self.minimum_size.height),
        )
    }
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self {
            minimum_size: Size::ZERO,
            maximum_size: Size::new(f64::INFINITY, f64::INFINITY),
            layout_direction: LayoutDirection::Undefined,
        }
    }
}

/// Environment values that affect layout but are not constraints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutContext {
    /// Physical pixels per layout point.
    pub point_scale_factor: f64,
    /// User font scale.
    pub font_size_multiplier: f64,
    /// Offset of the surface inside its host viewport.
    pub viewport_offset: Point,
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self {
            point_scale_factor: 1.0,
            font_size_multiplier: 1.0,
            viewport_offset: Point::ZERO,
        }
    }
}

/// Computes layout metrics for a tree that is about to be committed.
///
/// Implementations receive the unsealed root and write metrics in place with
/// [`ShadowNode::set_layout_metrics`], reaching children through
/// [`ShadowNode::mutate_child`] so untouched subtrees stay shared.
pub trait LayoutEngine: Send + Sync {
    /// Lays out the tree rooted at `root` if anything changed.
    fn layout_if_needed(
        &self,
        root: &mut ShadowNode,
        constraints: &LayoutConstraints,
        context: &LayoutContext,
    );
}

/// Computes the metrics of the node of `family` relative to `ancestor`.
///
/// Frame origins along the path are accumulated. Returns `None` if the node is
/// not in the subtree or a node on the path is not displayed.
#[must_use]
pub fn relative_layout_metrics(
    family: &ShadowNodeFamily,
    ancestor: &ShadowNode,
) -> Option<LayoutMetrics> {
    let path = ancestor.ancestors(family)?;
    let Some(&(parent, index)) = path.last() else {
        // The ancestor is the node itself.
        return Some(LayoutMetrics {
            frame: Rect::from_origin_size(Point::ZERO, ancestor.layout_metrics().size()),
            ..*ancestor.layout_metrics()
        });
    };
    let target = &parent.children()[index];
    let mut metrics = *target.layout_metrics();
    if metrics.display_type == DisplayType::None {
        return None;
    }
    let mut offset = Vec2::ZERO;
    // Skip the ancestor itself: its own origin is outside the relative space.
    for &(node, _) in path.iter().skip(1) {
        let node_metrics = node.layout_metrics();
        if node_metrics.display_type == DisplayType::None {
            return None;
        }
        offset += node_metrics.origin().to_vec2();
    }
    metrics.frame = metrics.frame + offset;
    Some(metrics)
}

/// Returns the deepest displayed node whose frame contains `point`.
///
/// `point` is in the coordinate space of `root`'s parent. Later siblings (and
/// higher order indices) are on top and win.
#[must_use]
pub fn find_node_at_point(root: &Arc<ShadowNode>, point: Point) -> Option<Arc<ShadowNode>> {
    let metrics = root.layout_metrics();
    if metrics.display_type == DisplayType::None || !metrics.frame.contains(point) {
        return None;
    }
    let local = point - metrics.origin().to_vec2();
    let mut children: Vec<&Arc<ShadowNode>> = root.children().iter().collect();
    children.sort_by_key(|child| child.order_index());
    children
        .into_iter()
        .rev()
        .find_map(|child| find_node_at_point(child, local))
        .or_else(|| Some(Arc::clone(root)))
}
