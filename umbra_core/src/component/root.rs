// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The surface root component.

use std::sync::Arc;

use crate::layout::{LayoutConstraints, LayoutContext};
use crate::node::{
    ComponentHandle, ComponentName, Props, RawProps, ShadowNode, ShadowNodeFragment,
    ShadowNodeTraits, SharedProps, SurfaceId, downcast_props,
};

use super::descriptor::{ComponentDescriptor, PropsParserContext};

/// Handle of the root component kind.
pub const ROOT_COMPONENT_HANDLE: ComponentHandle = ComponentHandle(1);

/// Name of the root component kind.
pub const ROOT_COMPONENT_NAME: ComponentName = "RootView";

/// Props of a surface root: the inputs of laying out the whole surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RootProps {
    /// Size bounds of the surface.
    pub layout_constraints: LayoutConstraints,
    /// Scale and viewport information.
    pub layout_context: LayoutContext,
}

impl Props for RootProps {}

impl RootProps {
    /// Returns the root props of `node`, if it is a root.
    #[must_use]
    pub fn of(node: &ShadowNode) -> Option<&Self> {
        downcast_props::<Self>(node.props())
    }
}

/// Descriptor for surface roots.
#[derive(Clone, Copy, Debug, Default)]
pub struct RootComponentDescriptor;

impl RootComponentDescriptor {
    /// Creates an empty root node for `surface_id`.
    #[must_use]
    pub fn create_root(
        &self,
        surface_id: SurfaceId,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
    ) -> ShadowNode {
        let family = self.create_family(surface_id.root_tag(), surface_id, None);
        let props: SharedProps = Arc::new(RootProps {
            layout_constraints,
            layout_context,
        });
        self.create_shadow_node(ShadowNodeFragment::props(props), family)
    }

    /// Returns a clone of `root` with new layout inputs, or `None` if they are
    /// unchanged.
    #[must_use]
    pub fn clone_with_layout(
        &self,
        root: &ShadowNode,
        layout_constraints: LayoutConstraints,
        layout_context: LayoutContext,
    ) -> Option<ShadowNode> {
        let new_props = RootProps {
            layout_constraints,
            layout_context,
        };
        if RootProps::of(root) == Some(&new_props) {
            return None;
        }
        Some(self.clone_shadow_node(root, ShadowNodeFragment::props(Arc::new(new_props))))
    }
}

impl ComponentDescriptor for RootComponentDescriptor {
    fn component_handle(&self) -> ComponentHandle {
        ROOT_COMPONENT_HANDLE
    }

    fn component_name(&self) -> ComponentName {
        ROOT_COMPONENT_NAME
    }

    fn default_props(&self) -> SharedProps {
        Arc::new(RootProps::default())
    }

    fn clone_props(
        &self,
        _context: &PropsParserContext<'_>,
        base: Option<&SharedProps>,
        _raw: &RawProps,
    ) -> SharedProps {
        // Root layout inputs come from the surface, never from raw props.
        base.cloned().unwrap_or_else(|| self.default_props())
    }

    fn traits_for_props(&self, _props: &SharedProps) -> ShadowNodeTraits {
        ShadowNodeTraits::ROOT
    }
}
