// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative construction of shadow trees.

use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Size;
use serde_json::json;
use umbra_core::component::{
    ComponentDescriptor, ContextContainer, PropsParserContext, RootComponentDescriptor, RootProps,
    ViewComponentDescriptor,
};
use umbra_core::layout::{LayoutConstraints, LayoutContext, LayoutDirection, LayoutEngine};
use umbra_core::node::{
    RawProps, ShadowNode, ShadowNodeFamily, ShadowNodeFragment, SharedProps, SharedShadowNode,
    SurfaceId, Tag,
};

use crate::layout::StubLayoutEngine;

/// A view and its children, described by tag and raw props.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    tag: Tag,
    props: RawProps,
    children: Vec<Element>,
}

impl Element {
    /// A mounted 100×100 view at the parent's origin.
    ///
    /// The `nativeID` keeps it from being flattened.
    #[must_use]
    pub fn view(tag: i32) -> Self {
        Self::with_props(
            tag,
            RawProps::from(json!({
                "left": 0,
                "top": 0,
                "width": 100,
                "height": 100,
                "nativeID": "NativeId",
            })),
        )
    }

    /// A view with default props, which layout-only flattening removes.
    #[must_use]
    pub fn layout_only(tag: i32) -> Self {
        Self::with_props(tag, RawProps::new())
    }

    /// A view with the given props.
    #[must_use]
    pub fn with_props(tag: i32, props: RawProps) -> Self {
        Self {
            tag: Tag(tag),
            props,
            children: Vec::new(),
        }
    }

    /// Appends `child`.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Appends every element of `children`.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Returns the tag.
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.tag
    }
}

/// Builds shadow nodes for one surface.
///
/// Every tag maps to one family for the lifetime of the builder, so building
/// the same tag twice yields two versions of one logical node. Building an
/// [`Element`] with the same raw props as the last time its tag was built
/// reuses the parsed props, so only real props changes show up in diffs.
pub struct TreeBuilder {
    surface_id: SurfaceId,
    descriptor: ViewComponentDescriptor,
    context_container: ContextContainer,
    families: HashMap<Tag, Arc<ShadowNodeFamily>>,
    element_props: HashMap<Tag, (RawProps, SharedProps)>,
    empty_root: SharedShadowNode,
    next_tag: i32,
}

impl core::fmt::Debug for TreeBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeBuilder")
            .field("surface_id", &self.surface_id)
            .field("families", &self.families.len())
            .field("next_tag", &self.next_tag)
            .finish_non_exhaustive()
    }
}

impl TreeBuilder {
    /// First tag handed out by [`next_tag`](Self::next_tag).
    pub const FIRST_GENERATED_TAG: i32 = 1000;

    /// Creates a builder whose roots are 512 points wide and unbounded in
    /// height.
    #[must_use]
    pub fn new(surface_id: SurfaceId) -> Self {
        Self::with_constraints(
            surface_id,
            LayoutConstraints {
                minimum_size: Size::new(512.0, 0.0),
                maximum_size: Size::new(512.0, f64::INFINITY),
                layout_direction: LayoutDirection::LeftToRight,
            },
        )
    }

    /// Creates a builder whose roots carry `constraints`.
    #[must_use]
    pub fn with_constraints(surface_id: SurfaceId, constraints: LayoutConstraints) -> Self {
        let root =
            RootComponentDescriptor.create_root(surface_id, constraints, LayoutContext::default());
        Self {
            surface_id,
            descriptor: ViewComponentDescriptor::view(),
            context_container: ContextContainer::new(),
            families: HashMap::new(),
            element_props: HashMap::new(),
            empty_root: Arc::new(root),
            next_tag: Self::FIRST_GENERATED_TAG,
        }
    }

    /// Returns the surface nodes are built for.
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Returns the childless, never laid out root all roots are cloned from.
    #[must_use]
    pub fn empty_root(&self) -> &SharedShadowNode {
        &self.empty_root
    }

    /// Returns an unused tag.
    pub fn next_tag(&mut self) -> Tag {
        let tag = Tag(self.next_tag);
        self.next_tag += 1;
        tag
    }

    /// Returns the family of `tag`, creating it on first use.
    pub fn family(&mut self, tag: Tag) -> Arc<ShadowNodeFamily> {
        let (descriptor, surface_id) = (self.descriptor, self.surface_id);
        Arc::clone(
            self.families
                .entry(tag)
                .or_insert_with(|| descriptor.create_family(tag, surface_id, None)),
        )
    }

    /// Parses `raw` into view props.
    #[must_use]
    pub fn props(&self, raw: &RawProps) -> SharedProps {
        let context = PropsParserContext {
            surface_id: self.surface_id,
            context_container: &self.context_container,
        };
        self.descriptor.clone_props(&context, None, raw)
    }

    /// Creates a new version of the node of `tag` with `props` and
    /// `children`.
    pub fn view_node(
        &mut self,
        tag: Tag,
        props: SharedProps,
        children: Vec<SharedShadowNode>,
    ) -> SharedShadowNode {
        let family = self.family(tag);
        let fragment = ShadowNodeFragment {
            props: Some(props),
            children: Some(Arc::new(children)),
            ..ShadowNodeFragment::default()
        };
        Arc::new(self.descriptor.create_shadow_node(fragment, family))
    }

    /// Returns a copy of `node` with new props, keeping children and traits
    /// derived the way the view descriptor derives them.
    #[must_use]
    pub fn with_new_props(&self, node: &ShadowNode, raw: &RawProps) -> ShadowNode {
        self.descriptor
            .clone_shadow_node(node, ShadowNodeFragment::props(self.props(raw)))
    }

    /// Builds `element` and its descendants.
    pub fn node(&mut self, element: &Element) -> SharedShadowNode {
        let children = self.nodes(&element.children);
        let cached = self
            .element_props
            .get(&element.tag)
            .filter(|(raw, _)| *raw == element.props)
            .map(|(_, props)| Arc::clone(props));
        let props = match cached {
            Some(props) => props,
            None => {
                let props = self.props(&element.props);
                self.element_props
                    .insert(element.tag, (element.props.clone(), Arc::clone(&props)));
                props
            }
        };
        self.view_node(element.tag, props, children)
    }

    /// Builds every element of `elements`.
    pub fn nodes(&mut self, elements: &[Element]) -> Vec<SharedShadowNode> {
        elements.iter().map(|element| self.node(element)).collect()
    }

    /// Returns an unsealed, never laid out root holding `children`.
    #[must_use]
    pub fn root_with(&self, children: Vec<SharedShadowNode>) -> ShadowNode {
        self.empty_root
            .clone_with(ShadowNodeFragment::children(children))
    }

    /// Builds `elements` under a fresh root.
    pub fn root(&mut self, elements: &[Element]) -> ShadowNode {
        let children = self.nodes(elements);
        self.root_with(children)
    }

    /// Lays `root` out with [`StubLayoutEngine`] and seals it.
    #[must_use]
    pub fn commit_ready(&self, mut root: ShadowNode) -> SharedShadowNode {
        let engine = StubLayoutEngine;
        let constraints = RootProps::of(&root)
            .map(|props| props.layout_constraints)
            .unwrap_or_default();
        engine.layout_if_needed(&mut root, &constraints, &LayoutContext::default());
        root.seal_recursive();
        Arc::new(root)
    }
}
