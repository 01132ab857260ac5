// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The generic view component.

use std::sync::Arc;

use crate::layout::DisplayType;
use crate::node::{
    ComponentHandle, ComponentName, Props, RawProps, ShadowNodeTraits, SharedProps, downcast_props,
};

use super::descriptor::{ComponentDescriptor, PropsParserContext};

/// Handle of the built-in `View` kind.
pub const VIEW_COMPONENT_HANDLE: ComponentHandle = ComponentHandle(2);

/// Props shared by every view-like component.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewProps {
    /// Absolute x offset within the parent.
    pub left: Option<f64>,
    /// Absolute y offset within the parent.
    pub top: Option<f64>,
    /// Fixed width.
    pub width: Option<f64>,
    /// Fixed height.
    pub height: Option<f64>,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f64,
    /// Packed ARGB background color.
    pub background_color: Option<u32>,
    /// Identifier for native lookups; keeps the view mounted.
    pub native_id: Option<String>,
    /// Whether the view may be flattened away when it draws nothing.
    pub collapsable: bool,
    /// Drawing order among siblings.
    pub z_index: i32,
    /// Display type.
    pub display: DisplayType,
}

impl Default for ViewProps {
    fn default() -> Self {
        Self {
            left: None,
            top: None,
            width: None,
            height: None,
            opacity: 1.0,
            background_color: None,
            native_id: None,
            collapsable: true,
            z_index: 0,
            display: DisplayType::Flex,
        }
    }
}

impl Props for ViewProps {}

impl ViewProps {
    /// Parses `raw` on top of `base`. Keys absent from `raw` keep their base
    /// value.
    #[must_use]
    pub fn parse(base: &Self, raw: &RawProps) -> Self {
        let mut props = base.clone();
        let number = |key: &str, fallback: Option<f64>| match raw.get(key) {
            Some(value) if value.is_null() => None,
            Some(value) => value.as_f64().or(fallback),
            None => fallback,
        };
        props.left = number("left", base.left);
        props.top = number("top", base.top);
        props.width = number("width", base.width);
        props.height = number("height", base.height);
        if let Some(opacity) = raw.f64("opacity") {
            props.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(color) = raw.get("backgroundColor") {
            props.background_color = color.as_u64().and_then(|c| u32::try_from(c).ok());
        }
        if let Some(id) = raw.get("nativeID") {
            props.native_id = id.as_str().map(str::to_owned);
        }
        if let Some(collapsable) = raw.bool("collapsable") {
            props.collapsable = collapsable;
        }
        if let Some(z_index) = raw.get("zIndex") {
            props.z_index = z_index
                .as_i64()
                .and_then(|z| i32::try_from(z).ok())
                .unwrap_or(0);
        }
        if let Some(display) = raw.str("display") {
            props.display = match display {
                "none" => DisplayType::None,
                _ => DisplayType::Flex,
            };
        }
        props
    }

    /// Returns `true` if a view with these props draws nothing of its own
    /// and can be flattened into its parent.
    #[must_use]
    pub fn is_layout_only(&self) -> bool {
        self.collapsable
            && self.opacity >= 1.0
            && self.background_color.is_none()
            && self.native_id.is_none()
            && self.z_index == 0
            && self.display == DisplayType::Flex
    }
}

/// Descriptor for view-like kinds whose props are [`ViewProps`].
///
/// One instance serves one component name; register several to get several
/// view-like kinds (`"View"`, `"Image"`, ...).
#[derive(Clone, Copy, Debug)]
pub struct ViewComponentDescriptor {
    name: ComponentName,
    handle: ComponentHandle,
}

impl ViewComponentDescriptor {
    /// Creates a descriptor for a view-like kind.
    #[must_use]
    pub const fn new(name: ComponentName, handle: ComponentHandle) -> Self {
        Self { name, handle }
    }

    /// The built-in `View` kind.
    #[must_use]
    pub const fn view() -> Self {
        Self::new("View", VIEW_COMPONENT_HANDLE)
    }
}

impl ComponentDescriptor for ViewComponentDescriptor {
    fn component_handle(&self) -> ComponentHandle {
        self.handle
    }

    fn component_name(&self) -> ComponentName {
        self.name
    }

    fn default_props(&self) -> SharedProps {
        Arc::new(ViewProps::default())
    }

    fn clone_props(
        &self,
        _context: &PropsParserContext<'_>,
        base: Option<&SharedProps>,
        raw: &RawProps,
    ) -> SharedProps {
        let defaults = ViewProps::default();
        let base = base
            .and_then(downcast_props::<ViewProps>)
            .unwrap_or(&defaults);
        Arc::new(ViewProps::parse(base, raw))
    }

    fn traits_for_props(&self, props: &SharedProps) -> ShadowNodeTraits {
        match downcast_props::<ViewProps>(props) {
            Some(view) if view.is_layout_only() => ShadowNodeTraits::LAYOUT_ONLY,
            _ => ShadowNodeTraits::NONE,
        }
    }

    fn order_index_for_props(&self, props: &SharedProps) -> i32 {
        downcast_props::<ViewProps>(props).map_or(0, |view| view.z_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::descriptor::ContextContainer;
    use crate::node::{ShadowNodeFragment, SurfaceId, Tag};
    use serde_json::json;

    fn parse(raw: serde_json::Value) -> SharedProps {
        let container = ContextContainer::new();
        let context = PropsParserContext {
            surface_id: SurfaceId(1),
            context_container: &container,
        };
        ViewComponentDescriptor::view().clone_props(&context, None, &RawProps::from(raw))
    }

    #[test]
    fn plain_view_is_layout_only() {
        let props = parse(json!({ "left": 10, "width": 50 }));
        let traits = ViewComponentDescriptor::view().traits_for_props(&props);
        assert!(traits.contains(ShadowNodeTraits::LAYOUT_ONLY));
    }

    #[test]
    fn visual_props_keep_view_mounted() {
        for raw in [
            json!({ "backgroundColor": 0xff00_00ff_u32 }),
            json!({ "opacity": 0.5 }),
            json!({ "nativeID": "header" }),
            json!({ "collapsable": false }),
            json!({ "zIndex": 2 }),
        ] {
            let props = parse(raw.clone());
            let traits = ViewComponentDescriptor::view().traits_for_props(&props);
            assert!(!traits.contains(ShadowNodeTraits::LAYOUT_ONLY), "{raw}");
        }
    }

    #[test]
    fn parse_keeps_base_values() {
        let base = ViewProps::parse(&ViewProps::default(), &RawProps::from(json!({ "left": 4, "top": 8 })));
        let next = ViewProps::parse(&base, &RawProps::from(json!({ "top": null, "opacity": 3.0 })));
        assert_eq!(next.left, Some(4.0));
        assert_eq!(next.top, None);
        assert!((next.opacity - 1.0).abs() < f64::EPSILON, "opacity is clamped");
    }

    #[test]
    fn clone_recomputes_traits_and_order() {
        let descriptor = ViewComponentDescriptor::view();
        let family = descriptor.create_family(Tag(3), SurfaceId(1), None);
        let node = descriptor.create_shadow_node(ShadowNodeFragment::default(), family);
        assert!(node.is_layout_only());

        let clone = descriptor.clone_shadow_node(
            &node,
            ShadowNodeFragment::props(parse(json!({ "zIndex": 4 }))),
        );
        assert!(!clone.is_layout_only());
        assert_eq!(clone.order_index(), 4);
    }
}
