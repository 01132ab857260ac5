// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node, surface, and component identity types.

use core::fmt;

/// Identity of one logical UI element.
///
/// A tag survives cloning: every historical version of the same logical node
/// carries the same tag. Tags are unique within a surface at any instant.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tag(pub i32);

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a surface (one independently rendered root).
///
/// The root node of a surface uses the surface id as its tag.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SurfaceId(pub i32);

impl SurfaceId {
    /// Returns the tag of this surface's root node.
    #[inline]
    #[must_use]
    pub const fn root_tag(self) -> Tag {
        Tag(self.0)
    }
}

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({})", self.0)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity of a component kind, assigned by its descriptor.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ComponentHandle(pub u64);

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentHandle({:#x})", self.0)
    }
}

/// Human-readable name of a component kind (e.g. `"View"`).
pub type ComponentName = &'static str;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_tag_matches_surface_id() {
        assert_eq!(SurfaceId(11).root_tag(), Tag(11));
    }

    #[test]
    fn debug_formats() {
        assert_eq!(format!("{:?}", Tag(5)), "Tag(5)");
        assert_eq!(format!("{:?}", SurfaceId(1)), "SurfaceId(1)");
        assert_eq!(format!("{:?}", ComponentHandle(255)), "ComponentHandle(0xff)");
    }
}
