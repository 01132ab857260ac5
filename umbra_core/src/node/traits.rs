// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node trait bits.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// A small bitset describing how a node participates in layout and mounting.
///
/// Bits are combined with `|`:
///
/// ```
/// use umbra_core::node::ShadowNodeTraits;
///
/// let traits = ShadowNodeTraits::LAYOUT_ONLY | ShadowNodeTraits::MEASURABLE;
/// assert!(traits.contains(ShadowNodeTraits::LAYOUT_ONLY));
/// assert!(!traits.contains(ShadowNodeTraits::ROOT));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShadowNodeTraits(u32);

impl ShadowNodeTraits {
    /// No traits set.
    pub const NONE: Self = Self(0);
    /// The node produces no mounted view and is flattened away when slicing.
    pub const LAYOUT_ONLY: Self = Self(1 << 0);
    /// The layout engine must ask the node to measure its own content.
    pub const MEASURABLE: Self = Self(1 << 1);
    /// The node is the root of a surface.
    pub const ROOT: Self = Self(1 << 2);
    /// The node was produced by a native state update rather than a
    /// declarative commit.
    pub const CLONED_BY_NATIVE_STATE_UPDATE: Self = Self(1 << 3);

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns a copy with the bits of `other` set.
    #[inline]
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns a copy with the bits of `other` cleared.
    #[inline]
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Sets or clears the bits of `other`.
    #[inline]
    pub fn set(&mut self, other: Self, value: bool) {
        *self = if value {
            self.with(other)
        } else {
            self.without(other)
        };
    }
}

impl BitOr for ShadowNodeTraits {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl BitOrAssign for ShadowNodeTraits {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.with(rhs);
    }
}

impl fmt::Debug for ShadowNodeTraits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(ShadowNodeTraits, &str); 4] = [
            (ShadowNodeTraits::LAYOUT_ONLY, "LAYOUT_ONLY"),
            (ShadowNodeTraits::MEASURABLE, "MEASURABLE"),
            (ShadowNodeTraits::ROOT, "ROOT"),
            (
                ShadowNodeTraits::CLONED_BY_NATIVE_STATE_UPDATE,
                "CLONED_BY_NATIVE_STATE_UPDATE",
            ),
        ];
        let mut set = f.debug_set();
        for (bit, name) in NAMES {
            if self.contains(bit) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}
