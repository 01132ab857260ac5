// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Revisioned native state.
//!
//! A [`State`] is an immutable snapshot of data owned by the native side of a
//! component (a scroll offset, a measured text layout). New revisions are
//! created through the node's [`ShadowNodeFamily`] and can race ahead of the
//! declarative commits; the family remembers the most recent committed
//! revision so commits built on stale trees can be reconciled.

use core::any::Any;
use core::fmt;
use std::sync::{Arc, Weak};

use super::family::ShadowNodeFamily;

/// Opaque payload carried by a [`State`].
pub trait StateData: Any + Send + Sync + fmt::Debug {}

/// Reference-counted handle to state data.
pub type SharedStateData = Arc<dyn StateData>;

/// One immutable revision of a node's native state.
pub struct State {
    revision: u64,
    data: SharedStateData,
    family: Weak<ShadowNodeFamily>,
}

impl State {
    pub(crate) fn new(revision: u64, data: SharedStateData, family: Weak<ShadowNodeFamily>) -> Self {
        Self {
            revision,
            data,
            family,
        }
    }

    /// Monotonic revision number within the owning family, starting at 1.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the payload.
    #[must_use]
    pub fn data(&self) -> &SharedStateData {
        &self.data
    }

    /// Returns the payload if it is a `T`.
    #[must_use]
    pub fn data_as<T: StateData>(&self) -> Option<&T> {
        let any: &dyn Any = self.data.as_ref();
        any.downcast_ref::<T>()
    }

    /// Returns the owning family if it is still alive.
    #[must_use]
    pub fn family(&self) -> Option<Arc<ShadowNodeFamily>> {
        self.family.upgrade()
    }

    /// Returns the most recently committed revision of this state, which is
    /// `self` when nothing newer has been committed.
    #[must_use]
    pub fn most_recent(self: &Arc<Self>) -> Arc<Self> {
        self.family()
            .and_then(|family| family.most_recent_state())
            .filter(|recent| recent.revision > self.revision)
            .unwrap_or_else(|| Arc::clone(self))
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("revision", &self.revision)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::id::{ComponentHandle, SurfaceId, Tag};

    #[derive(Debug, PartialEq)]
    struct ScrollOffset(f64);
    impl StateData for ScrollOffset {}

    fn family() -> Arc<ShadowNodeFamily> {
        ShadowNodeFamily::new(Tag(3), SurfaceId(1), "ScrollView", ComponentHandle(9), None)
    }

    #[test]
    fn revisions_increase_per_family() {
        let family = family();
        let first = family.create_state(Arc::new(ScrollOffset(0.0)));
        let second = family.create_state(Arc::new(ScrollOffset(10.0)));
        assert_eq!(first.revision(), 1);
        assert_eq!(second.revision(), 2);
        assert_eq!(second.data_as::<ScrollOffset>(), Some(&ScrollOffset(10.0)));
    }

    #[test]
    fn most_recent_follows_committed_revision() {
        let family = family();
        let first = family.create_state(Arc::new(ScrollOffset(0.0)));
        let second = family.create_state(Arc::new(ScrollOffset(5.0)));
        assert!(Arc::ptr_eq(&first.most_recent(), &first));

        family.commit_state(&second);
        assert!(Arc::ptr_eq(&first.most_recent(), &second));
        assert!(Arc::ptr_eq(&second.most_recent(), &second));
    }

    #[test]
    fn dropped_family_falls_back_to_self() {
        let state = family().create_state(Arc::new(ScrollOffset(1.0)));
        assert!(state.family().is_none());
        assert!(Arc::ptr_eq(&state.most_recent(), &state));
    }
}
