// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-revision node identity.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::event::EventEmitter;
use super::id::{ComponentHandle, ComponentName, SurfaceId, Tag};
use super::state::{SharedStateData, State};

/// Identity shared by every version of one logical node.
///
/// Two shadow nodes describe the same logical element exactly when they point
/// at the same family allocation. The family also owns the pieces of a node
/// that live longer than any single version: its event emitter and the
/// most-recent-state cell.
pub struct ShadowNodeFamily {
    tag: Tag,
    surface_id: SurfaceId,
    component_name: ComponentName,
    component_handle: ComponentHandle,
    event_emitter: Option<Arc<EventEmitter>>,
    most_recent_state: Mutex<Option<Arc<State>>>,
    last_state_revision: AtomicU64,
}

impl ShadowNodeFamily {
    /// Creates a new family.
    #[must_use]
    pub fn new(
        tag: Tag,
        surface_id: SurfaceId,
        component_name: ComponentName,
        component_handle: ComponentHandle,
        event_emitter: Option<Arc<EventEmitter>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            tag,
            surface_id,
            component_name,
            component_handle,
            event_emitter,
            most_recent_state: Mutex::new(None),
            last_state_revision: AtomicU64::new(0),
        })
    }

    /// Returns the node tag.
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the surface the node belongs to.
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Returns the component name.
    #[must_use]
    pub fn component_name(&self) -> ComponentName {
        self.component_name
    }

    /// Returns the component handle.
    #[must_use]
    pub fn component_handle(&self) -> ComponentHandle {
        self.component_handle
    }

    /// Returns the shared event emitter.
    #[must_use]
    pub fn event_emitter(&self) -> Option<&Arc<EventEmitter>> {
        self.event_emitter.as_ref()
    }

    /// Creates the next state revision for this family.
    ///
    /// The new state is not visible through [`most_recent_state`] until a
    /// tree containing it is committed.
    ///
    /// [`most_recent_state`]: Self::most_recent_state
    #[must_use]
    pub fn create_state(self: &Arc<Self>, data: SharedStateData) -> Arc<State> {
        let revision = self.last_state_revision.fetch_add(1, Ordering::Relaxed) + 1;
        Arc::new(State::new(revision, data, Arc::downgrade(self)))
    }

    /// Returns the most recently committed state, if any.
    #[must_use]
    pub fn most_recent_state(&self) -> Option<Arc<State>> {
        self.most_recent_state.lock().clone()
    }

    /// Records `state` as committed if it is newer than the current one.
    pub fn commit_state(&self, state: &Arc<State>) {
        let mut slot = self.most_recent_state.lock();
        let newer = slot
            .as_ref()
            .is_none_or(|current| current.revision() < state.revision());
        if newer {
            *slot = Some(Arc::clone(state));
        }
    }

    /// Returns the committed state if it is newer than `state`.
    #[must_use]
    pub fn newer_state_than(&self, state: &State) -> Option<Arc<State>> {
        self.most_recent_state
            .lock()
            .as_ref()
            .filter(|recent| recent.revision() > state.revision())
            .cloned()
    }
}

impl fmt::Debug for ShadowNodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowNodeFamily")
            .field("tag", &self.tag)
            .field("surface_id", &self.surface_id)
            .field("component_name", &self.component_name)
            .finish_non_exhaustive()
    }
}
