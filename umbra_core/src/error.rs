// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Contract violations are also `debug_assert!`ed at the call site; in
//! release builds the operation is skipped and one of these is returned.

use crate::node::{SurfaceId, Tag};
use crate::surface::SurfaceStatus;

/// A [`SurfaceHandler`](crate::surface::SurfaceHandler) operation was called
/// in the wrong state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The surface is not in the state the operation requires.
    #[error("surface {surface_id} is {actual:?}, expected {expected:?}")]
    InvalidStatus {
        /// The surface.
        surface_id: SurfaceId,
        /// Required status.
        expected: SurfaceStatus,
        /// Actual status.
        actual: SurfaceStatus,
    },
    /// The surface is already attached to a UI manager.
    #[error("surface {0} is already registered")]
    AlreadyRegistered(SurfaceId),
    /// The surface is not attached to a UI manager.
    #[error("surface {0} is not registered")]
    NotRegistered(SurfaceId),
}

/// A [`UiManager`](crate::ui_manager::UiManager) lookup failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UiManagerError {
    /// No descriptor is registered under the component name.
    #[error("no component named {0:?}")]
    UnknownComponent(String),
    /// No shadow tree is registered for the surface.
    #[error("no running surface {0}")]
    UnknownSurface(SurfaceId),
}

/// An instruction could not be applied to a
/// [`StubViewTree`](crate::mounting::StubViewTree).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// `Create` for a view that exists.
    #[error("view {0} already exists")]
    AlreadyExists(Tag),
    /// Any instruction naming a view that does not exist.
    #[error("view {0} does not exist")]
    UnknownView(Tag),
    /// `Delete` or `Insert` of a view that is still attached.
    #[error("view {tag} is still attached to {parent}")]
    StillAttached {
        /// The view.
        tag: Tag,
        /// Its current parent.
        parent: Tag,
    },
    /// `Delete` of a view that still has children.
    #[error("view {0} still has children")]
    HasChildren(Tag),
    /// `Insert` or `Remove` at an index past the end of the child list.
    #[error("index {index} out of range for {len} children of {parent}")]
    IndexOutOfRange {
        /// The parent.
        parent: Tag,
        /// Requested index.
        index: usize,
        /// Number of children.
        len: usize,
    },
    /// `Remove` naming a view that is not at the given index.
    #[error("child {index} of {parent} is {found}, not {expected}")]
    ChildMismatch {
        /// The parent.
        parent: Tag,
        /// Requested index.
        index: usize,
        /// Tag named by the instruction.
        expected: Tag,
        /// Tag actually at the index.
        found: Tag,
    },
}
