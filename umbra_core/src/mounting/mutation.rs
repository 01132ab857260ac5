// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mount-tree instructions produced by the differentiator.

use core::fmt;

use crate::node::Tag;

use super::shadow_view::ShadowView;

/// The kind of a [`ShadowViewMutation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// A view is created.
    Create,
    /// A view is destroyed.
    Delete,
    /// A view is attached to a parent.
    Insert,
    /// A view is detached from a parent.
    Remove,
    /// A mounted view changes.
    Update,
}

impl MutationKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Delete,
        Self::Insert,
        Self::Remove,
        Self::Update,
    ];

    /// Returns a short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Insert => "insert",
            Self::Remove => "remove",
            Self::Update => "update",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Create => 0,
            Self::Delete => 1,
            Self::Insert => 2,
            Self::Remove => 3,
            Self::Update => 4,
        }
    }
}

/// One instruction for evolving the mounted view tree.
///
/// Indices address the parent's mounted children at the moment the
/// instruction is applied, in list order.
#[derive(Clone, PartialEq)]
pub enum ShadowViewMutation {
    /// Creates the view for `new`.
    Create {
        /// The view to create.
        new: ShadowView,
    },
    /// Destroys the view for `old`. It is detached already.
    Delete {
        /// The view to destroy.
        old: ShadowView,
    },
    /// Attaches `new` to `parent_tag` at `index`.
    Insert {
        /// Parent the view is attached to.
        parent_tag: Tag,
        /// The attached view.
        new: ShadowView,
        /// Position among the parent's mounted children.
        index: usize,
    },
    /// Detaches `old` from `parent_tag` at `index`.
    Remove {
        /// Parent the view is detached from.
        parent_tag: Tag,
        /// The detached view.
        old: ShadowView,
        /// Position among the parent's mounted children.
        index: usize,
    },
    /// Changes the mounted view from `old` to `new`.
    ///
    /// The surface root's update has neither parent nor index.
    Update {
        /// Parent of the view, `None` for the root.
        parent_tag: Option<Tag>,
        /// The view before the change.
        old: ShadowView,
        /// The view after the change.
        new: ShadowView,
        /// Position among the parent's mounted children, `None` for the root.
        index: Option<usize>,
    },
}

impl ShadowViewMutation {
    /// Returns the kind of this instruction.
    #[must_use]
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Create { .. } => MutationKind::Create,
            Self::Delete { .. } => MutationKind::Delete,
            Self::Insert { .. } => MutationKind::Insert,
            Self::Remove { .. } => MutationKind::Remove,
            Self::Update { .. } => MutationKind::Update,
        }
    }

    /// Returns the tag of the view this instruction is about.
    #[must_use]
    pub fn tag(&self) -> Tag {
        match self {
            Self::Create { new } | Self::Insert { new, .. } | Self::Update { new, .. } => new.tag,
            Self::Delete { old } | Self::Remove { old, .. } => old.tag,
        }
    }

    /// Returns the parent tag, if the instruction has one.
    #[must_use]
    pub fn parent_tag(&self) -> Option<Tag> {
        match self {
            Self::Insert { parent_tag, .. } | Self::Remove { parent_tag, .. } => Some(*parent_tag),
            Self::Update { parent_tag, .. } => *parent_tag,
            Self::Create { .. } | Self::Delete { .. } => None,
        }
    }

    /// Returns the child index, if the instruction has one.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Insert { index, .. } | Self::Remove { index, .. } => Some(*index),
            Self::Update { index, .. } => *index,
            Self::Create { .. } | Self::Delete { .. } => None,
        }
    }

    /// Returns the view before the instruction, if any.
    #[must_use]
    pub fn old_view(&self) -> Option<&ShadowView> {
        match self {
            Self::Delete { old } | Self::Remove { old, .. } | Self::Update { old, .. } => Some(old),
            Self::Create { .. } | Self::Insert { .. } => None,
        }
    }

    /// Returns the view after the instruction, if any.
    #[must_use]
    pub fn new_view(&self) -> Option<&ShadowView> {
        match self {
            Self::Create { new } | Self::Insert { new, .. } | Self::Update { new, .. } => Some(new),
            Self::Delete { .. } | Self::Remove { .. } => None,
        }
    }
}

impl fmt::Debug for ShadowViewMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { new } => write!(f, "Create({})", new.tag),
            Self::Delete { old } => write!(f, "Delete({})", old.tag),
            Self::Insert {
                parent_tag,
                new,
                index,
            } => write!(f, "Insert({} -> {parent_tag} @{index})", new.tag),
            Self::Remove {
                parent_tag,
                old,
                index,
            } => write!(f, "Remove({} <- {parent_tag} @{index})", old.tag),
            Self::Update {
                parent_tag: Some(parent_tag),
                new,
                index: Some(index),
                ..
            } => write!(f, "Update({} in {parent_tag} @{index})", new.tag),
            Self::Update { new, .. } => write!(f, "Update({})", new.tag),
        }
    }
}

/// An ordered list of instructions.
pub type ShadowViewMutationList = Vec<ShadowViewMutation>;

/// Counts the instructions of each kind, indexed like [`MutationKind::ALL`].
#[must_use]
pub fn count_by_kind(mutations: &[ShadowViewMutation]) -> [usize; 5] {
    let mut counts = [0; 5];
    for mutation in mutations {
        counts[mutation.kind().index()] += 1;
    }
    counts
}
