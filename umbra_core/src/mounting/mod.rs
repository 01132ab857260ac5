// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! From committed trees to mounting instructions.
//!
//! - [`slice_child_shadow_node_view_pairs`] flattens layout-only nodes away
//!   and yields what a parent actually mounts.
//! - [`calculate_shadow_view_mutations`] diffs two roots into an ordered list
//!   of [`ShadowViewMutation`]s.
//! - [`ShadowTree`] serializes commits and forwards each diff to its
//!   [`MountingCoordinator`] as a [`MountingTransaction`].
//! - [`StubViewTree`] is an in-memory mount target that rejects inconsistent
//!   instructions.

mod coordinator;
mod differentiator;
mod mutation;
mod reconcile;
mod shadow_tree;
mod shadow_view;
mod stub;

pub use coordinator::{MountingCoordinator, MountingTransaction};
pub use differentiator::{
    DifferentiatorMode, calculate_shadow_view_mutations, calculate_shadow_view_mutations_with_mode,
};
pub use mutation::{MutationKind, ShadowViewMutation, ShadowViewMutationList, count_by_kind};
pub use shadow_tree::{
    CommitMode, CommitOptions, CommitStatus, ShadowTree, ShadowTreeDelegate, ShadowTreeRevision,
};
pub use shadow_view::{ShadowView, ShadowViewNodePair, slice_child_shadow_node_view_pairs};
pub use stub::{StubView, StubViewTree, build_stub_view_tree_without_differentiator};
