// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Merging native state progress into declarative commits.
//!
//! Native code can commit newer state revisions while a declarative producer
//! is still building a tree from older ones. Before such a tree is committed,
//! every stale state in it is replaced with its family's most recent one.
//!
//! Subtrees shared with the current revision are skipped: every state in the
//! current revision was the most recent one when it was committed.

use std::sync::Arc;

use crate::node::{ShadowNode, ShadowNodeFragment, SharedShadowNode};

/// Returns a clone of `node` whose states are all the most recent committed
/// ones, or `None` if nothing was stale.
///
/// `base` is the version of `node` in the current revision, if any. Children
/// are matched against it by index and family.
#[must_use]
pub(crate) fn progress_state(node: &ShadowNode, base: Option<&ShadowNode>) -> Option<ShadowNode> {
    let newer_state = node
        .state()
        .and_then(|state| node.family().newer_state_than(state));

    let base_children: &[SharedShadowNode] = base
        .map(|base| base.children().as_slice())
        .unwrap_or_default();
    let mut new_children: Option<Vec<SharedShadowNode>> = None;
    for (index, child) in node.children().iter().enumerate() {
        let base_child = base_children
            .get(index)
            .filter(|base_child| base_child.same_family(child));
        if base_child.is_some_and(|base_child| Arc::ptr_eq(base_child, child)) {
            continue;
        }
        if let Some(progressed) = progress_state(child, base_child.map(AsRef::as_ref)) {
            let children = new_children.get_or_insert_with(|| node.children().to_vec());
            children[index] = Arc::new(progressed);
        }
    }

    if newer_state.is_none() && new_children.is_none() {
        return None;
    }
    Some(node.clone_with(ShadowNodeFragment {
        state: newer_state,
        children: new_children.map(Arc::new),
        ..ShadowNodeFragment::default()
    }))
}

/// Records every state of `node` that is not shared with `base` as its
/// family's most recent state, where newer.
pub(crate) fn commit_states(node: &ShadowNode, base: Option<&ShadowNode>) {
    if let Some(state) = node.state() {
        node.family().commit_state(state);
    }
    let base_children: &[SharedShadowNode] = base
        .map(|base| base.children().as_slice())
        .unwrap_or_default();
    for (index, child) in node.children().iter().enumerate() {
        let base_child = base_children
            .get(index)
            .filter(|base_child| base_child.same_family(child));
        if base_child.is_some_and(|base_child| Arc::ptr_eq(base_child, child)) {
            continue;
        }
        commit_states(child, base_child.map(AsRef::as_ref));
    }
}
