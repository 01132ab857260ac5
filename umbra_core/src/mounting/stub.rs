// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory mount target that validates every instruction.

use std::collections::HashMap;

use crate::error::MutationError;
use crate::node::{ShadowNode, Tag};

use super::mutation::ShadowViewMutation;
use super::shadow_view::{ShadowView, slice_child_shadow_node_view_pairs};

/// One mounted view.
#[derive(Clone, Debug, PartialEq)]
pub struct StubView {
    /// The last view applied.
    pub view: ShadowView,
    /// Parent, if attached.
    pub parent_tag: Option<Tag>,
    /// Mounted children in order.
    pub children: Vec<Tag>,
}

/// A mounted view hierarchy kept in memory.
///
/// Applying instructions checks that each one is consistent with the current
/// hierarchy. Two stubs are equal when they hold the same views with the same
/// structure, which makes a stub built directly from a tree the reference a
/// diff-driven stub is compared against.
#[derive(Clone, Debug, PartialEq)]
pub struct StubViewTree {
    root_tag: Tag,
    views: HashMap<Tag, StubView>,
}

impl StubViewTree {
    /// Creates a tree holding only the root view.
    #[must_use]
    pub fn new(root: ShadowView) -> Self {
        let root_tag = root.tag;
        let mut views = HashMap::new();
        views.insert(
            root_tag,
            StubView {
                view: root,
                parent_tag: None,
                children: Vec::new(),
            },
        );
        Self { root_tag, views }
    }

    /// Returns the root tag.
    #[must_use]
    pub fn root_tag(&self) -> Tag {
        self.root_tag
    }

    /// Returns the view for `tag`.
    #[must_use]
    pub fn get(&self, tag: Tag) -> Option<&StubView> {
        self.views.get(&tag)
    }

    /// Returns the mounted children of `tag`.
    #[must_use]
    pub fn children_of(&self, tag: Tag) -> &[Tag] {
        self.views
            .get(&tag)
            .map(|v| v.children.as_slice())
            .unwrap_or_default()
    }

    /// Returns the number of views, including detached ones and the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Always `false`: the root is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Applies `mutations` in order, stopping at the first inconsistent one.
    ///
    /// # Errors
    ///
    /// Returns the first instruction's inconsistency; instructions before it
    /// stay applied.
    pub fn mutate(&mut self, mutations: &[ShadowViewMutation]) -> Result<(), MutationError> {
        mutations.iter().try_for_each(|m| self.apply(m))
    }

    fn apply(&mut self, mutation: &ShadowViewMutation) -> Result<(), MutationError> {
        match mutation {
            ShadowViewMutation::Create { new } => {
                if self.views.contains_key(&new.tag) {
                    return Err(MutationError::AlreadyExists(new.tag));
                }
                self.views.insert(
                    new.tag,
                    StubView {
                        view: new.clone(),
                        parent_tag: None,
                        children: Vec::new(),
                    },
                );
            }
            ShadowViewMutation::Delete { old } => {
                let view = self.view(old.tag)?;
                if let Some(parent) = view.parent_tag {
                    return Err(MutationError::StillAttached {
                        tag: old.tag,
                        parent,
                    });
                }
                if !view.children.is_empty() {
                    return Err(MutationError::HasChildren(old.tag));
                }
                self.views.remove(&old.tag);
            }
            ShadowViewMutation::Insert {
                parent_tag,
                new,
                index,
            } => {
                if let Some(parent) = self.view(new.tag)?.parent_tag {
                    return Err(MutationError::StillAttached {
                        tag: new.tag,
                        parent,
                    });
                }
                let parent = self.view_mut(*parent_tag)?;
                if *index > parent.children.len() {
                    return Err(MutationError::IndexOutOfRange {
                        parent: *parent_tag,
                        index: *index,
                        len: parent.children.len(),
                    });
                }
                parent.children.insert(*index, new.tag);
                let child = self.view_mut(new.tag)?;
                child.parent_tag = Some(*parent_tag);
                child.view = new.clone();
            }
            ShadowViewMutation::Remove {
                parent_tag,
                old,
                index,
            } => {
                self.view(old.tag)?;
                let parent = self.view_mut(*parent_tag)?;
                let Some(&found) = parent.children.get(*index) else {
                    return Err(MutationError::IndexOutOfRange {
                        parent: *parent_tag,
                        index: *index,
                        len: parent.children.len(),
                    });
                };
                if found != old.tag {
                    return Err(MutationError::ChildMismatch {
                        parent: *parent_tag,
                        index: *index,
                        expected: old.tag,
                        found,
                    });
                }
                parent.children.remove(*index);
                self.view_mut(old.tag)?.parent_tag = None;
            }
            ShadowViewMutation::Update { new, .. } => {
                self.view_mut(new.tag)?.view = new.clone();
            }
        }
        Ok(())
    }

    fn view(&self, tag: Tag) -> Result<&StubView, MutationError> {
        self.views.get(&tag).ok_or(MutationError::UnknownView(tag))
    }

    fn view_mut(&mut self, tag: Tag) -> Result<&mut StubView, MutationError> {
        self.views
            .get_mut(&tag)
            .ok_or(MutationError::UnknownView(tag))
    }
}

/// Builds the mounted hierarchy of `root` directly, without diffing.
#[must_use]
pub fn build_stub_view_tree_without_differentiator(root: &ShadowNode) -> StubViewTree {
    let mut stub = StubViewTree::new(ShadowView::new(root));
    add_children(&mut stub, root.tag(), root);
    stub
}

fn add_children(stub: &mut StubViewTree, parent_tag: Tag, node: &ShadowNode) {
    let pairs = slice_child_shadow_node_view_pairs(node);
    let mut children = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let tag = pair.view.tag;
        children.push(tag);
        stub.views.insert(
            tag,
            StubView {
                view: pair.view,
                parent_tag: Some(parent_tag),
                children: Vec::new(),
            },
        );
        add_children(stub, tag, &pair.node);
    }
    if let Some(parent) = stub.views.get_mut(&parent_tag) {
        parent.children = children;
    }
}
