// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Seeded random trees and edits.
//!
//! [`random_tree`] grows a tree of views with a mix of mounted and
//! layout-only nodes. [`random_edit`] applies one structural or props change
//! to a tree and returns the new version, sharing every untouched subtree.
//! Both take any [`Rng`], so tests stay reproducible from a seed.

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use umbra_core::node::{RawProps, ShadowNode, ShadowNodeFragment, SharedShadowNode};

use crate::builder::TreeBuilder;

/// The edits [`random_edit`] chooses from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edit {
    /// Remove a subtree.
    Remove,
    /// Insert a new subtree.
    Insert,
    /// Move a child to another position under the same parent.
    Reorder,
    /// Move a subtree under another parent.
    Reparent,
    /// Replace the props of a node, possibly toggling flattening.
    ChangeProps,
}

impl Edit {
    /// Every edit.
    pub const ALL: [Self; 5] = [
        Self::Remove,
        Self::Insert,
        Self::Reorder,
        Self::Reparent,
        Self::ChangeProps,
    ];
}

/// Random view props: a frame, plus a background or native id half of the
/// time so the view stays mounted.
pub fn random_props<R: Rng + ?Sized>(rng: &mut R) -> RawProps {
    let mut props = RawProps::new()
        .with("left", rng.gen_range(0..50_i32))
        .with("top", rng.gen_range(0..50_i32))
        .with("width", rng.gen_range(1..200_i32))
        .with("height", rng.gen_range(1..200_i32));
    match rng.gen_range(0..4) {
        0 => props = props.with("backgroundColor", rng.gen_range(0..=0xffff_ffff_u32)),
        1 => props = props.with("nativeID", format!("n{}", rng.gen_range(0..1000_u32))),
        _ => {}
    }
    props
}

/// Grows a subtree of at most `budget` nodes with fresh tags.
fn random_subtree<R: Rng + ?Sized>(
    rng: &mut R,
    builder: &mut TreeBuilder,
    budget: &mut usize,
    depth: usize,
) -> SharedShadowNode {
    *budget = budget.saturating_sub(1);
    let tag = builder.next_tag();
    let mut children = Vec::new();
    if depth < 4 {
        let fan_out = rng.gen_range(0..4);
        for _ in 0..fan_out {
            if *budget == 0 {
                break;
            }
            children.push(random_subtree(rng, builder, budget, depth + 1));
        }
    }
    let props = builder.props(&random_props(rng));
    builder.view_node(tag, props, children)
}

/// Builds an unsealed root holding a random forest of about `node_count`
/// nodes.
pub fn random_tree<R: Rng + ?Sized>(
    rng: &mut R,
    builder: &mut TreeBuilder,
    node_count: usize,
) -> ShadowNode {
    let mut budget = node_count;
    let mut children = Vec::new();
    while budget > 0 {
        children.push(random_subtree(rng, builder, &mut budget, 1));
    }
    builder.root_with(children)
}

/// A mutable mirror of a tree, rebuilt into shared nodes once edited.
struct Draft {
    node: SharedShadowNode,
    replaced: bool,
    children: Vec<Draft>,
}

impl Draft {
    fn new(node: &SharedShadowNode) -> Self {
        Self {
            node: Arc::clone(node),
            replaced: false,
            children: node.children().iter().map(Self::new).collect(),
        }
    }

    /// Paths of every node below this one, parents before children.
    fn paths(&self, prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        for (index, child) in self.children.iter().enumerate() {
            prefix.push(index);
            out.push(prefix.clone());
            child.paths(prefix, out);
            prefix.pop();
        }
    }

    fn at(&mut self, path: &[usize]) -> &mut Self {
        path.iter()
            .fold(self, |draft, &index| &mut draft.children[index])
    }

    fn finish(self) -> SharedShadowNode {
        let children: Vec<SharedShadowNode> =
            self.children.into_iter().map(Self::finish).collect();
        let untouched = !self.replaced
            && children.len() == self.node.children().len()
            && children
                .iter()
                .zip(self.node.children().iter())
                .all(|(built, old)| Arc::ptr_eq(built, old));
        if untouched {
            return self.node;
        }
        Arc::new(
            self.node
                .clone_with(ShadowNodeFragment::children(children)),
        )
    }
}

/// Applies `edit` to `root` and returns the new version, or `None` if the
/// tree has no place the edit applies to.
pub fn apply_edit<R: Rng + ?Sized>(
    rng: &mut R,
    builder: &mut TreeBuilder,
    root: &ShadowNode,
    edit: Edit,
) -> Option<ShadowNode> {
    let mut draft = Draft {
        node: Arc::new(root.clone_with(ShadowNodeFragment::default())),
        replaced: false,
        children: root.children().iter().map(Draft::new).collect(),
    };
    let mut paths = Vec::new();
    draft.paths(&mut Vec::new(), &mut paths);

    match edit {
        Edit::Remove => {
            let path = paths.choose(rng)?;
            let (last, parent) = path.split_last()?;
            draft.at(parent).children.remove(*last);
        }
        Edit::Insert => {
            let parent_path = if paths.is_empty() || rng.gen_bool(0.3) {
                Vec::new()
            } else {
                paths.choose(rng)?.clone()
            };
            let mut budget = rng.gen_range(1..4_usize);
            let subtree = random_subtree(rng, builder, &mut budget, 2);
            let parent = draft.at(&parent_path);
            let index = rng.gen_range(0..=parent.children.len());
            parent.children.insert(index, Draft::new(&subtree));
        }
        Edit::Reorder => {
            let mut parents: Vec<Vec<usize>> = paths.clone();
            parents.push(Vec::new());
            parents.retain(|path| {
                let mut probe = &draft;
                for &index in path {
                    probe = &probe.children[index];
                }
                probe.children.len() >= 2
            });
            let parent = draft.at(parents.choose(rng)?);
            let from = rng.gen_range(0..parent.children.len());
            let moved = parent.children.remove(from);
            let mut to = rng.gen_range(0..=parent.children.len());
            if to == from {
                to = (to + 1) % (parent.children.len() + 1);
            }
            parent.children.insert(to, moved);
        }
        Edit::Reparent => {
            let path = paths.choose(rng)?.clone();
            let (last, parent) = path.split_last()?;
            let moved = draft.at(parent).children.remove(*last);
            let mut targets = Vec::new();
            draft.paths(&mut Vec::new(), &mut targets);
            targets.push(Vec::new());
            let target = draft.at(targets.choose(rng)?);
            let index = rng.gen_range(0..=target.children.len());
            target.children.insert(index, moved);
        }
        Edit::ChangeProps => {
            let path = paths.choose(rng)?;
            let target = draft.at(path);
            let raw = if rng.gen_bool(0.3) {
                RawProps::new()
            } else {
                random_props(rng)
            };
            target.node = Arc::new(builder.with_new_props(&target.node, &raw));
            target.replaced = true;
        }
    }

    let children = draft.children.into_iter().map(Draft::finish).collect();
    Some(root.clone_with(ShadowNodeFragment::children(children)))
}

/// Applies one randomly chosen edit that fits `root`.
///
/// Returns an unsealed copy of `root` if no edit fits (an empty tree can only
/// grow, so this only happens for edits other than insertion).
pub fn random_edit<R: Rng + ?Sized>(
    rng: &mut R,
    builder: &mut TreeBuilder,
    root: &ShadowNode,
) -> ShadowNode {
    let edit = Edit::ALL.choose(rng).copied().unwrap_or(Edit::Insert);
    apply_edit(rng, builder, root, edit)
        .or_else(|| apply_edit(rng, builder, root, Edit::Insert))
        .unwrap_or_else(|| root.clone_with(ShadowNodeFragment::default()))
}
