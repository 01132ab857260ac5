// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree diffing: the minimal-ish instruction list that turns one committed
//! tree into the next.
//!
//! The differentiator works one mounted parent at a time. Both versions of
//! the parent's children are sliced (see
//! [`slice_child_shadow_node_view_pairs`]), matched by tag, and the result is
//! emitted in seven buckets that are concatenated in a fixed order:
//!
//! ```text
//!   destructive ─► update ─► remove (reversed) ─► delete ─► create ─► insert ─► downward
//! ```
//!
//! `destructive` holds teardown of whole subtrees, so destroyed views never
//! race with creations. Removes are reversed so that applying them one by one
//! against the live child list keeps every index in range. `downward` holds
//! the nested diffs of surviving children, applied once their parent is up to
//! date.
//!
//! Nodes that leave one mounted parent and appear under another in the same
//! diff are moves: they are emitted as `Remove` + `Insert` and reconciled,
//! never deleted and recreated. Detecting them needs the whole tree, so the
//! diff runs a second time when the first pass finds any.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::node::{ShadowNode, Tag};

use super::mutation::{ShadowViewMutation, ShadowViewMutationList};
use super::shadow_view::{ShadowView, ShadowViewNodePair, slice_child_shadow_node_view_pairs};

/// How sibling lists are reconciled after their common prefix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DifferentiatorMode {
    /// Insert every remaining new child, then remove every remaining old one,
    /// matching the two by tag.
    Classic,
    /// Walk both remaining lists with two cursors, keeping children that are
    /// still in order where they are. Produces far fewer instructions for
    /// insertions and single moves.
    #[default]
    OptimizedMoves,
}

/// Computes the instructions that turn the mounted form of `old_root` into
/// that of `new_root`, using the default [`DifferentiatorMode`].
///
/// Both roots must be versions of the same surface root; the function does not
/// validate its input beyond tag matching.
#[must_use]
pub fn calculate_shadow_view_mutations(
    old_root: &ShadowNode,
    new_root: &ShadowNode,
) -> ShadowViewMutationList {
    calculate_shadow_view_mutations_with_mode(DifferentiatorMode::default(), old_root, new_root)
}

/// Computes the instructions that turn the mounted form of `old_root` into
/// that of `new_root`.
#[must_use]
pub fn calculate_shadow_view_mutations_with_mode(
    mode: DifferentiatorMode,
    old_root: &ShadowNode,
    new_root: &ShadowNode,
) -> ShadowViewMutationList {
    debug_assert_eq!(
        old_root.tag(),
        new_root.tag(),
        "diffing roots of different surfaces"
    );

    let no_moves = HashMap::new();
    let mut first = Differ::new(mode, &no_moves);
    let mutations = first.run(old_root, new_root);
    let moved = first.into_moved();
    if moved.is_empty() {
        tracing::trace!(count = mutations.len(), "calculated shadow view mutations");
        return mutations;
    }

    let mut second = Differ::new(mode, &moved);
    let mut mutations = second.run(old_root, new_root);
    hoist_moved_removes(&mut mutations, &moved);
    tracing::trace!(
        count = mutations.len(),
        moves = moved.len(),
        "calculated shadow view mutations"
    );
    mutations
}

/// Per-parent output, concatenated by [`Buckets::flush_into`].
#[derive(Default)]
struct Buckets {
    destructive: ShadowViewMutationList,
    update: ShadowViewMutationList,
    remove: ShadowViewMutationList,
    delete: ShadowViewMutationList,
    create: ShadowViewMutationList,
    insert: ShadowViewMutationList,
    downward: ShadowViewMutationList,
}

impl Buckets {
    fn flush_into(self, out: &mut ShadowViewMutationList) {
        out.extend(self.destructive);
        out.extend(self.update);
        out.extend(self.remove.into_iter().rev());
        out.extend(self.delete);
        out.extend(self.create);
        out.extend(self.insert);
        out.extend(self.downward);
    }
}

type MovedPairs = HashMap<Tag, ShadowViewNodePair>;

struct Differ<'m> {
    mode: DifferentiatorMode,
    /// Old pairs of nodes known to move, keyed by tag.
    moved: &'m MovedPairs,
    deleted: MovedPairs,
    created: HashSet<Tag>,
}

impl<'m> Differ<'m> {
    fn new(mode: DifferentiatorMode, moved: &'m MovedPairs) -> Self {
        Self {
            mode,
            moved,
            deleted: HashMap::new(),
            created: HashSet::new(),
        }
    }

    /// Returns the nodes that were both deleted and created.
    fn into_moved(self) -> MovedPairs {
        let created = self.created;
        self.deleted
            .into_iter()
            .filter(|(tag, _)| created.contains(tag))
            .collect()
    }

    fn run(&mut self, old_root: &ShadowNode, new_root: &ShadowNode) -> ShadowViewMutationList {
        let mut out = Vec::new();
        let old_view = ShadowView::new(old_root);
        let new_view = ShadowView::new(new_root);
        if old_view != new_view {
            out.push(ShadowViewMutation::Update {
                parent_tag: None,
                old: old_view,
                new: new_view,
                index: None,
            });
        }
        if core::ptr::eq(old_root, new_root) {
            return out;
        }
        let old_children = slice_child_shadow_node_view_pairs(old_root);
        let new_children = slice_child_shadow_node_view_pairs(new_root);
        self.diff_lists(&mut out, old_root.tag(), &old_children, &new_children);
        out
    }

    fn diff_lists(
        &mut self,
        out: &mut ShadowViewMutationList,
        parent_tag: Tag,
        old: &[ShadowViewNodePair],
        new: &[ShadowViewNodePair],
    ) {
        if old == new {
            return;
        }

        let mut buckets = Buckets::default();

        // Common prefix: same tags at the same positions.
        let mut index = 0;
        while let (Some(old_pair), Some(new_pair)) = (old.get(index), new.get(index)) {
            if old_pair.view.tag != new_pair.view.tag {
                break;
            }
            self.update_matched(&mut buckets, parent_tag, old_pair, new_pair, index);
            index += 1;
        }

        match self.mode {
            DifferentiatorMode::Classic => {
                self.diff_tail_classic(&mut buckets, parent_tag, old, new, index);
            }
            DifferentiatorMode::OptimizedMoves => {
                self.diff_tail_optimized(&mut buckets, parent_tag, old, new, index);
            }
        }

        buckets.flush_into(out);
    }

    fn diff_tail_classic(
        &mut self,
        buckets: &mut Buckets,
        parent_tag: Tag,
        old: &[ShadowViewNodePair],
        new: &[ShadowViewNodePair],
        start: usize,
    ) {
        let mut reinserted: IndexMap<Tag, (&ShadowViewNodePair, usize)> = IndexMap::new();
        for (index, new_pair) in new.iter().enumerate().skip(start) {
            buckets.insert.push(ShadowViewMutation::Insert {
                parent_tag,
                new: new_pair.view.clone(),
                index,
            });
            reinserted.insert(new_pair.view.tag, (new_pair, index));
        }

        for (index, old_pair) in old.iter().enumerate().skip(start) {
            buckets.remove.push(ShadowViewMutation::Remove {
                parent_tag,
                old: old_pair.view.clone(),
                index,
            });
            match reinserted.shift_remove(&old_pair.view.tag) {
                Some((new_pair, new_index)) => {
                    self.update_matched(buckets, parent_tag, old_pair, new_pair, new_index);
                }
                None => self.delete_old(buckets, old_pair),
            }
        }

        for (new_pair, index) in reinserted.into_values() {
            self.create_new(buckets, parent_tag, new_pair, index);
        }
    }

    fn diff_tail_optimized(
        &mut self,
        buckets: &mut Buckets,
        parent_tag: Tag,
        old: &[ShadowViewNodePair],
        new: &[ShadowViewNodePair],
        start: usize,
    ) {
        let mut remaining: HashSet<Tag> = new[start..].iter().map(|p| p.view.tag).collect();
        let mut inserted: IndexMap<Tag, (&ShadowViewNodePair, usize)> = IndexMap::new();

        let (mut old_index, mut new_index) = (start, start);
        while old_index < old.len() || new_index < new.len() {
            if let (Some(old_pair), Some(new_pair)) = (old.get(old_index), new.get(new_index))
                && old_pair.view.tag == new_pair.view.tag
            {
                remaining.remove(&old_pair.view.tag);
                self.update_matched(buckets, parent_tag, old_pair, new_pair, new_index);
                old_index += 1;
                new_index += 1;
                continue;
            }

            if let Some(old_pair) = old.get(old_index) {
                let tag = old_pair.view.tag;
                if let Some((new_pair, inserted_at)) = inserted.shift_remove(&tag) {
                    // Inserted earlier under this parent: a move within the list.
                    buckets.remove.push(ShadowViewMutation::Remove {
                        parent_tag,
                        old: old_pair.view.clone(),
                        index: old_index,
                    });
                    self.update_matched(buckets, parent_tag, old_pair, new_pair, inserted_at);
                    old_index += 1;
                    continue;
                }
                if !remaining.contains(&tag) {
                    buckets.remove.push(ShadowViewMutation::Remove {
                        parent_tag,
                        old: old_pair.view.clone(),
                        index: old_index,
                    });
                    self.delete_old(buckets, old_pair);
                    old_index += 1;
                    continue;
                }
            }

            // Every old tag still pending is in the new list, so the new list
            // cannot be exhausted here.
            debug_assert!(
                new_index < new.len(),
                "duplicate tag among siblings of {parent_tag}"
            );
            let Some(new_pair) = new.get(new_index) else {
                break;
            };
            buckets.insert.push(ShadowViewMutation::Insert {
                parent_tag,
                new: new_pair.view.clone(),
                index: new_index,
            });
            inserted.insert(new_pair.view.tag, (new_pair, new_index));
            new_index += 1;
        }

        for (new_pair, index) in inserted.into_values() {
            self.create_new(buckets, parent_tag, new_pair, index);
        }
    }

    /// Reconciles two versions of the same child.
    fn update_matched(
        &mut self,
        buckets: &mut Buckets,
        parent_tag: Tag,
        old_pair: &ShadowViewNodePair,
        new_pair: &ShadowViewNodePair,
        index: usize,
    ) {
        if old_pair.view != new_pair.view {
            buckets.update.push(ShadowViewMutation::Update {
                parent_tag: Some(parent_tag),
                old: old_pair.view.clone(),
                new: new_pair.view.clone(),
                index: Some(index),
            });
        }
        self.diff_subtrees(buckets, old_pair, new_pair);
    }

    fn diff_subtrees(
        &mut self,
        buckets: &mut Buckets,
        old_pair: &ShadowViewNodePair,
        new_pair: &ShadowViewNodePair,
    ) {
        if Arc::ptr_eq(&old_pair.node, &new_pair.node) {
            return;
        }
        let old_children = slice_child_shadow_node_view_pairs(&old_pair.node);
        let new_children = slice_child_shadow_node_view_pairs(&new_pair.node);
        let target = if new_children.is_empty() {
            &mut buckets.destructive
        } else {
            &mut buckets.downward
        };
        self.diff_lists(target, old_pair.view.tag, &old_children, &new_children);
    }

    /// Deletes a removed child and tears down its subtree, unless it moves.
    fn delete_old(&mut self, buckets: &mut Buckets, old_pair: &ShadowViewNodePair) {
        let tag = old_pair.view.tag;
        if self.moved.contains_key(&tag) {
            return;
        }
        self.deleted.insert(tag, old_pair.clone());
        buckets.delete.push(ShadowViewMutation::Delete {
            old: old_pair.view.clone(),
        });
        let children = slice_child_shadow_node_view_pairs(&old_pair.node);
        self.diff_lists(&mut buckets.destructive, tag, &children, &[]);
    }

    /// Creates an inserted child and builds its subtree, or reconciles it
    /// with its old version if it moves.
    fn create_new(
        &mut self,
        buckets: &mut Buckets,
        parent_tag: Tag,
        new_pair: &ShadowViewNodePair,
        index: usize,
    ) {
        let tag = new_pair.view.tag;
        let moved = self.moved;
        if let Some(old_pair) = moved.get(&tag) {
            self.update_matched(buckets, parent_tag, old_pair, new_pair, index);
            return;
        }
        self.created.insert(tag);
        buckets.create.push(ShadowViewMutation::Create {
            new: new_pair.view.clone(),
        });
        let children = slice_child_shadow_node_view_pairs(&new_pair.node);
        self.diff_lists(&mut buckets.downward, tag, &[], &children);
    }
}

/// Moves the `Remove` of every moved node in front of its `Insert` when the
/// buckets put it later, re-indexing the removes it jumps over.
fn hoist_moved_removes(mutations: &mut ShadowViewMutationList, moved: &MovedPairs) {
    let mut position = 0;
    while position < mutations.len() {
        let tag = match &mutations[position] {
            ShadowViewMutation::Insert { new, .. } if moved.contains_key(&new.tag) => new.tag,
            _ => {
                position += 1;
                continue;
            }
        };
        let removal_at = mutations[position + 1..]
            .iter()
            .position(|m| matches!(m, ShadowViewMutation::Remove { old, .. } if old.tag == tag))
            .map(|offset| position + 1 + offset);
        if let Some(removal_at) = removal_at {
            let removal = mutations.remove(removal_at);
            if let ShadowViewMutation::Remove {
                parent_tag, index, ..
            } = &removal
            {
                for skipped in &mut mutations[position..removal_at] {
                    if let ShadowViewMutation::Remove {
                        parent_tag: other_parent,
                        index: other_index,
                        ..
                    } = skipped
                        && other_parent == parent_tag
                        && *other_index > *index
                    {
                        *other_index -= 1;
                    }
                }
            }
            mutations.insert(position, removal);
            position += 1;
        }
        position += 1;
    }
}
