// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instruction lists for whole trees built the way a producer builds them.

use std::sync::Arc;

use umbra_core::mounting::{
    DifferentiatorMode, MutationKind, ShadowViewMutation, build_stub_view_tree_without_differentiator,
    calculate_shadow_view_mutations, calculate_shadow_view_mutations_with_mode,
};
use umbra_core::node::{RawProps, ShadowNode, SharedShadowNode, SurfaceId, Tag};
use umbra_testkit::{Element, TreeBuilder};

/// `(kind, tag, index)` of every instruction; `index` is `None` for
/// instructions without one.
fn summary(mutations: &[ShadowViewMutation]) -> Vec<(MutationKind, i32, Option<usize>)> {
    mutations
        .iter()
        .map(|mutation| (mutation.kind(), mutation.tag().0, mutation.index()))
        .collect()
}

/// Checks that `mutations` turn the mounted form of `old` into that of `new`.
fn assert_reproduces(old: &ShadowNode, new: &ShadowNode, mutations: &[ShadowViewMutation]) {
    let mut stub = build_stub_view_tree_without_differentiator(old);
    stub.mutate(mutations).expect("instructions apply cleanly");
    assert_eq!(
        stub,
        build_stub_view_tree_without_differentiator(new),
        "instructions reproduce the new tree"
    );
}

#[test]
fn reordering_instruction_generation() {
    use MutationKind::{Create, Delete, Insert, Remove};

    let mut builder = TreeBuilder::new(SurfaceId(1));
    let [a, b, c, d, e, f, g, h, i, j, k] = [100, 101, 102, 103, 104, 105, 106, 107, 108, 109, 110]
        .map(|tag| builder.node(&Element::view(tag)));
    let wrapper_props = builder.props(&RawProps::new());
    let mut version = |children: &[&SharedShadowNode]| {
        let children = children.iter().map(|child| Arc::clone(child)).collect();
        let wrapper = builder.view_node(Tag(10), Arc::clone(&wrapper_props), children);
        builder.root_with(vec![wrapper])
    };

    let v1 = version(&[&b, &c, &d]);
    let v2 = version(&[&a, &b, &c, &d]);
    let v3 = version(&[&b, &c, &d]);
    let v4 = version(&[&b, &d, &e]);
    let v5 = version(&[&b, &a, &e, &c]);
    let v6 = version(&[&b, &a, &d, &f, &e, &c]);
    let v7 = version(&[&f, &e, &c, &d, &g, &h, &i, &j, &k]);

    let laid_out: Vec<SharedShadowNode> = [v1, v2, v3, v4, v5, v6]
        .into_iter()
        .map(|root| builder.commit_ready(root))
        .collect();
    let v7 = Arc::new(v7);
    let mut versions = laid_out;
    versions.push(v7);

    let diffs: Vec<_> = versions
        .windows(2)
        .map(|pair| calculate_shadow_view_mutations(&pair[0], &pair[1]))
        .collect();
    let counts: Vec<_> = diffs.iter().map(Vec::len).collect();
    assert_eq!(counts, [2, 2, 4, 6, 4, 25]);

    // Inserting at the front is a single insertion, not a run of moves.
    assert_eq!(summary(&diffs[0]), [(Create, 100, None), (Insert, 100, Some(0))]);
    // Removing from the front likewise.
    assert_eq!(summary(&diffs[1]), [(Remove, 100, Some(0)), (Delete, 100, None)]);
    // Removing in the middle while appending.
    assert_eq!(
        summary(&diffs[2]),
        [
            (Remove, 102, Some(1)),
            (Delete, 102, None),
            (Create, 104, None),
            (Insert, 104, Some(2)),
        ]
    );
    // Inserting in the middle and at the end while removing in the middle.
    assert_eq!(
        summary(&diffs[3]),
        [
            (Remove, 103, Some(1)),
            (Delete, 103, None),
            (Create, 100, None),
            (Create, 102, None),
            (Insert, 100, Some(1)),
            (Insert, 102, Some(3)),
        ]
    );
    // Two insertions in the middle.
    assert_eq!(
        summary(&diffs[4]),
        [
            (Create, 103, None),
            (Create, 105, None),
            (Insert, 103, Some(2)),
            (Insert, 105, Some(3)),
        ]
    );
    // Views that stay mounted are moved, never recreated.
    for mutation in &diffs[5] {
        if mutation.kind() == Create {
            assert!(mutation.tag().0 > 105, "{mutation:?} recreates a mounted view");
        }
    }

    for (pair, diff) in versions.windows(2).zip(&diffs) {
        assert_reproduces(&pair[0], &pair[1], diff);
    }
}

#[test]
fn deletion_with_reversal() {
    use MutationKind::{Delete, Insert, Remove};

    let mut builder = TreeBuilder::new(SurfaceId(1));
    let old = builder.root(&[Element::view(10).children([
        Element::view(101),
        Element::view(102),
        Element::view(103),
    ])]);
    let old = builder.commit_ready(old);
    let new = builder.root(&[Element::view(10).children([Element::view(103), Element::view(102)])]);
    let new = builder.commit_ready(new);

    let mutations = calculate_shadow_view_mutations(&old, &new);
    assert_eq!(
        summary(&mutations),
        [
            (Remove, 103, Some(2)),
            (Remove, 101, Some(0)),
            (Delete, 101, None),
            (Insert, 103, Some(0)),
        ]
    );
    assert!(mutations.iter().all(|m| m.parent_tag().is_none_or(|p| p == Tag(10))));
    assert_reproduces(&old, &new, &mutations);
}

#[test]
fn identical_trees_produce_nothing() {
    let mut builder = TreeBuilder::new(SurfaceId(1));
    let elements = [
        Element::view(10).children([Element::view(11), Element::layout_only(12).child(Element::view(13))]),
        Element::view(14),
    ];
    let tree = builder.root(&elements);
    let tree = builder.commit_ready(tree);
    assert!(calculate_shadow_view_mutations(&tree, &tree).is_empty());

    // Rebuilding the same elements yields new nodes with the same views.
    let rebuilt = builder.root(&elements);
    let rebuilt = builder.commit_ready(rebuilt);
    assert!(!Arc::ptr_eq(&tree.children()[0], &rebuilt.children()[0]));
    assert!(calculate_shadow_view_mutations(&tree, &rebuilt).is_empty());
}

#[test]
fn reparenting_keeps_the_view() {
    use MutationKind::{Insert, Remove};

    for mode in [DifferentiatorMode::Classic, DifferentiatorMode::OptimizedMoves] {
        let mut builder = TreeBuilder::new(SurfaceId(1));
        let old = builder.root(&[
            Element::view(20).child(Element::view(30).child(Element::view(31))),
            Element::view(21),
        ]);
        let old = builder.commit_ready(old);
        let new = builder.root(&[
            Element::view(20),
            Element::view(21).child(Element::view(30).child(Element::view(31))),
        ]);
        let new = builder.commit_ready(new);

        let mutations = calculate_shadow_view_mutations_with_mode(mode, &old, &new);
        assert_eq!(
            summary(&mutations),
            [(Remove, 30, Some(0)), (Insert, 30, Some(0))],
            "{mode:?}"
        );
        assert_eq!(mutations[0].parent_tag(), Some(Tag(20)));
        assert_eq!(mutations[1].parent_tag(), Some(Tag(21)));
        assert_reproduces(&old, &new, &mutations);
    }
}

#[test]
fn swapping_siblings_moves_one() {
    let mut builder = TreeBuilder::new(SurfaceId(1));
    let old = builder.root(&[Element::view(10), Element::view(11)]);
    let old = builder.commit_ready(old);
    let new = builder.root(&[Element::view(11), Element::view(10)]);
    let new = builder.commit_ready(new);

    let mutations = calculate_shadow_view_mutations(&old, &new);
    let kinds: Vec<_> = mutations.iter().map(ShadowViewMutation::kind).collect();
    assert_eq!(kinds, [MutationKind::Remove, MutationKind::Insert]);
    assert_eq!(mutations[0].tag(), mutations[1].tag());
    assert_reproduces(&old, &new, &mutations);
}

#[test]
fn flattening_a_wrapper_moves_its_children() {
    let mut builder = TreeBuilder::new(SurfaceId(1));
    let old = builder.root(&[Element::view(10).children([Element::view(11), Element::view(12)])]);
    let old = builder.commit_ready(old);
    let new = builder.root(&[Element::layout_only(10).children([Element::view(11), Element::view(12)])]);
    let new = builder.commit_ready(new);

    let mutations = calculate_shadow_view_mutations(&old, &new);
    for tag in [11, 12] {
        assert!(
            !mutations
                .iter()
                .any(|m| m.tag() == Tag(tag) && matches!(m.kind(), MutationKind::Create | MutationKind::Delete)),
            "view {tag} survives flattening"
        );
    }
    assert!(
        mutations
            .iter()
            .any(|m| m.tag() == Tag(10) && m.kind() == MutationKind::Delete),
        "the wrapper's own view goes away"
    );
    assert_reproduces(&old, &new, &mutations);

    let back = calculate_shadow_view_mutations(&new, &old);
    assert_reproduces(&new, &old, &back);
}

#[test]
fn teardown_deletes_the_whole_subtree() {
    let mut builder = TreeBuilder::new(SurfaceId(1));
    let old = builder.root(&[
        Element::view(10).child(Element::view(11).children([Element::view(12), Element::view(13)])),
        Element::view(20),
    ]);
    let old = builder.commit_ready(old);
    let new = builder.root(&[Element::view(20)]);
    let new = builder.commit_ready(new);

    let mutations = calculate_shadow_view_mutations(&old, &new);
    let mut deleted: Vec<_> = mutations
        .iter()
        .filter(|m| m.kind() == MutationKind::Delete)
        .map(|m| m.tag().0)
        .collect();
    deleted.sort_unstable();
    assert_eq!(deleted, [10, 11, 12, 13]);
    assert!(mutations.iter().all(|m| m.kind() != MutationKind::Create));
    assert_reproduces(&old, &new, &mutations);
}

#[test]
fn moved_view_with_new_props_is_updated() {
    let mut builder = TreeBuilder::new(SurfaceId(1));
    let old = builder.root(&[Element::view(10), Element::view(11)]);
    let old = builder.commit_ready(old);
    let moved = RawProps::new()
        .with("left", 50)
        .with("width", 10)
        .with("height", 10)
        .with("nativeID", "moved");
    let new = builder.root(&[Element::view(11), Element::with_props(10, moved)]);
    let new = builder.commit_ready(new);

    let mutations = calculate_shadow_view_mutations(&old, &new);
    assert!(
        mutations
            .iter()
            .any(|m| m.kind() == MutationKind::Update && m.tag() == Tag(10)),
        "props change reaches the mounted view"
    );
    assert!(mutations.iter().all(|m| m.kind() != MutationKind::Create));
    assert_reproduces(&old, &new, &mutations);
}
