// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Randomized trees: whatever the edits, the instructions reproduce the new
//! tree and never recreate a view that stays mounted.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use umbra_core::mounting::{
    DifferentiatorMode, MutationKind, StubViewTree, build_stub_view_tree_without_differentiator,
    calculate_shadow_view_mutations_with_mode,
};
use umbra_core::node::{SurfaceId, Tag};
use umbra_testkit::TreeBuilder;
use umbra_testkit::random::{random_edit, random_tree};

fn mounted_tags(stub: &StubViewTree) -> HashSet<Tag> {
    let mut tags = HashSet::new();
    let mut pending = vec![stub.root_tag()];
    while let Some(tag) = pending.pop() {
        tags.insert(tag);
        pending.extend_from_slice(stub.children_of(tag));
    }
    tags
}

fn mode(optimized: bool) -> DifferentiatorMode {
    if optimized {
        DifferentiatorMode::OptimizedMoves
    } else {
        DifferentiatorMode::Classic
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn edits_are_reproduced(
        seed in any::<u64>(),
        size in 1_usize..40,
        edits in 1_usize..8,
        optimized in any::<bool>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut builder = TreeBuilder::new(SurfaceId(1));
        let unlaid = random_tree(&mut rng, &mut builder, size);
        let old = builder.commit_ready(unlaid);

        let mut edited = random_edit(&mut rng, &mut builder, &old);
        for _ in 1..edits {
            edited = random_edit(&mut rng, &mut builder, &edited);
        }
        let new = builder.commit_ready(edited);

        let mutations = calculate_shadow_view_mutations_with_mode(mode(optimized), &old, &new);
        let mut stub = build_stub_view_tree_without_differentiator(&old);
        let before = mounted_tags(&stub);
        prop_assert!(stub.mutate(&mutations).is_ok(), "instructions apply cleanly");
        let expected = build_stub_view_tree_without_differentiator(&new);
        prop_assert_eq!(&stub, &expected);

        let after = mounted_tags(&expected);
        for mutation in &mutations {
            if matches!(mutation.kind(), MutationKind::Create | MutationKind::Delete) {
                let tag = mutation.tag();
                prop_assert!(
                    !(before.contains(&tag) && after.contains(&tag)),
                    "{:?} recreates a view that stays mounted",
                    mutation
                );
            }
        }
    }

    #[test]
    fn diffing_a_tree_with_itself_is_empty(seed in any::<u64>(), size in 0_usize..40) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut builder = TreeBuilder::new(SurfaceId(1));
        let unlaid = random_tree(&mut rng, &mut builder, size);
        let tree = builder.commit_ready(unlaid);
        for optimized in [false, true] {
            prop_assert!(
                calculate_shadow_view_mutations_with_mode(mode(optimized), &tree, &tree).is_empty()
            );
        }
    }
}
