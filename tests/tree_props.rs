//! Property tests for the decision tree

mod common;

use common::{bool_tree, int_tree, recv_names};
use proptest::prelude::*;
use syncdance::tree::BranchPath;
use syncdance::{Branch, ChannelAssignment, DecisionParameter};

fn width_and_id() -> impl Strategy<Value = (usize, u32)> {
    (1usize..=8).prop_flat_map(|bits| (Just(bits), 0u32..(1u32 << bits)))
}

proptest! {
    #[test]
    fn leaves_cover_every_id_in_order(bits in 1usize..=8) {
        for (_, leaves) in [int_tree(bits), bool_tree(bits)] {
            prop_assert_eq!(leaves.len(), 1usize << bits);
            for (position, leaf) in leaves.iter().enumerate() {
                prop_assert_eq!(leaf.param.id() as usize, position);
                prop_assert!(leaf.param.is_leaf());
            }
        }
    }

    #[test]
    fn int_and_bool_paths_agree((bits, id) in width_and_id()) {
        let path = BranchPath::for_id(id, bits).unwrap();
        let int_leaf = path
            .walk(&DecisionParameter::int("OSD_SendAnim", bits).unwrap())
            .unwrap();
        let bool_leaf = path
            .walk(&DecisionParameter::bool_group(recv_names(bits), bits).unwrap())
            .unwrap();

        prop_assert_eq!(int_leaf.id(), id);
        prop_assert_eq!(bool_leaf.id(), id);
        prop_assert_eq!(int_leaf.bits(), bool_leaf.bits());
    }

    #[test]
    fn both_trees_route_assignment_to_its_leaf((bits, id) in width_and_id()) {
        let channels = ChannelAssignment::from_id(id, bits).unwrap();
        for (graph, leaves) in [int_tree(bits), bool_tree(bits)] {
            let state = graph.resolve(&channels);
            prop_assert_eq!(state, Some(leaves[id as usize].handle));
        }
    }

    #[test]
    fn descend_never_mutates_parent((bits, id) in width_and_id(), depth_seed in any::<usize>()) {
        let root = DecisionParameter::int("OSD_SendAnim", bits).unwrap();
        let path = BranchPath::for_id(id, bits).unwrap();
        let depth = depth_seed % bits;

        let mut parent = root;
        for &branch in &path.tokens()[..depth] {
            parent = parent.descend(branch).unwrap();
        }
        let snapshot = parent.clone();

        let zero = parent.descend(Branch::Zero).unwrap();
        let one = parent.descend(Branch::One).unwrap();

        prop_assert_eq!(&parent, &snapshot);
        prop_assert_eq!(parent.depth(), depth);
        prop_assert_eq!(zero.id() ^ one.id(), 1u32 << (bits - depth - 1));
        prop_assert_eq!(zero.depth(), depth + 1);
    }

    #[test]
    fn entry_and_exit_partition_assignments((bits, id) in width_and_id()) {
        let leaf = BranchPath::for_id(id, bits)
            .unwrap()
            .walk(&DecisionParameter::bool_group(recv_names(bits), bits).unwrap())
            .unwrap();
        let entry = leaf.entry_condition();
        let exit = leaf.exit_condition();
        prop_assert_eq!(entry.term_count(), bits);

        for other in 0..(1u32 << bits) {
            let channels = ChannelAssignment::from_id(other, bits).unwrap();
            prop_assert_eq!(entry.evaluate(&channels), other == id);
            prop_assert_eq!(exit.evaluate(&channels), other != id);
        }
    }

    #[test]
    fn int_entry_matches_bool_entry((bits, id) in width_and_id()) {
        let path = BranchPath::for_id(id, bits).unwrap();
        let int_leaf = path.walk(&DecisionParameter::int("OSD_SendAnim", bits).unwrap()).unwrap();
        let bool_leaf = path
            .walk(&DecisionParameter::bool_group(recv_names(bits), bits).unwrap())
            .unwrap();

        for other in 0..(1u32 << bits) {
            let channels = ChannelAssignment::from_id(other, bits).unwrap();
            prop_assert_eq!(
                int_leaf.entry_condition().evaluate(&channels),
                bool_leaf.entry_condition().evaluate(&channels)
            );
        }
    }
}
