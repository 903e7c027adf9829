//! Binary decision tree builder
//!
//! Key property: the tree is never stored by the builder. Each level asks
//! the consumer for two children, routes the 0-branch predicate to the
//! first and the default to the second, then recurses 0 before 1.
//!
//! Enumeration order = ascending id, so leaf k always carries id k.

mod consumer;
mod path;

pub use consumer::{RouteTarget, TreeConsumer};
pub use path::BranchPath;

use tracing::{debug, trace};

use crate::param::{Branch, DecisionParameter};
use crate::{Result, SyncError};

/// One terminal node produced by [`build`]
#[derive(Debug, Clone)]
pub struct TreeLeaf<L, B> {
    /// Consumer handle of the leaf
    pub handle: L,

    /// Branch hosting the leaf (lets consumers add sibling nodes)
    pub parent: B,

    /// Fully descended parameter; `param.id()` addresses the leaf
    pub param: DecisionParameter,
}

/// Build the decision tree under `parent`
///
/// Returns `2^(bit_count - depth)` leaves in ascending id order. Unused ids
/// are never skipped; deciding what to attach to them is the caller's job.
/// A consumer failure aborts the build and is returned unchanged.
pub fn build<C>(
    consumer: &mut C,
    parent: &C::Branch,
    root: DecisionParameter,
) -> Result<Vec<TreeLeaf<C::Leaf, C::Branch>>>
where
    C: TreeConsumer,
{
    if root.is_leaf() {
        return Err(SyncError::invalid_state(format!(
            "cannot build a tree below leaf {}",
            root.id()
        )));
    }

    let range = root.range();
    debug!(
        bit_count = root.bit_count(),
        depth = root.depth(),
        leaves = range.end - range.start,
        "building decision tree"
    );

    let mut leaves = Vec::with_capacity((range.end - range.start) as usize);
    build_level(consumer, parent, &root, &mut leaves)?;

    debug_assert!(leaves
        .iter()
        .zip(range)
        .all(|(leaf, id)| leaf.param.id() == id));
    Ok(leaves)
}

fn build_level<C>(
    consumer: &mut C,
    parent: &C::Branch,
    param: &DecisionParameter,
    leaves: &mut Vec<TreeLeaf<C::Leaf, C::Branch>>,
) -> Result<()>
where
    C: TreeConsumer,
{
    let bit_index = param.bit_index()?;
    let condition = param.is_zero_branch()?;
    let zero = param.descend(Branch::Zero)?;
    let one = param.descend(Branch::One)?;

    let zero_name = format!("bit[{bit_index}] == 0");
    let one_name = format!("bit[{bit_index}] == 1");

    // next level is the last
    if param.depth() + 1 >= param.bit_count() {
        let leaf_0 = consumer.new_leaf(parent, &zero_name)?;
        let leaf_1 = consumer.new_leaf(parent, &one_name)?;

        consumer.route_on_condition(parent, condition, RouteTarget::Leaf(&leaf_0))?;
        consumer.route_default(parent, RouteTarget::Leaf(&leaf_1))?;

        trace!(id = zero.id(), "leaf");
        trace!(id = one.id(), "leaf");

        leaves.push(TreeLeaf {
            handle: leaf_0,
            parent: parent.clone(),
            param: zero,
        });
        leaves.push(TreeLeaf {
            handle: leaf_1,
            parent: parent.clone(),
            param: one,
        });
    } else {
        let branch_0 = consumer.new_branch(parent, &zero_name)?;
        let branch_1 = consumer.new_branch(parent, &one_name)?;

        consumer.route_on_condition(parent, condition, RouteTarget::Branch(&branch_0))?;
        consumer.route_default(parent, RouteTarget::Branch(&branch_1))?;

        build_level(consumer, &branch_0, &zero, leaves)?;
        build_level(consumer, &branch_1, &one, leaves)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Condition;

    /// Records every call; optionally fails on the n-th node creation
    #[derive(Debug, Default)]
    struct Recorder {
        created: usize,
        fail_at: Option<usize>,
        events: Vec<String>,
    }

    impl Recorder {
        fn create(&mut self, kind: &str, parent: &usize, name: &str) -> Result<usize> {
            self.created += 1;
            if self.fail_at == Some(self.created) {
                return Err(SyncError::consumer_failure(format!("refused {name}")));
            }
            self.events.push(format!("{kind} {} <- {parent} '{name}'", self.created));
            Ok(self.created)
        }
    }

    impl TreeConsumer for Recorder {
        type Leaf = usize;
        type Branch = usize;

        fn new_leaf(&mut self, parent: &usize, name: &str) -> Result<usize> {
            self.create("leaf", parent, name)
        }

        fn new_branch(&mut self, parent: &usize, name: &str) -> Result<usize> {
            self.create("branch", parent, name)
        }

        fn route_on_condition(
            &mut self,
            parent: &usize,
            condition: Condition,
            target: RouteTarget<'_, usize, usize>,
        ) -> Result<()> {
            self.events.push(format!("route {parent} -> {target:?} when {condition}"));
            Ok(())
        }

        fn route_default(
            &mut self,
            parent: &usize,
            target: RouteTarget<'_, usize, usize>,
        ) -> Result<()> {
            self.events.push(format!("route {parent} -> {target:?}"));
            Ok(())
        }
    }

    #[test]
    fn test_single_bit_tree() {
        let mut recorder = Recorder::default();
        let root = DecisionParameter::int("Anim", 1).unwrap();
        let leaves = build(&mut recorder, &0, root).unwrap();

        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].param.id(), 0);
        assert_eq!(leaves[1].param.id(), 1);
        assert_eq!(
            recorder.events,
            vec![
                "leaf 1 <- 0 'bit[0] == 0'",
                "leaf 2 <- 0 'bit[0] == 1'",
                "route 0 -> Leaf(1) when Anim < 1",
                "route 0 -> Leaf(2)",
            ]
        );
    }

    #[test]
    fn test_leaves_ascending_and_parented() {
        let mut recorder = Recorder::default();
        let root = DecisionParameter::int("Anim", 3).unwrap();
        let leaves = build(&mut recorder, &0, root).unwrap();

        let ids: Vec<u32> = leaves.iter().map(|leaf| leaf.param.id()).collect();
        assert_eq!(ids, (0..8).collect::<Vec<_>>());
        // siblings share the same parent branch
        for pair in leaves.chunks(2) {
            assert_eq!(pair[0].parent, pair[1].parent);
            assert_ne!(pair[0].parent, 0);
        }
        // 2 + 4 branches, 8 leaves
        assert_eq!(recorder.created, 14);
    }

    #[test]
    fn test_subtree_build() {
        let mut recorder = Recorder::default();
        let upper = DecisionParameter::int("Anim", 3)
            .unwrap()
            .descend(Branch::One)
            .unwrap();
        let leaves = build(&mut recorder, &0, upper).unwrap();
        let ids: Vec<u32> = leaves.iter().map(|leaf| leaf.param.id()).collect();
        assert_eq!(ids, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_build_below_leaf_fails() {
        let mut recorder = Recorder::default();
        let leaf = DecisionParameter::int("Anim", 1)
            .unwrap()
            .descend(Branch::One)
            .unwrap();
        assert!(matches!(
            build(&mut recorder, &0, leaf),
            Err(SyncError::InvalidState(_))
        ));
    }

    #[test]
    fn test_consumer_failure_aborts() {
        let mut recorder = Recorder {
            fail_at: Some(5),
            ..Default::default()
        };
        let root = DecisionParameter::int("Anim", 3).unwrap();
        let err = build(&mut recorder, &0, root).unwrap_err();
        assert!(matches!(err, SyncError::ConsumerFailure(_)));
        // nothing created after the failing call
        assert_eq!(recorder.created, 5);
    }
}
