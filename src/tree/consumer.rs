//! Host boundary for the tree builder
//!
//! The builder only creates nodes and routes. What a node *is* (animator
//! state, sub-state machine, generated code, graph vertex) is up to the host.

use std::fmt;

use crate::param::Condition;
use crate::Result;

/// Destination of a route: a terminal leaf or a nested branch
#[derive(Debug)]
pub enum RouteTarget<'a, L, B> {
    /// Terminal unit (e.g. an animator state)
    Leaf(&'a L),

    /// Intermediate unit hosting further leaves/branches
    Branch(&'a B),
}

impl<L, B> Clone for RouteTarget<'_, L, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L, B> Copy for RouteTarget<'_, L, B> {}

/// Graph-building capability the tree builder requires from its host
///
/// Every operation is synchronous. Failures are reported as
/// [`SyncError::ConsumerFailure`](crate::SyncError::ConsumerFailure) and abort
/// the whole build; rolling back already-created nodes is the host's job.
pub trait TreeConsumer {
    /// Handle to a terminal node
    type Leaf: Clone + fmt::Debug;

    /// Handle to an intermediate node (or the root context)
    type Branch: Clone + fmt::Debug;

    /// Create a terminal node under `parent`
    fn new_leaf(&mut self, parent: &Self::Branch, name: &str) -> Result<Self::Leaf>;

    /// Create an intermediate node under `parent`
    fn new_branch(&mut self, parent: &Self::Branch, name: &str) -> Result<Self::Branch>;

    /// Entering `parent` with `condition` true routes into `target`
    fn route_on_condition(
        &mut self,
        parent: &Self::Branch,
        condition: Condition,
        target: RouteTarget<'_, Self::Leaf, Self::Branch>,
    ) -> Result<()>;

    /// Unconditional fallback, evaluated after every conditional route of `parent`
    fn route_default(
        &mut self,
        parent: &Self::Branch,
        target: RouteTarget<'_, Self::Leaf, Self::Branch>,
    ) -> Result<()>;
}
