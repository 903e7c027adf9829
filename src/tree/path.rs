//! Root-to-leaf bit paths
//!
//! A path stores one branch token per level, nothing else.
//! Parameters are recomputed from the root on demand.

use std::fmt;

use crate::bits::MAX_BIT_WIDTH;
use crate::param::{Branch, DecisionParameter};
use crate::{Result, SyncError};

/// Sequence of branch choices, root first
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BranchPath {
    tokens: Vec<Branch>,
}

impl BranchPath {
    /// Empty path (the root)
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// MSB-first path that leads to `id` in a tree of `bit_count` levels
    pub fn for_id(id: u32, bit_count: usize) -> Result<Self> {
        if bit_count == 0 || bit_count > MAX_BIT_WIDTH || u64::from(id) >= 1u64 << bit_count {
            return Err(SyncError::invalid_argument(format!(
                "id {id} not addressable with {bit_count} bits"
            )));
        }
        let tokens = (0..bit_count)
            .rev()
            .map(|bit| {
                if id & (1 << bit) != 0 {
                    Branch::One
                } else {
                    Branch::Zero
                }
            })
            .collect();
        Ok(Self { tokens })
    }

    /// Push level onto the path
    pub fn push(&mut self, branch: Branch) {
        self.tokens.push(branch);
    }

    /// Pop level from the path
    pub fn pop(&mut self) -> Option<Branch> {
        self.tokens.pop()
    }

    /// Number of levels
    pub fn depth(&self) -> usize {
        self.tokens.len()
    }

    /// Branch tokens, root first
    pub fn tokens(&self) -> &[Branch] {
        &self.tokens
    }

    /// Recompute the parameter at the end of this path from `root`
    ///
    /// Fails with `InvalidState` if the path is longer than the tree is deep.
    pub fn walk(&self, root: &DecisionParameter) -> Result<DecisionParameter> {
        self.tokens
            .iter()
            .try_fold(root.clone(), |param, &branch| param.descend(branch))
    }
}

impl fmt::Display for BranchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for branch in &self.tokens {
            write!(f, "{}", branch.bit())?;
        }
        Ok(())
    }
}
