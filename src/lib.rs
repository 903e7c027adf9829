//! # Binary Decision Trees for Synced Animation Ids
//!
//! This library encodes a bounded "active animation id" onto a fixed set of
//! boolean network channels, and builds the decision tree that both drives
//! and decodes that encoding.
//!
//! ## Core Algorithm
//!
//! 1. **Bit width**: `b` = smallest width with `2^b > count` (id 0 is idle)
//! 2. **Decision parameter**: immutable (id, depth) state, split MSB-first
//! 3. **Tree builder**: depth-first, 0-branch before 1-branch, `2^b` leaves
//! 4. **Consumer**: host-specific graph backend behind a trait
//!
//! Result: leaf `k` of the enumeration always carries id `k`, whichever of
//! the two encodings (integer or boolean group) drove the tree.
//!
//! ## Usage Example
//!
//! ```
//! use syncdance::{build, minimum_bits, DecisionParameter, StateGraph};
//!
//! let bits = minimum_bits(5)?;
//! let root = DecisionParameter::int("OSD_SendAnim", bits)?;
//!
//! let mut graph = StateGraph::new("Local encode");
//! let parent = graph.root();
//! let leaves = build(&mut graph, &parent, root)?;
//! assert_eq!(leaves.len(), 8);
//! # Ok::<(), syncdance::SyncError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

// Core modules
pub mod bits;   // Bit width and channel assignments
pub mod param;  // Decision parameters and conditions
pub mod tree;   // Tree builder and consumer boundary
pub mod graph;  // In-memory state graph consumer
pub mod sync;   // Generation pipeline on top of the tree

// Re-exports for convenience
pub use bits::{minimum_bits, BitWidth, ChannelAssignment, MAX_BIT_WIDTH};
pub use param::{Branch, Condition, DecisionParameter, Encoding};
pub use tree::{build, RouteTarget, TreeConsumer, TreeLeaf};
pub use graph::{NodeId, NodeKind, StateGraph, ToDot};
pub use sync::{SyncConfig, EmoteEntry};

use thiserror::Error;

/// Errors that can occur while encoding ids or building trees
#[derive(Error, Debug)]
pub enum SyncError {
    /// Caller passed a value outside the accepted domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation is not valid for the current node (builder logic error)
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Tree consumer failed to create a node or route
    #[error("consumer failure: {0}")]
    ConsumerFailure(String),

    /// Configuration could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration could not be read
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Helper for constructing consumer-originated errors.
    pub fn consumer_failure(msg: impl Into<String>) -> Self {
        SyncError::ConsumerFailure(msg.into())
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        SyncError::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        SyncError::InvalidState(msg.into())
    }
}

/// Convenience alias used throughout the crate
pub type Result<T, E = SyncError> = std::result::Result<T, E>;
