//! Shared helpers for building trees in integration tests

#![allow(dead_code)]

use syncdance::{build, DecisionParameter, NodeId, StateGraph, TreeLeaf};

pub type Leaves = Vec<TreeLeaf<NodeId, NodeId>>;

/// Receive-side parameter names for `bits` channels
pub fn recv_names(bits: usize) -> Vec<String> {
    (0..bits).map(|i| format!("OSD_RecvBit{i}")).collect()
}

/// Full tree driven by a single integer parameter
pub fn int_tree(bits: usize) -> (StateGraph, Leaves) {
    let mut graph = StateGraph::new("Local encode");
    let root = graph.root();
    let leaves = build(
        &mut graph,
        &root,
        DecisionParameter::int("OSD_SendAnim", bits).expect("valid bit count"),
    )
    .expect("int tree builds");
    (graph, leaves)
}

/// Full tree driven by one boolean parameter per bit
pub fn bool_tree(bits: usize) -> (StateGraph, Leaves) {
    let mut graph = StateGraph::new("Remote decode");
    let root = graph.root();
    let leaves = build(
        &mut graph,
        &root,
        DecisionParameter::bool_group(recv_names(bits), bits).expect("valid bit count"),
    )
    .expect("bool tree builds");
    (graph, leaves)
}
