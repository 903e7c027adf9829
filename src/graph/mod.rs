//! In-memory state graph
//!
//! A minimal host for the tree builder: machines (branches) contain states
//! (leaves) and nested machines. Each machine keeps its entry routes in
//! insertion order; the first satisfied route wins, the default route last.
//! Transitions connect siblings, or leave the enclosing machine.

mod dot;

pub use dot::ToDot;

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::bits::ChannelAssignment;
use crate::param::Condition;
use crate::tree::{RouteTarget, TreeConsumer};
use crate::{Result, SyncError};

/// Handle to a node in a [`StateGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in creation order (root = 0)
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// What a node is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Terminal state
    State,

    /// Container with its own entry routes
    Machine,
}

/// Entry route of a machine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    /// Node entered
    pub target: NodeId,

    /// `None` for the default route
    pub condition: Option<Condition>,
}

/// Value written to a parameter while a state is active
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DriveValue {
    /// Integer parameter
    Int(u32),

    /// Boolean parameter
    Bool(bool),
}

/// Parameter driver attached to a state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Drive {
    /// Parameter name
    pub parameter: Arc<str>,

    /// Written value
    pub value: DriveValue,
}

/// Transition between siblings (`to = None` leaves the enclosing machine)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    /// Source state or machine
    pub from: NodeId,

    /// Destination state, or exit
    pub to: Option<NodeId>,

    /// `None` fires automatically
    pub condition: Option<Condition>,
}

/// Node of the graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    /// Display name, unique among siblings
    pub name: String,

    /// State or machine
    pub kind: NodeKind,

    /// Enclosing machine (`None` for the root)
    pub parent: Option<NodeId>,

    /// Children in creation order (machines only)
    pub children: Vec<NodeId>,

    /// Entry routes in evaluation order (machines only)
    pub routes: Vec<Route>,

    /// Clip played while active
    pub motion: Option<String>,

    /// Parameters written on entry
    pub drives: Vec<Drive>,

    /// State resets unanimated properties to their defaults (states only)
    pub write_defaults: bool,
}

impl Node {
    fn new(name: String, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            name,
            kind,
            parent,
            children: Vec::new(),
            routes: Vec::new(),
            motion: None,
            drives: Vec::new(),
            write_defaults: false,
        }
    }
}

/// Arena-backed state graph implementing [`TreeConsumer`]
#[derive(Debug, Clone)]
pub struct StateGraph {
    nodes: Vec<Node>,
    transitions: Vec<Transition>,
    node_limit: Option<usize>,
    write_defaults: bool,
}

impl StateGraph {
    /// Graph with a single root machine
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node::new(root_name.into(), NodeKind::Machine, None)],
            transitions: Vec::new(),
            node_limit: None,
            write_defaults: false,
        }
    }

    /// Cap the total number of nodes (root included)
    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Mark every state created from now on as writing defaults
    pub fn with_write_defaults(mut self, write_defaults: bool) -> Self {
        self.write_defaults = write_defaults;
        self
    }

    /// Root machine
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Total node count, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root machine exists from construction
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes with their ids, in creation order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Ids of every state, in creation order
    pub fn states(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes()
            .filter(|(_, node)| node.kind == NodeKind::State)
            .map(|(id, _)| id)
    }

    /// Transitions in insertion order
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Add a state under `parent`
    pub fn add_state(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.insert(parent, name, NodeKind::State)
    }

    /// Add a nested machine under `parent`
    pub fn add_machine(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.insert(parent, name, NodeKind::Machine)
    }

    /// Rename a node, keeping names unique among siblings
    pub fn rename(&mut self, id: NodeId, name: &str) -> Result<()> {
        let parent = self.existing(id)?.parent;
        if let Some(parent) = parent {
            if self.sibling_named(parent, name).is_some_and(|other| other != id) {
                return Err(SyncError::consumer_failure(format!(
                    "duplicate name '{name}' under '{}'",
                    self.nodes[parent.0].name
                )));
            }
        }
        self.nodes[id.0].name = name.to_string();
        Ok(())
    }

    /// Set the clip a state plays
    pub fn set_motion(&mut self, id: NodeId, motion: impl Into<String>) -> Result<()> {
        self.existing_state(id)?;
        self.nodes[id.0].motion = Some(motion.into());
        Ok(())
    }

    /// Write `value` into `parameter` when `id` is entered
    pub fn add_drive(
        &mut self,
        id: NodeId,
        parameter: impl Into<Arc<str>>,
        value: DriveValue,
    ) -> Result<()> {
        self.existing_state(id)?;
        self.nodes[id.0].drives.push(Drive {
            parameter: parameter.into(),
            value,
        });
        Ok(())
    }

    /// Add a transition to a sibling (or out of the machine when `to` is `None`)
    ///
    /// A transition out of a nested machine fires once that machine exits.
    pub fn add_transition(
        &mut self,
        from: NodeId,
        to: Option<NodeId>,
        condition: Option<Condition>,
    ) -> Result<()> {
        let Some(parent) = self.existing(from)?.parent else {
            return Err(SyncError::consumer_failure(
                "the root machine has no outgoing transitions",
            ));
        };
        if let Some(to) = to {
            if self.existing(to)?.parent != Some(parent) {
                return Err(SyncError::consumer_failure(format!(
                    "transition target {to} is not a sibling of {from}"
                )));
            }
        }
        self.transitions.push(Transition {
            from,
            to,
            condition,
        });
        Ok(())
    }

    /// Entry routes of `machine` in evaluation order
    pub fn routes(&self, machine: NodeId) -> &[Route] {
        self.nodes
            .get(machine.0)
            .map(|node| node.routes.as_slice())
            .unwrap_or(&[])
    }

    /// State the graph settles in while `channels` hold
    ///
    /// Follows entry routes from the root down to a state: within a machine
    /// the first satisfied conditional route wins and the default route is
    /// taken when none holds. From that state, conditional transitions whose
    /// condition holds are followed the same way (unconditional ones only
    /// fire over time and are ignored). Returns `None` if a machine on the
    /// way has no applicable route.
    pub fn resolve(&self, channels: &ChannelAssignment) -> Option<NodeId> {
        self.resolve_from(self.root(), channels)
    }

    /// Like [`resolve`](Self::resolve), starting at `machine`
    pub fn resolve_from(&self, machine: NodeId, channels: &ChannelAssignment) -> Option<NodeId> {
        let mut current = self.enter(machine, channels)?;
        // each hop enters a different node unless conditions cycle
        for _ in 0..self.nodes.len() {
            let next = self.transitions.iter().find_map(|transition| {
                let fires = transition.from == current
                    && transition
                        .condition
                        .as_ref()
                        .is_some_and(|condition| condition.evaluate(channels));
                if fires {
                    transition.to
                } else {
                    None
                }
            });
            match next {
                Some(next) => current = self.enter(next, channels)?,
                None => break,
            }
        }
        Some(current)
    }

    /// Descend entry routes from `node` to a state
    fn enter(&self, node: NodeId, channels: &ChannelAssignment) -> Option<NodeId> {
        let mut current = node;
        loop {
            let node = self.node(current)?;
            if node.kind == NodeKind::State {
                return Some(current);
            }
            let conditional = node.routes.iter().find(|route| {
                route
                    .condition
                    .as_ref()
                    .is_some_and(|condition| condition.evaluate(channels))
            });
            let route = conditional.or_else(|| node.routes.iter().find(|r| r.condition.is_none()))?;
            current = route.target;
        }
    }

    /// Names from the root down to `id`, root excluded
    pub fn path_to(&self, id: NodeId) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = self.node(id);
        while let Some(node) = current {
            if node.parent.is_none() {
                break;
            }
            names.push(node.name.as_str());
            current = node.parent.and_then(|parent| self.node(parent));
        }
        names.reverse();
        names
    }

    /// Structural fingerprint: equal graphs hash equal
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut rendered = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.to_dot(&mut rendered);
        blake3::hash(&rendered)
    }

    fn insert(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> Result<NodeId> {
        let parent_node = self.existing(parent)?;
        if parent_node.kind != NodeKind::Machine {
            return Err(SyncError::consumer_failure(format!(
                "'{}' is a state and cannot host '{name}'",
                parent_node.name
            )));
        }
        if self.sibling_named(parent, name).is_some() {
            return Err(SyncError::consumer_failure(format!(
                "duplicate name '{name}' under '{}'",
                parent_node.name
            )));
        }
        if let Some(limit) = self.node_limit {
            if self.nodes.len() >= limit {
                return Err(SyncError::consumer_failure(format!(
                    "node limit of {limit} reached while creating '{name}'"
                )));
            }
        }

        let id = NodeId(self.nodes.len());
        let mut node = Node::new(name.to_string(), kind, Some(parent));
        node.write_defaults = kind == NodeKind::State && self.write_defaults;
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        trace!(%id, node = name, ?kind, "node created");
        Ok(id)
    }

    fn add_route(&mut self, machine: NodeId, target: NodeId, condition: Option<Condition>) -> Result<()> {
        let node = self.existing(machine)?;
        if node.kind != NodeKind::Machine {
            return Err(SyncError::consumer_failure(format!(
                "'{}' is a state and has no entry routes",
                node.name
            )));
        }
        if self.nodes.get(target.0).and_then(|t| t.parent) != Some(machine) {
            return Err(SyncError::consumer_failure(format!(
                "route target {target} is not a child of '{}'",
                node.name
            )));
        }
        if condition.is_none() && node.routes.iter().any(|route| route.condition.is_none()) {
            return Err(SyncError::consumer_failure(format!(
                "'{}' already has a default route",
                node.name
            )));
        }
        self.nodes[machine.0].routes.push(Route { target, condition });
        Ok(())
    }

    fn sibling_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].name == name)
    }

    fn existing(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| SyncError::consumer_failure(format!("unknown node {id}")))
    }

    fn existing_state(&self, id: NodeId) -> Result<&Node> {
        let node = self.existing(id)?;
        if node.kind != NodeKind::State {
            return Err(SyncError::consumer_failure(format!(
                "'{}' is not a state",
                node.name
            )));
        }
        Ok(node)
    }
}

fn target_id(target: RouteTarget<'_, NodeId, NodeId>) -> NodeId {
    match target {
        RouteTarget::Leaf(id) | RouteTarget::Branch(id) => *id,
    }
}

impl TreeConsumer for StateGraph {
    type Leaf = NodeId;
    type Branch = NodeId;

    fn new_leaf(&mut self, parent: &NodeId, name: &str) -> Result<NodeId> {
        self.add_state(*parent, name)
    }

    fn new_branch(&mut self, parent: &NodeId, name: &str) -> Result<NodeId> {
        self.add_machine(*parent, name)
    }

    fn route_on_condition(
        &mut self,
        parent: &NodeId,
        condition: Condition,
        target: RouteTarget<'_, NodeId, NodeId>,
    ) -> Result<()> {
        self.add_route(*parent, target_id(target), Some(condition))
    }

    fn route_default(
        &mut self,
        parent: &NodeId,
        target: RouteTarget<'_, NodeId, NodeId>,
    ) -> Result<()> {
        self.add_route(*parent, target_id(target), None)
    }
}
