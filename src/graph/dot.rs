//! Graphviz output

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{DriveValue, NodeId, NodeKind, StateGraph};

/// Render a graph in Graphviz `dot` syntax
pub trait ToDot {
    /// Write the `digraph` to `f`
    fn to_dot(&self, f: &mut impl Write) -> std::io::Result<()>;

    /// Write the `digraph` to a file at `path`
    fn dot_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.to_dot(&mut writer)?;
        writer.flush()
    }

    /// Write the `digraph` to stdout
    fn dot_to_stdout(&self) -> std::io::Result<()> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        self.to_dot(&mut lock)
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

impl StateGraph {
    fn write_machine(&self, f: &mut impl Write, id: NodeId, indent: usize) -> std::io::Result<()> {
        let pad = "  ".repeat(indent);
        let Some(node) = self.node(id) else {
            return Ok(());
        };

        writeln!(f, "{pad}subgraph cluster_{} {{", id.index())?;
        writeln!(f, "{pad}  label=\"{}\";", escape(&node.name))?;
        writeln!(f, "{pad}  {id}_entry [shape=point];")?;

        for &child in &node.children {
            let Some(child_node) = self.node(child) else {
                continue;
            };
            match child_node.kind {
                NodeKind::Machine => self.write_machine(f, child, indent + 1)?,
                NodeKind::State => {
                    let mut label = escape(&child_node.name);
                    if let Some(motion) = &child_node.motion {
                        label.push_str(&format!("\\nclip: {}", escape(motion)));
                    }
                    if child_node.write_defaults {
                        label.push_str("\\nwrite defaults");
                    }
                    for drive in &child_node.drives {
                        let value = match drive.value {
                            DriveValue::Int(v) => v.to_string(),
                            DriveValue::Bool(v) => v.to_string(),
                        };
                        label.push_str(&format!("\\n{} = {}", escape(&drive.parameter), value));
                    }
                    writeln!(f, "{pad}  {child} [label=\"{label}\", shape=box];")?;
                }
            }
        }

        for route in &node.routes {
            // edges into a cluster land on its entry point
            let target = match self.node(route.target).map(|n| n.kind) {
                Some(NodeKind::Machine) => format!("{}_entry", route.target),
                _ => route.target.to_string(),
            };
            let label = route
                .condition
                .as_ref()
                .map(|c| escape(&c.to_string()))
                .unwrap_or_else(|| "default".to_string());
            writeln!(f, "{pad}  {id}_entry -> {target} [label=\"{label}\"];")?;
        }

        writeln!(f, "{pad}}}")
    }
}

impl ToDot for StateGraph {
    fn to_dot(&self, f: &mut impl Write) -> std::io::Result<()> {
        writeln!(f, "digraph {{")?;
        writeln!(f, "  rankdir=LR;")?;
        writeln!(f, "  exit [shape=doublecircle, label=\"exit\"];")?;
        self.write_machine(f, self.root(), 1)?;

        for transition in self.transitions() {
            let to = transition
                .to
                .map(|id| id.to_string())
                .unwrap_or_else(|| "exit".to_string());
            let label = transition
                .condition
                .as_ref()
                .map(|c| escape(&c.to_string()))
                .unwrap_or_default();
            writeln!(
                f,
                "  {} -> {to} [label=\"{label}\", style=dashed];",
                transition.from
            )?;
        }

        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::DecisionParameter;
    use crate::tree::build;

    fn render(graph: &StateGraph) -> String {
        let mut out = Vec::new();
        graph.to_dot(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_bit_dot() {
        let mut graph = StateGraph::new("Encode");
        let root = graph.root();
        build(&mut graph, &root, DecisionParameter::int("Anim", 1).unwrap()).unwrap();

        let dot = render(&graph);
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("label=\"Encode\";"));
        assert!(dot.contains("n1 [label=\"bit[0] == 0\", shape=box];"));
        assert!(dot.contains("n0_entry -> n1 [label=\"Anim < 1\"];"));
        assert!(dot.contains("n0_entry -> n2 [label=\"default\"];"));
    }

    #[test]
    fn test_nested_machines_become_clusters() {
        let mut graph = StateGraph::new("Encode");
        let root = graph.root();
        build(&mut graph, &root, DecisionParameter::int("Anim", 2).unwrap()).unwrap();

        let dot = render(&graph);
        assert!(dot.contains("subgraph cluster_1 {"));
        assert!(dot.contains("n0_entry -> n1_entry"));
    }

    #[test]
    fn test_write_defaults_in_label() {
        let mut graph = StateGraph::new("Layer").with_write_defaults(true);
        let root = graph.root();
        graph.add_state(root, "Ready").unwrap();

        let dot = render(&graph);
        assert!(dot.contains("n1 [label=\"Ready\\nwrite defaults\", shape=box];"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let mut graph = StateGraph::new("Say \"hi\"");
        let root = graph.root();
        let state = graph.add_state(root, "A").unwrap();
        graph.add_transition(state, None, None).unwrap();

        let dot = render(&graph);
        assert!(dot.contains("label=\"Say \\\"hi\\\"\";"));
        assert!(dot.contains("n1 -> exit [label=\"\", style=dashed];"));
    }
}
