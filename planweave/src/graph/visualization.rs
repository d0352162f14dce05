//! Export a compiled graph's structure as Graphviz DOT or plain text.
//!
//! Conditional edges are drawn dashed and labelled with their routing key.

use std::fmt::Debug;
use std::fmt::Write;

use super::{CompiledStateGraph, NextEntry};
use super::{END, START};

/// Outgoing edges of `node_id` as (target, optional label), in stable order.
fn outgoing<S>(graph: &CompiledStateGraph<S>, node_id: &str) -> Vec<(String, Option<String>)>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    match graph.next_map.get(node_id) {
        Some(NextEntry::Unconditional(to)) => vec![(to.clone(), None)],
        Some(NextEntry::Conditional(router)) => router
            .targets()
            .into_iter()
            .map(|(key, to)| (to, Some(key)))
            .collect(),
        None => {
            let pos = graph.edge_order.iter().position(|x| x == node_id);
            match pos.and_then(|p| graph.edge_order.get(p + 1)) {
                Some(next) => vec![(next.clone(), None)],
                None => Vec::new(),
            }
        }
    }
}

/// Graphviz DOT for the graph, renderable with `dot -Tpng`.
pub fn generate_dot<S>(graph: &CompiledStateGraph<S>) -> String
where
    S: Clone + Send + Sync + Debug + 'static,
{
    let mut dot = String::from("digraph {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=box];\n\n");
    let _ = writeln!(
        dot,
        "  \"{}\" [label=\"START\", style=\"bold,filled\", fillcolor=lightgreen];",
        START
    );
    let _ = writeln!(
        dot,
        "  \"{}\" [label=\"END\", style=\"bold,filled\", fillcolor=lightcoral];",
        END
    );
    for id in graph.node_ids() {
        let _ = writeln!(dot, "  \"{}\";", id);
    }
    dot.push('\n');

    let _ = writeln!(dot, "  \"{}\" -> \"{}\";", START, graph.first_node_id);
    for id in graph.node_ids() {
        for (to, label) in outgoing(graph, id) {
            match label {
                Some(key) => {
                    let _ = writeln!(
                        dot,
                        "  \"{}\" -> \"{}\" [style=dashed, label=\"{}\"];",
                        id, to, key
                    );
                }
                None => {
                    let _ = writeln!(dot, "  \"{}\" -> \"{}\";", id, to);
                }
            }
        }
    }

    dot.push_str("}\n");
    dot
}

/// Plain-text adjacency listing.
pub fn generate_text<S>(graph: &CompiledStateGraph<S>) -> String
where
    S: Clone + Send + Sync + Debug + 'static,
{
    let mut text = String::new();
    let _ = writeln!(text, "Graph Structure:");
    let _ = writeln!(text, "Nodes: {}", graph.nodes.len());
    let _ = writeln!(text, "\nEdges:");
    let _ = writeln!(text, "  {} -> {}", START, graph.first_node_id);
    for id in graph.node_ids() {
        for (to, label) in outgoing(graph, id) {
            match label {
                Some(key) => {
                    let _ = writeln!(text, "  {} -> {} [{}]", id, to, key);
                }
                None => {
                    let _ = writeln!(text, "  {} -> {}", id, to);
                }
            }
        }
    }
    text
}
