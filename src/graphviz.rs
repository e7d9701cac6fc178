//! # Graphviz Tree Dump
//!
//! Diagnostic dump of a finished search tree as a Graphviz `.dot` digraph.
//! Nodes are labeled with their rendered state, visit count and average
//! score; edges are labeled with the rendered action that produced the child.
//! Purely a debugging aid, never consulted by the search itself; this is the
//! only place where host states and actions need a [`Display`]
//! implementation.

use std::collections::VecDeque;
use std::fmt::Display;
use std::io::{self, Write};

use crate::tree::{Tree, ROOT_ID};
use crate::ActionGenerator;

/// Writes the given tree to `out` as a Graphviz digraph, one node per line in
/// breadth-first order.
///
/// Render with e.g. `dot -Tsvg tree.dot -o tree.svg`.
pub fn write_dot_file<S, A, E, W>(tree: &Tree<S, A, E>, out: &mut W) -> io::Result<()>
where
    S: Display,
    A: Display + Default,
    E: ActionGenerator<State = S, Action = A>,
    W: Write,
{
    writeln!(out, "digraph MCTS {{")?;

    let mut fringe = VecDeque::new();
    fringe.push_back(ROOT_ID);

    while let Some(id) = fringe.pop_front() {
        let node = tree.get(id);

        writeln!(
            out,
            "{} [label=\"{}\\nVisits: {}\\nScore: {}\"];",
            id,
            escape(&node.state().to_string()),
            node.num_visits(),
            node.avg_score()
        )?;

        if let Some(parent) = node.parent() {
            writeln!(
                out,
                "{} -> {} [label=\"{}\"];",
                parent,
                id,
                escape(&node.action().to_string())
            )?;
        }

        fringe.extend(node.children().iter().copied());
    }

    writeln!(out, "}}")
}

/// Escapes a rendered label for use inside a double-quoted dot string.
fn escape(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
