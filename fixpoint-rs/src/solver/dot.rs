//! Rendering of constraint systems as Graphviz dot graphs.
//!
//! Purely diagnostic; rendering has no effect on solving.

use crate::model::{Assignment, Constraints, ValueId};
use std::collections::BTreeSet;
use std::fmt::Write;

/// Renders the variables and dependencies of a constraint system.
pub fn to_dot(constraints: &Constraints) -> String {
    render(constraints, None)
}

/// Like [`to_dot`], but labels each variable with its value under
/// `assignment`.
pub fn to_dot_with(constraints: &Constraints, assignment: &Assignment) -> String {
    render(constraints, Some(assignment))
}

fn render(constraints: &Constraints, assignment: Option<&Assignment>) -> String {
    let mut variables: BTreeSet<ValueId> = BTreeSet::new();
    for constraint in constraints {
        variables.extend(constraint.inputs());
        variables.extend(constraint.outputs());
    }
    let values = assignment.map(Assignment::to_map);

    let mut out = String::new();
    out.push_str("digraph constraints {\n");
    for v in &variables {
        let line = match values.as_ref().and_then(|m| m.get(v)) {
            Some(value) => format!("  {} [label=\"{} = {}\"];\n", v, v, escape(value)),
            None => format!("  {} [label=\"{}\"];\n", v, v),
        };
        out.push_str(&line);
    }
    for constraint in constraints {
        let label = escape(&constraint.to_string());
        for input in constraint.inputs() {
            for output in constraint.outputs() {
                let _ = writeln!(out, "  {} -> {} [label=\"{}\"];", input, output, label);
            }
        }
    }
    out.push_str("}\n");
    out
}

fn escape(label: &str) -> String {
    label.replace('"', "\\\"")
}
