//! Dependency graph rendering for the CLI `graph` command.

use crate::graph::topo::{GenerationPlan, Phase};
use crate::schema::Schema;

/// Render the FK dependency graph as a Mermaid flowchart
/// (child --> parent).
pub fn to_mermaid(schema: &Schema) -> String {
    let mut out = String::from("graph TD\n");
    for (name, table) in &schema.tables {
        if table.foreign_keys().next().is_none() {
            out.push_str(&format!("    {}\n", name));
            continue;
        }
        for fk in table.foreign_keys() {
            out.push_str(&format!(
                "    {} -->|{}| {}\n",
                name,
                fk.columns.join(","),
                fk.referenced_table
            ));
        }
    }
    out
}

/// Render the FK dependency graph in Graphviz DOT format.
pub fn to_dot(schema: &Schema) -> String {
    let mut out = String::from("digraph dependencies {\n    rankdir=LR;\n");
    for (name, table) in &schema.tables {
        out.push_str(&format!("    \"{}\";\n", name));
        for fk in table.foreign_keys() {
            out.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                name,
                fk.referenced_table,
                fk.columns.join(",")
            ));
        }
    }
    out.push_str("}\n");
    out
}

/// Human-readable phase listing for a generation plan.
pub fn describe_plan(plan: &GenerationPlan) -> String {
    let mut out = String::new();
    for (i, phase) in plan.phases.iter().enumerate() {
        match phase {
            Phase::Single(table) => {
                out.push_str(&format!("{}. {}\n", i + 1, table));
            }
            Phase::CycleGroup { tables, deferred } => {
                out.push_str(&format!(
                    "{}. cycle group [{}]\n",
                    i + 1,
                    tables.join(", ")
                ));
                for d in deferred {
                    out.push_str(&format!(
                        "     deferred: {}.({}) -> {}.({})\n",
                        d.table,
                        d.columns.join(", "),
                        d.referenced_table,
                        d.referenced_columns.join(", ")
                    ));
                }
            }
        }
    }
    for sr in &plan.self_refs {
        out.push_str(&format!(
            "   self-reference: {}.({}) resolved by tiers\n",
            sr.table,
            sr.columns.join(", ")
        ));
    }
    out
}
