use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::schema::Schema;

/// A directed graph of table dependencies via foreign keys.
/// Edges point from dependent table to referenced table (child → parent).
/// Self-references are recorded as a node flag, not as edges, so they never
/// participate in cycle detection; the engine breaks them with the tiered
/// model instead.
pub struct DependencyGraph {
    pub graph: DiGraph<String, EdgeInfo>,
    pub node_indices: HashMap<String, NodeIndex>,
    self_referencing: HashMap<String, bool>,
}

/// Information about an edge (one foreign key relationship).
#[derive(Debug, Clone)]
pub struct EdgeInfo {
    /// Source columns in the dependent table.
    pub columns: Vec<String>,
    /// Referenced columns in the parent table.
    pub referenced_columns: Vec<String>,
    /// Whether every source column is nullable (a breakable edge).
    pub is_nullable: bool,
}

impl DependencyGraph {
    /// Build the dependency graph from a schema.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut self_referencing = HashMap::new();

        for table_name in schema.tables.keys() {
            let idx = graph.add_node(table_name.clone());
            node_indices.insert(table_name.clone(), idx);
            self_referencing.insert(table_name.clone(), false);
        }

        for (table_name, table) in &schema.tables {
            for fk in table.foreign_keys() {
                if fk.referenced_table == *table_name {
                    self_referencing.insert(table_name.clone(), true);
                    continue;
                }
                if let (Some(&from), Some(&to)) = (
                    node_indices.get(table_name),
                    node_indices.get(fk.referenced_table),
                ) {
                    let is_nullable = fk.columns.iter().all(|col| {
                        table.column(col).map(|c| c.nullable).unwrap_or(false)
                    });
                    graph.add_edge(
                        from,
                        to,
                        EdgeInfo {
                            columns: fk.columns.to_vec(),
                            referenced_columns: fk.referenced_columns.to_vec(),
                            is_nullable,
                        },
                    );
                }
            }
        }

        Self {
            graph,
            node_indices,
            self_referencing,
        }
    }

    pub fn table_name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    pub fn node_index(&self, table_name: &str) -> Option<NodeIndex> {
        self.node_indices.get(table_name).copied()
    }

    pub fn is_self_referencing(&self, table_name: &str) -> bool {
        self.self_referencing.get(table_name).copied().unwrap_or(false)
    }

    pub fn table_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
