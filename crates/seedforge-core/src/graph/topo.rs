//! Generation plan construction.
//!
//! Tables are ordered parents-first with Kahn's algorithm, tie-breaking by
//! table name so the plan (and therefore the output) is reproducible. Each
//! strongly connected component of mutually dependent tables becomes a cycle
//! group resolved by two-pass deferred-FK generation: the nullable FK
//! columns inside the component are set to null in pass one and populated
//! from the completed dataset in pass two. A component whose cycles survive
//! the removal of every nullable FK cannot be broken and fails pre-flight.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::visit::EdgeRef;

use crate::error::{Result, SeedForgeError};
use crate::graph::cycle::enumerate_cycles;
use crate::graph::dag::DependencyGraph;
use crate::schema::{Schema, Table};

/// One step of the generation plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// A table whose dependencies are all satisfied by earlier phases.
    Single(String),
    /// Mutually dependent tables handled by two-pass resolution.
    CycleGroup {
        /// Pass-one generation order within the group.
        tables: Vec<String>,
        /// FK columns deferred to pass two.
        deferred: Vec<DeferredFk>,
    },
}

/// A foreign key deferred to the second pass: null in pass one, populated
/// from the completed referenced table afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredFk {
    pub table: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

/// A nullable self-referencing FK, resolved by the tiered model.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfRefPlan {
    pub table: String,
    pub columns: Vec<String>,
    pub referenced_columns: Vec<String>,
}

/// The ordered phase list plus the self-reference plans that ride along
/// with whichever phase their table lands in.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub phases: Vec<Phase>,
    pub self_refs: Vec<SelfRefPlan>,
}

impl GenerationPlan {
    /// All tables in generation order.
    pub fn table_order(&self) -> Vec<&str> {
        self.phases
            .iter()
            .flat_map(|p| match p {
                Phase::Single(t) => std::slice::from_ref(t),
                Phase::CycleGroup { tables, .. } => tables.as_slice(),
            })
            .map(|t| t.as_str())
            .collect()
    }

    /// Columns of `table` that pass one must leave null (deferred FKs and
    /// self-reference FKs).
    pub fn deferred_columns(&self, table: &str) -> HashSet<&str> {
        let mut out: HashSet<&str> = HashSet::new();
        for phase in &self.phases {
            if let Phase::CycleGroup { deferred, .. } = phase {
                for d in deferred.iter().filter(|d| d.table == table) {
                    out.extend(d.columns.iter().map(|c| c.as_str()));
                }
            }
        }
        for sr in self.self_refs.iter().filter(|sr| sr.table == table) {
            out.extend(sr.columns.iter().map(|c| c.as_str()));
        }
        out
    }

    /// Pass-one column list for a table: declaration order minus the
    /// deferred FK columns.
    pub fn phase_a_columns(&self, table: &Table) -> Vec<String> {
        let deferred = self.deferred_columns(&table.name);
        table
            .columns
            .iter()
            .filter(|c| !deferred.contains(c.name.as_str()))
            .map(|c| c.name.clone())
            .collect()
    }
}

/// Analyze the schema and produce the generation plan.
///
/// Fails with `UnbreakableCycle` when a dependency cycle (including a
/// self-reference) has no nullable FK to defer.
pub fn build_plan(schema: &Schema) -> Result<GenerationPlan> {
    let graph = DependencyGraph::from_schema(schema);

    // Self-references break automatically via the tiered model, but only a
    // nullable FK can hold the nulls tier zero needs.
    let mut self_refs = Vec::new();
    for (name, table) in &schema.tables {
        for fk in table.foreign_keys().filter(|fk| fk.referenced_table == *name) {
            let nullable = fk
                .columns
                .iter()
                .all(|col| table.column(col).map(|c| c.nullable).unwrap_or(false));
            if !nullable {
                return Err(SeedForgeError::UnbreakableCycle {
                    tables: name.clone(),
                });
            }
            self_refs.push(SelfRefPlan {
                table: name.clone(),
                columns: fk.columns.to_vec(),
                referenced_columns: fk.referenced_columns.to_vec(),
            });
        }
    }

    // Strongly connected components; petgraph returns them in reverse
    // topological order but we re-order explicitly for determinism.
    let sccs = tarjan_scc(&graph.graph);
    let mut component_of: HashMap<petgraph::graph::NodeIndex, usize> = HashMap::new();
    for (i, scc) in sccs.iter().enumerate() {
        for &node in scc {
            component_of.insert(node, i);
        }
    }

    // Resolve each multi-table component into an ordered group plus its
    // deferred edges.
    let mut groups: HashMap<usize, (Vec<String>, Vec<DeferredFk>)> = HashMap::new();
    for (i, scc) in sccs.iter().enumerate() {
        if scc.len() < 2 {
            continue;
        }
        let members: HashSet<_> = scc.iter().copied().collect();
        let mut deferred = Vec::new();
        // Dependencies that remain after deferring nullable intra-component
        // edges: table → the tables it still needs generated first.
        let mut remaining_deps: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for &node in scc {
            let table = graph.table_name(node).to_string();
            remaining_deps.entry(table.clone()).or_default();
            for edge in graph.graph.edges(node) {
                if !members.contains(&edge.target()) {
                    continue;
                }
                let target = graph.table_name(edge.target()).to_string();
                let info = edge.weight();
                if info.is_nullable {
                    deferred.push(DeferredFk {
                        table: table.clone(),
                        columns: info.columns.clone(),
                        referenced_table: target,
                        referenced_columns: info.referenced_columns.clone(),
                    });
                } else {
                    remaining_deps
                        .entry(table.clone())
                        .or_default()
                        .insert(target);
                }
            }
        }

        let ordered = kahn_order(&remaining_deps);
        if ordered.len() != scc.len() {
            let cycles = enumerate_cycles(&graph);
            let scc_names: BTreeSet<&str> =
                scc.iter().map(|&n| graph.table_name(n)).collect();
            let tables = cycles
                .iter()
                .find(|c| c.iter().all(|t| scc_names.contains(t.as_str())))
                .map(|c| c.join(" -> "))
                .unwrap_or_else(|| {
                    scc_names.into_iter().collect::<Vec<_>>().join(", ")
                });
            return Err(SeedForgeError::UnbreakableCycle { tables });
        }

        deferred.sort_by(|a, b| a.table.cmp(&b.table).then(a.columns.cmp(&b.columns)));
        groups.insert(i, (ordered, deferred));
    }

    // Order the condensation (components) parents-first with deterministic
    // ties, then emit phases.
    let mut comp_deps: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
    let mut comp_label: BTreeMap<usize, String> = BTreeMap::new();
    for (i, scc) in sccs.iter().enumerate() {
        comp_deps.entry(i).or_default();
        let label = scc
            .iter()
            .map(|&n| graph.table_name(n))
            .min()
            .unwrap_or_default()
            .to_string();
        comp_label.insert(i, label);
        for &node in scc {
            for edge in graph.graph.edges(node) {
                let target_comp = component_of[&edge.target()];
                if target_comp != i {
                    comp_deps.entry(i).or_default().insert(target_comp);
                }
            }
        }
    }

    let labeled_deps: BTreeMap<String, BTreeSet<String>> = comp_deps
        .iter()
        .map(|(i, deps)| {
            (
                comp_label[i].clone(),
                deps.iter().map(|d| comp_label[d].clone()).collect(),
            )
        })
        .collect();
    let label_to_comp: BTreeMap<String, usize> =
        comp_label.iter().map(|(i, l)| (l.clone(), *i)).collect();

    let ordered_components = kahn_order(&labeled_deps);
    debug_assert_eq!(ordered_components.len(), sccs.len());

    let mut phases = Vec::new();
    for label in ordered_components {
        let comp = label_to_comp[&label];
        match groups.remove(&comp) {
            Some((tables, deferred)) => phases.push(Phase::CycleGroup { tables, deferred }),
            None => {
                let node = sccs[comp][0];
                phases.push(Phase::Single(graph.table_name(node).to_string()));
            }
        }
    }

    Ok(GenerationPlan { phases, self_refs })
}

/// Kahn's algorithm over a dependency map (`item → items it needs first`),
/// breaking ties by name. Returns fewer items than the input when a cycle
/// remains.
fn kahn_order(deps: &BTreeMap<String, BTreeSet<String>>) -> Vec<String> {
    let mut remaining: BTreeMap<&str, BTreeSet<&str>> = deps
        .iter()
        .map(|(k, v)| (k.as_str(), v.iter().map(|d| d.as_str()).collect()))
        .collect();
    let mut ordered = Vec::new();

    loop {
        let ready: Vec<&str> = remaining
            .iter()
            .filter(|(_, d)| d.is_empty())
            .map(|(k, _)| *k)
            .collect();
        if ready.is_empty() {
            break;
        }
        // BTreeMap iteration makes `ready` name-sorted already.
        for table in &ready {
            remaining.remove(table);
            ordered.push(table.to_string());
        }
        for d in remaining.values_mut() {
            for table in &ready {
                d.remove(table);
            }
        }
    }

    ordered
}
