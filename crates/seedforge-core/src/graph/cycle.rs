//! Cycle enumeration.
//!
//! Iterative DFS with an on-stack set: whenever an edge reaches a node that
//! is currently on the DFS stack, the stack segment from that node to the
//! current one is a cycle. Cycles are deduplicated by rotating each to its
//! lexicographically smallest member, so `a → b → a` and `b → a → b` report
//! once.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::graph::dag::DependencyGraph;

/// Enumerate every distinct cycle among the FK edges (self-references are
/// node flags and never appear here).
pub fn enumerate_cycles(graph: &DependencyGraph) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = Vec::new();
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut visited: HashSet<NodeIndex> = HashSet::new();

    for start in graph.graph.node_indices() {
        if visited.contains(&start) {
            continue;
        }

        // Explicit stack of (node, next-neighbor-cursor); `on_stack` mirrors
        // the current DFS path for O(1) back-edge checks.
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();
        let mut on_stack: Vec<NodeIndex> = Vec::new();
        let mut on_stack_set: HashSet<NodeIndex> = HashSet::new();

        let neighbors = |n: NodeIndex| -> Vec<NodeIndex> {
            let mut out: Vec<NodeIndex> = graph.graph.edges(n).map(|e| e.target()).collect();
            out.sort_by(|a, b| graph.table_name(*a).cmp(graph.table_name(*b)));
            out
        };

        stack.push((start, neighbors(start), 0));
        on_stack.push(start);
        on_stack_set.insert(start);
        visited.insert(start);

        while let Some((_, succ, cursor)) = stack.last_mut() {
            if *cursor < succ.len() {
                let next = succ[*cursor];
                *cursor += 1;

                if on_stack_set.contains(&next) {
                    // Back-edge: the stack segment from `next` down is a cycle.
                    let from = on_stack.iter().position(|&n| n == next).unwrap_or(0);
                    let cycle: Vec<String> = on_stack[from..]
                        .iter()
                        .map(|&n| graph.table_name(n).to_string())
                        .collect();
                    let canonical = rotate_to_smallest(cycle);
                    if seen.insert(canonical.clone()) {
                        cycles.push(canonical);
                    }
                } else if !visited.contains(&next) {
                    visited.insert(next);
                    let next_succ = neighbors(next);
                    stack.push((next, next_succ, 0));
                    on_stack.push(next);
                    on_stack_set.insert(next);
                }
            } else {
                let (done, _, _) = stack.pop().expect("stack is non-empty");
                on_stack.pop();
                on_stack_set.remove(&done);
            }
        }
    }

    cycles
}

/// Rotate a cycle so it starts at its lexicographically smallest member.
fn rotate_to_smallest(cycle: Vec<String>) -> Vec<String> {
    if cycle.is_empty() {
        return cycle;
    }
    let min_pos = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut rotated = Vec::with_capacity(cycle.len());
    rotated.extend_from_slice(&cycle[min_pos..]);
    rotated.extend_from_slice(&cycle[..min_pos]);
    rotated
}
