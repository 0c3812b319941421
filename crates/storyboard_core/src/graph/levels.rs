//! Hierarchy level assignment.
//!
//! # Responsibility
//! - Assign every layout node the smallest level such that each forward edge
//!   descends at least one level.
//!
//! # Invariants
//! - The start node is always level 0; passages are at least level 1.
//! - Back edges (edges closing a cycle in depth-first order from the start
//!   node) are not relaxed.
//! - Levels never exceed the node count, so relaxation always terminates.

use crate::graph::{Edge, NodeId};
use std::collections::VecDeque;

/// Lowest level a passage node can take; level 0 holds only the start node.
pub const PASSAGE_MIN_LEVEL: usize = 1;

/// Computes one level per node, indexed by `NodeId`.
///
/// Runs a worklist relaxation to a fixpoint, so edges from later to earlier
/// nodes propagate fully.
pub fn assign_levels(node_count: usize, edges: &[Edge]) -> Vec<usize> {
    if node_count == 0 {
        return Vec::new();
    }

    let adjacency = forward_adjacency(node_count, edges);
    let cap = node_count;

    let mut levels = vec![PASSAGE_MIN_LEVEL; node_count];
    levels[NodeId::START.index()] = 0;

    let mut queued = vec![true; node_count];
    let mut worklist: VecDeque<usize> = (0..node_count).collect();
    while let Some(source) = worklist.pop_front() {
        queued[source] = false;
        let candidate = (levels[source] + 1).min(cap);
        for &target in &adjacency[source] {
            if candidate > levels[target] {
                levels[target] = candidate;
                if !queued[target] {
                    queued[target] = true;
                    worklist.push_back(target);
                }
            }
        }
    }
    levels
}

/// Builds sorted adjacency lists without self loops, edges into the start
/// node, out-of-range endpoints, or back edges.
fn forward_adjacency(node_count: usize, edges: &[Edge]) -> Vec<Vec<usize>> {
    let mut adjacency = vec![Vec::new(); node_count];
    for edge in edges {
        let (source, target) = (edge.source.index(), edge.target.index());
        if source >= node_count || target >= node_count {
            continue;
        }
        if source == target || target == NodeId::START.index() {
            continue;
        }
        adjacency[source].push(target);
    }
    for targets in &mut adjacency {
        targets.sort_unstable();
        targets.dedup();
    }

    let back_edges = back_edges(&adjacency);
    for (source, target) in back_edges {
        adjacency[source].retain(|candidate| *candidate != target);
    }
    adjacency
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

/// Classifies back edges with an iterative depth-first search rooted at node
/// 0, then at every still-unvisited node in id order.
fn back_edges(adjacency: &[Vec<usize>]) -> Vec<(usize, usize)> {
    let mut state = vec![Visit::New; adjacency.len()];
    let mut found = Vec::new();

    for root in 0..adjacency.len() {
        if state[root] != Visit::New {
            continue;
        }
        state[root] = Visit::Active;
        let mut stack = vec![(root, 0usize)];
        while let Some(&(node, next)) = stack.last() {
            if let Some(&target) = adjacency[node].get(next) {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                match state[target] {
                    Visit::New => {
                        state[target] = Visit::Active;
                        stack.push((target, 0));
                    }
                    Visit::Active => found.push((node, target)),
                    Visit::Done => {}
                }
            } else {
                state[node] = Visit::Done;
                stack.pop();
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::assign_levels;
    use crate::graph::{Edge, NodeId};

    fn edges(pairs: &[(usize, usize)]) -> Vec<Edge> {
        pairs
            .iter()
            .map(|(source, target)| Edge::new(NodeId(*source), NodeId(*target)))
            .collect()
    }

    #[test]
    fn linear_chain_levels_follow_depth() {
        let levels = assign_levels(4, &edges(&[(0, 1), (1, 2), (2, 3)]));
        assert_eq!(levels, vec![0, 1, 2, 3]);
    }

    #[test]
    fn diamond_takes_longest_path() {
        let levels = assign_levels(5, &edges(&[(0, 1), (1, 2), (1, 3), (2, 4), (3, 4), (1, 4)]));
        assert_eq!(levels, vec![0, 1, 2, 2, 3]);
    }

    #[test]
    fn edges_to_earlier_ids_propagate_fully() {
        // start -> C, C -> A, A -> B
        let levels = assign_levels(4, &edges(&[(0, 3), (3, 1), (1, 2)]));
        assert_eq!(levels, vec![0, 2, 3, 1]);
    }

    #[test]
    fn cycles_terminate_and_ignore_closing_edge() {
        // start -> A -> B -> A
        let levels = assign_levels(3, &edges(&[(0, 1), (1, 2), (2, 1)]));
        assert_eq!(levels, vec![0, 1, 2]);
    }

    #[test]
    fn unreachable_passages_stay_below_start_row() {
        let levels = assign_levels(3, &edges(&[(0, 1)]));
        assert_eq!(levels, vec![0, 1, 1]);
    }

    #[test]
    fn self_loops_and_edges_into_start_are_ignored() {
        let levels = assign_levels(2, &edges(&[(0, 1), (1, 1), (1, 0)]));
        assert_eq!(levels, vec![0, 1]);
    }
}
