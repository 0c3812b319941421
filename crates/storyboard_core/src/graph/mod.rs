//! Narrative graph construction and auto-layout.
//!
//! # Responsibility
//! - Turn a `Story` into layout nodes and directed edges.
//! - Keep the node <-> passage correlation in an explicit map.
//!
//! # Invariants
//! - Node 0 is the synthetic start node; it has exactly one outgoing edge
//!   when the story has at least one passage.
//! - Passage nodes are numbered 1..=N in passage order.
//! - Self references never produce edges.

pub mod layout;
pub mod levels;
pub mod links;

use crate::model::story::Story;
use std::collections::BTreeMap;

/// Layout node identifier. `NodeId::START` is the synthetic start node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const START: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Directed "source leads to target" edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }
}

/// Explicit mapping between layout nodes and story passages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMap {
    passage_by_node: BTreeMap<NodeId, usize>,
    node_by_name: BTreeMap<String, NodeId>,
}

impl NodeMap {
    fn from_story(story: &Story) -> Self {
        let mut map = Self::default();
        for (index, passage) in story.passages.iter().enumerate() {
            let node = NodeId(index + 1);
            map.passage_by_node.insert(node, index);
            map.node_by_name.entry(passage.name.clone()).or_insert(node);
        }
        map
    }

    /// Index into `Story::passages` for a passage node.
    pub fn passage_index(&self, node: NodeId) -> Option<usize> {
        self.passage_by_node.get(&node).copied()
    }

    /// Node of the passage with exactly this name.
    pub fn node_for(&self, name: &str) -> Option<NodeId> {
        self.node_by_name.get(name).copied()
    }

    /// Passage nodes in id order.
    pub fn passage_nodes(&self) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        self.passage_by_node
            .iter()
            .map(|(node, index)| (*node, *index))
    }
}

/// Nodes, edges and node mapping for one story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryGraph {
    node_count: usize,
    edges: Vec<Edge>,
    map: NodeMap,
    start_target: Option<NodeId>,
}

impl StoryGraph {
    /// Builds the graph with link-inferred edges.
    ///
    /// The start edge targets the passage named by `story.start`, or the
    /// first passage when that name is unknown.
    pub fn from_story(story: &Story) -> Self {
        let map = NodeMap::from_story(story);
        let start_target = map
            .node_for(&story.start)
            .or_else(|| (!story.passages.is_empty()).then_some(NodeId(1)));

        let mut edges = Vec::new();
        if let Some(target) = start_target {
            edges.push(Edge::new(NodeId::START, target));
        }
        edges.extend(
            links::infer_edges(&story.passages)
                .into_iter()
                .map(|(source, target)| Edge::new(NodeId(source + 1), NodeId(target + 1))),
        );

        Self {
            node_count: story.passages.len() + 1,
            edges,
            map,
            start_target,
        }
    }

    /// Builds a graph from explicit edges instead of link inference.
    pub fn from_edges(story: &Story, edges: Vec<Edge>) -> Self {
        let map = NodeMap::from_story(story);
        let start_target = edges
            .iter()
            .find(|edge| edge.source == NodeId::START)
            .map(|edge| edge.target);
        Self {
            node_count: story.passages.len() + 1,
            edges,
            map,
            start_target,
        }
    }

    /// Number of nodes including the start node.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn map(&self) -> &NodeMap {
        &self.map
    }

    /// Target of the start node's edge.
    pub fn start_target(&self) -> Option<NodeId> {
        self.start_target
    }
}

#[cfg(test)]
mod tests {
    use super::{Edge, NodeId, StoryGraph};
    use crate::model::story::{Passage, Story};

    fn story(start: &str, passages: &[(&str, &str)]) -> Story {
        let mut story = Story::new("Graph");
        story.start = start.to_string();
        story.passages = passages
            .iter()
            .map(|(name, text)| Passage::new(*name, *text))
            .collect();
        story
    }

    #[test]
    fn start_edge_targets_named_start() {
        let graph = StoryGraph::from_story(&story("B", &[("A", ""), ("B", "[[A]]")]));
        assert_eq!(graph.start_target(), Some(NodeId(2)));
        assert_eq!(
            graph.edges(),
            &[Edge::new(NodeId(0), NodeId(2)), Edge::new(NodeId(2), NodeId(1))]
        );
    }

    #[test]
    fn unknown_start_falls_back_to_first_passage() {
        let graph = StoryGraph::from_story(&story("Missing", &[("A", ""), ("B", "")]));
        assert_eq!(graph.start_target(), Some(NodeId(1)));
    }

    #[test]
    fn empty_story_has_only_start_node() {
        let graph = StoryGraph::from_story(&story("", &[]));
        assert_eq!(graph.node_count(), 1);
        assert!(graph.edges().is_empty());
        assert_eq!(graph.start_target(), None);
    }

    #[test]
    fn map_correlates_nodes_and_passages() {
        let graph = StoryGraph::from_story(&story("A", &[("A", ""), ("B", "")]));
        assert_eq!(graph.map().passage_index(NodeId(2)), Some(1));
        assert_eq!(graph.map().node_for("A"), Some(NodeId(1)));
        assert_eq!(graph.map().passage_index(NodeId::START), None);
    }
}
