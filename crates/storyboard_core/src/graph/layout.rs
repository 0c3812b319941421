//! Spatial layout for leveled story graphs.
//!
//! # Responsibility
//! - Place nodes row by row: one row per level, each row centered on x = 0.
//! - Derive the bounding box and the container size for the canvas frame.
//! - Convert centered coordinates into container-relative placements.
//!
//! # Invariants
//! - y grows with level; nodes in one level keep id order left to right.
//! - Container size is never below `min_width` x `min_height`.

use crate::config::LayoutConfig;
use crate::graph::levels::assign_levels;
use crate::graph::{NodeId, StoryGraph};

/// Point in layout space (origin at the start row center).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned bounding box including per-node margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Result of one layout computation.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphLayout {
    levels: Vec<usize>,
    positions: Vec<Point>,
    bounds: Bounds,
    width: f64,
    height: f64,
    config: LayoutConfig,
}

impl GraphLayout {
    /// Levels and places every node of `graph`.
    pub fn compute(graph: &StoryGraph, config: &LayoutConfig) -> Self {
        let levels = assign_levels(graph.node_count(), graph.edges());
        let positions = place_rows(&levels, config);
        let bounds = bounding_box(&positions, config);
        let width = config.min_width.max(bounds.width() + 2.0 * config.padding);
        let height = config
            .min_height
            .max(bounds.height() + config.header_height + config.padding);

        Self {
            levels,
            positions,
            bounds,
            width,
            height,
            config: *config,
        }
    }

    pub fn level(&self, node: NodeId) -> Option<usize> {
        self.levels.get(node.index()).copied()
    }

    /// Centered layout-space position of `node`.
    pub fn position(&self, node: NodeId) -> Option<Point> {
        self.positions.get(node.index()).copied()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Container `(width, height)`.
    pub fn container_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Position of `node` relative to the container's top-left corner.
    ///
    /// Layout content starts below the header rows.
    pub fn container_position(&self, node: NodeId) -> Option<Point> {
        let point = self.position(node)?;
        Some(Point {
            x: self.width / 2.0 + point.x,
            y: self.config.header_height + (point.y - self.bounds.min_y),
        })
    }
}

fn place_rows(levels: &[usize], config: &LayoutConfig) -> Vec<Point> {
    let depth = levels.iter().copied().max().map_or(0, |max| max + 1);
    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); depth];
    for (node, level) in levels.iter().enumerate() {
        rows[*level].push(node);
    }

    let mut positions = vec![Point { x: 0.0, y: 0.0 }; levels.len()];
    for (level, row) in rows.iter().enumerate() {
        let center = (row.len() as f64 - 1.0) / 2.0;
        for (slot, node) in row.iter().enumerate() {
            positions[*node] = Point {
                x: (slot as f64 - center) * config.node_pitch,
                y: level as f64 * config.row_height,
            };
        }
    }
    positions
}

fn bounding_box(positions: &[Point], config: &LayoutConfig) -> Bounds {
    if positions.is_empty() {
        return Bounds {
            min_x: -config.node_half_width,
            min_y: -config.node_half_height,
            max_x: config.node_half_width,
            max_y: config.node_half_height,
        };
    }
    let mut bounds = Bounds {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };
    for point in positions {
        bounds.min_x = bounds.min_x.min(point.x - config.node_half_width);
        bounds.min_y = bounds.min_y.min(point.y - config.node_half_height);
        bounds.max_x = bounds.max_x.max(point.x + config.node_half_width);
        bounds.max_y = bounds.max_y.max(point.y + config.node_half_height);
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::GraphLayout;
    use crate::config::LayoutConfig;
    use crate::graph::{Edge, NodeId, StoryGraph};
    use crate::model::story::{Passage, Story};

    fn story(count: usize) -> Story {
        let mut story = Story::new("Layout");
        story.passages = (0..count)
            .map(|index| Passage::new(format!("P{index}"), ""))
            .collect();
        story.start = "P0".to_string();
        story
    }

    #[test]
    fn rows_are_centered_and_stacked() {
        let story = story(3);
        let graph = StoryGraph::from_edges(
            &story,
            vec![
                Edge::new(NodeId(0), NodeId(1)),
                Edge::new(NodeId(1), NodeId(2)),
                Edge::new(NodeId(1), NodeId(3)),
            ],
        );
        let config = LayoutConfig::default();
        let layout = GraphLayout::compute(&graph, &config);

        let start = layout.position(NodeId(0)).unwrap();
        let first = layout.position(NodeId(1)).unwrap();
        let left = layout.position(NodeId(2)).unwrap();
        let right = layout.position(NodeId(3)).unwrap();
        assert_eq!(start.x, 0.0);
        assert_eq!(first.y, config.row_height);
        assert_eq!(left.y, 2.0 * config.row_height);
        assert_eq!(left.x, -config.node_pitch / 2.0);
        assert_eq!(right.x, config.node_pitch / 2.0);
    }

    #[test]
    fn small_graphs_use_minimum_container() {
        let story = story(1);
        let graph = StoryGraph::from_story(&story);
        let config = LayoutConfig::default();
        let layout = GraphLayout::compute(&graph, &config);
        assert_eq!(layout.container_size(), (config.min_width, config.min_height));
    }

    #[test]
    fn wide_graphs_grow_the_container() {
        let story = story(6);
        let edges = (1..=6)
            .map(|target| Edge::new(NodeId(0), NodeId(target)))
            .collect();
        let graph = StoryGraph::from_edges(&story, edges);
        let config = LayoutConfig::default();
        let layout = GraphLayout::compute(&graph, &config);

        let (width, _) = layout.container_size();
        let expected = 5.0 * config.node_pitch + 2.0 * config.node_half_width + 2.0 * config.padding;
        assert_eq!(width, expected);
        assert_eq!(layout.bounds().width(), expected - 2.0 * config.padding);
    }

    #[test]
    fn container_positions_stay_inside_the_frame() {
        let story = story(5);
        let edges = (1..=5)
            .map(|target| Edge::new(NodeId(target - 1), NodeId(target)))
            .collect();
        let graph = StoryGraph::from_edges(&story, edges);
        let config = LayoutConfig::default();
        let layout = GraphLayout::compute(&graph, &config);
        let (width, height) = layout.container_size();

        for node in 0..graph.node_count() {
            let point = layout.container_position(NodeId(node)).unwrap();
            assert!(point.x - config.node_half_width >= 0.0);
            assert!(point.x + config.node_half_width <= width);
            assert!(point.y - config.node_half_height >= config.header_height - 1e-9);
            assert!(point.y + config.node_half_height <= height);
        }
        assert_eq!(layout.level(NodeId(5)), Some(5));
    }
}
