//! Layout - tree layout engine
//!
//! Assigns every reachable node a depth level and a 2-D coordinate.
//! Siblings occupy disjoint spans sized by their subtree's leaf count, so
//! bounding boxes never overlap; a parent sits at the arithmetic mean of
//! its children's coordinates on the secondary axis. Single pass,
//! stateless: re-running on a changed forest recomputes from scratch.

use crate::forest::DependencyForest;
use crate::index::Position;

/// Layout orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Roots at the top, depth grows downward
    #[default]
    TopDown,
    /// Roots at the left, depth grows rightward
    LeftToRight,
}

/// Layout geometry
///
/// Any positive constants keep sibling subtrees disjoint; the defaults
/// match a 200px node with comfortable padding.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub orientation: Orientation,
    /// Secondary-axis span one leaf occupies (node size plus sibling padding)
    pub node_span: f64,
    /// Distance between consecutive depth levels
    pub level_spacing: f64,
    /// Extra padding between adjacent root trees
    pub tree_spacing: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::TopDown,
            node_span: 250.0,
            level_spacing: 180.0,
            tree_spacing: 100.0,
            origin_x: 50.0,
            origin_y: 50.0,
        }
    }
}

impl LayoutConfig {
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

/// Assign levels, subtree sizes and positions to every reachable node.
///
/// Root trees are laid out side by side along the secondary axis with
/// `tree_spacing` extra padding between them.
pub fn layout(forest: &mut DependencyForest, config: &LayoutConfig) {
    let roots = forest.roots().to_vec();

    let mut cursor = match config.orientation {
        Orientation::TopDown => config.origin_x,
        Orientation::LeftToRight => config.origin_y,
    };

    for root in roots {
        let size = measure(forest, root);
        place(forest, root, cursor, 0, config);
        cursor += size as f64 * config.node_span + config.tree_spacing;
    }
}

/// Subtree size in leaf units; an internal node is never narrower than one
fn measure(forest: &mut DependencyForest, index: usize) -> usize {
    let children = forest.node(index).children.clone();
    let size = if children.is_empty() {
        1
    } else {
        children
            .into_iter()
            .map(|child| measure(forest, child))
            .sum::<usize>()
            .max(1)
    };
    forest.node_mut(index).subtree_size = size;
    size
}

/// Place a subtree whose secondary-axis span starts at `start`; returns
/// the node's secondary-axis center
fn place(
    forest: &mut DependencyForest,
    index: usize,
    start: f64,
    level: usize,
    config: &LayoutConfig,
) -> f64 {
    let children = forest.node(index).children.clone();

    let center = if children.is_empty() {
        start + config.node_span / 2.0
    } else {
        let mut cursor = start;
        let mut centers = Vec::with_capacity(children.len());
        for child in children {
            let span = forest.node(child).subtree_size as f64 * config.node_span;
            centers.push(place(forest, child, cursor, level + 1, config));
            cursor += span;
        }
        centers.iter().sum::<f64>() / centers.len() as f64
    };

    let primary = match config.orientation {
        Orientation::TopDown => config.origin_y,
        Orientation::LeftToRight => config.origin_x,
    } + level as f64 * config.level_spacing;

    let node = forest.node_mut(index);
    node.level = level;
    node.position = match config.orientation {
        Orientation::TopDown => Position {
            x: center,
            y: primary,
        },
        Orientation::LeftToRight => Position {
            x: primary,
            y: center,
        },
    };

    center
}
