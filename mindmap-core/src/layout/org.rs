//! Organisation-chart layout.
//!
//! Two passes over the tree:
//!
//! 1. Bottom-up, each node's subtree width is
//!    `max(width + node_spacing, Σ child subtree widths)`. The widest
//!    subtree found at each depth is recorded as that row's extent.
//! 2. Top-down, each node's children are laid left to right, each occupying
//!    its own subtree width, and the row of children is centered under the
//!    parent. Siblings' subtrees therefore never overlap.
//!
//! `level_widths` is kept for inspection only. Pass 2 never reads it: rows
//! are centered on each parent's own subtree width, not on the row extent.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::{visible_children, Placement};
use crate::config::LayoutConfig;
use crate::graph::{NodeGraph, NodeId, Point};

/// Result of the measuring pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrgMeasure {
    /// Horizontal span each node's subtree needs.
    pub subtree_widths: HashMap<NodeId, f64>,

    /// Widest subtree width found at each depth.
    pub level_widths: BTreeMap<usize, f64>,
}

impl OrgMeasure {
    pub fn subtree_width(&self, id: &NodeId) -> Option<f64> {
        self.subtree_widths.get(id).copied()
    }
}

pub(super) fn measure(config: &LayoutConfig, graph: &NodeGraph) -> OrgMeasure {
    let mut measure = OrgMeasure::default();
    let mut visited = HashSet::new();
    measure_subtree(config, graph, graph.root_id(), 0, &mut visited, &mut measure);
    measure
}

fn measure_subtree(
    config: &LayoutConfig,
    graph: &NodeGraph,
    id: &NodeId,
    depth: usize,
    visited: &mut HashSet<NodeId>,
    measure: &mut OrgMeasure,
) -> f64 {
    if !visited.insert(id.clone()) {
        return 0.0;
    }
    let Some(node) = graph.get_node(id) else {
        return 0.0;
    };

    let own = node.width() + config.node_spacing;
    let children = visible_children(graph, id, visited);
    let children_total: f64 = children
        .iter()
        .map(|child| measure_subtree(config, graph, child, depth + 1, visited, measure))
        .sum();

    let width = own.max(children_total);
    measure.subtree_widths.insert(id.clone(), width);
    let level = measure.level_widths.entry(depth).or_insert(0.0);
    *level = level.max(width);
    width
}

pub(super) fn layout(config: &LayoutConfig, graph: &NodeGraph) -> Placement {
    let measure = measure(config, graph);
    let mut placement = Placement::new();
    let mut visited = HashSet::new();
    place(config, graph, &measure, graph.root_id(), 0.0, 0, &mut visited, &mut placement);
    placement
}

#[allow(clippy::too_many_arguments)]
fn place(
    config: &LayoutConfig,
    graph: &NodeGraph,
    measure: &OrgMeasure,
    id: &NodeId,
    x: f64,
    depth: usize,
    visited: &mut HashSet<NodeId>,
    placement: &mut Placement,
) {
    if !visited.insert(id.clone()) {
        return;
    }
    placement.insert(id.clone(), Point::new(x, depth as f64 * config.level_distance));

    let children = visible_children(graph, id, visited);
    if children.is_empty() {
        return;
    }

    // Nodes the measuring pass skipped (reached twice in a malformed graph)
    // fall back to their own footprint.
    let widths: Vec<f64> = children
        .iter()
        .map(|child| {
            measure.subtree_width(child).unwrap_or_else(|| {
                graph
                    .get_node(child)
                    .map_or(config.node_spacing, |n| n.width() + config.node_spacing)
            })
        })
        .collect();
    let total: f64 = widths.iter().sum();

    let mut cursor = x - total / 2.0;
    for (child, width) in children.iter().zip(widths) {
        place(config, graph, measure, child, cursor + width / 2.0, depth + 1, visited, placement);
        cursor += width;
    }
}
