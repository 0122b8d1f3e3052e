//! Fishbone layout.
//!
//! The root sits at the origin on a horizontal spine. Its children are split
//! by index: the first half (rounded up) branch above the spine at
//! `y = -level_distance`, the rest below at `y = level_distance`; the `i`-th
//! branch on each side sits at `x = (i + 1) * level_distance`.
//!
//! Below a branch, every level steps further out along x by
//! `fishbone_branch_factor * level_distance`, and siblings stack away from
//! the spine at `(index + 1) * node_spacing`. A branch keeps its direction
//! (up or down) for its whole subtree.

use std::collections::HashSet;

use super::{visible_children, Placement};
use crate::config::LayoutConfig;
use crate::graph::{NodeGraph, NodeId, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Above,
    Below,
}

impl Side {
    fn sign(self) -> f64 {
        match self {
            Side::Above => -1.0,
            Side::Below => 1.0,
        }
    }
}

pub(super) fn layout(config: &LayoutConfig, graph: &NodeGraph) -> Placement {
    let mut placement = Placement::new();
    let root = graph.root_id();
    placement.insert(root.clone(), Point::ORIGIN);

    let mut visited = HashSet::from([root.clone()]);
    let branches = visible_children(graph, root, &visited);
    let split = branches.len().div_ceil(2);

    for (index, branch) in branches.iter().enumerate() {
        let (side, slot) = if index < split {
            (Side::Above, index)
        } else {
            (Side::Below, index - split)
        };
        let position = Point::new(
            (slot + 1) as f64 * config.level_distance,
            side.sign() * config.level_distance,
        );
        placement.insert(branch.clone(), position);
        place_bones(config, graph, branch, position, side, &mut visited, &mut placement);
    }
    placement
}

fn place_bones(
    config: &LayoutConfig,
    graph: &NodeGraph,
    id: &NodeId,
    origin: Point,
    side: Side,
    visited: &mut HashSet<NodeId>,
    placement: &mut Placement,
) {
    if !visited.insert(id.clone()) {
        return;
    }

    let step_x = config.level_distance * config.fishbone_branch_factor;
    for (index, child) in visible_children(graph, id, visited).iter().enumerate() {
        let position = Point::new(
            origin.x + step_x,
            origin.y + side.sign() * (index + 1) as f64 * config.node_spacing,
        );
        placement.insert(child.clone(), position);
        place_bones(config, graph, child, position, side, visited, placement);
    }
}
