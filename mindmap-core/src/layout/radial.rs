//! Radial layout.
//!
//! The root sits at the origin. A node spreads its children evenly over an
//! angular budget: with `n` children and budget `sweep`, each child owns a
//! slot of `sweep / n` radians and sits at the slot midpoint, at distance
//! `level_distance * depth` from its parent.
//!
//! Each child then recurses with a window widened by a quarter turn on the
//! leading side and a budget of `slot + π/6`, deliberately overlapping its
//! neighbours' wedges so deep subtrees are less crowded.

use std::collections::HashSet;
use std::f64::consts::{FRAC_PI_4, FRAC_PI_6, TAU};

use super::{visible_children, Placement};
use crate::config::LayoutConfig;
use crate::graph::{NodeGraph, NodeId, Point};

/// Midpoint angles of `count` equal slots covering `sweep` radians from `start`.
///
/// Slot `i` has midpoint `start + sweep / count * (i + 0.5)`.
pub fn slot_angles(start: f64, sweep: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let step = sweep / count as f64;
    (0..count).map(|i| start + step * (i as f64 + 0.5)).collect()
}

struct Wedge {
    start: f64,
    sweep: f64,
}

pub(super) fn layout(config: &LayoutConfig, graph: &NodeGraph) -> Placement {
    let mut placement = Placement::new();
    let root = graph.root_id().clone();
    placement.insert(root.clone(), Point::ORIGIN);

    let mut visited = HashSet::new();
    let wedge = Wedge {
        start: 0.0,
        sweep: TAU,
    };
    place_children(config, graph, &root, Point::ORIGIN, wedge, 1, &mut visited, &mut placement);
    placement
}

#[allow(clippy::too_many_arguments)]
fn place_children(
    config: &LayoutConfig,
    graph: &NodeGraph,
    id: &NodeId,
    origin: Point,
    wedge: Wedge,
    depth: usize,
    visited: &mut HashSet<NodeId>,
    placement: &mut Placement,
) {
    if !visited.insert(id.clone()) {
        return;
    }

    let children = visible_children(graph, id, visited);
    if children.is_empty() {
        return;
    }

    let radius = config.level_distance * depth as f64;
    let step = wedge.sweep / children.len() as f64;
    let angles = slot_angles(wedge.start, wedge.sweep, children.len());

    for (index, (child, angle)) in children.iter().zip(angles).enumerate() {
        let position = Point::new(
            origin.x + angle.cos() * radius,
            origin.y + angle.sin() * radius,
        );
        placement.insert(child.clone(), position);

        let slot_start = wedge.start + step * index as f64;
        let child_wedge = Wedge {
            start: slot_start - FRAC_PI_4,
            sweep: step + FRAC_PI_6,
        };
        place_children(config, graph, child, position, child_wedge, depth + 1, visited, placement);
    }
}
