//! Top-down tree layout by horizontal bisection.
//!
//! The root owns the window `[-half_width, half_width]`. Every node splits
//! its window evenly among its children by count (not by subtree size) and
//! each child is centered in its slice. `y` is `depth * level_distance`.

use std::collections::HashSet;

use super::{visible_children, Placement};
use crate::config::LayoutConfig;
use crate::graph::{NodeGraph, NodeId, Point};

pub(super) fn layout(config: &LayoutConfig, graph: &NodeGraph) -> Placement {
    let mut placement = Placement::new();
    let mut visited = HashSet::new();
    let window = (-config.tree_half_width, config.tree_half_width);
    place(config, graph, graph.root_id(), 0.0, window, 0, &mut visited, &mut placement);
    placement
}

#[allow(clippy::too_many_arguments)]
fn place(
    config: &LayoutConfig,
    graph: &NodeGraph,
    id: &NodeId,
    x: f64,
    (min_x, max_x): (f64, f64),
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

    let slice = (max_x - min_x) / children.len() as f64;
    for (index, child) in children.iter().enumerate() {
        let child_min = min_x + slice * index as f64;
        let child_max = child_min + slice;
        place(
            config,
            graph,
            child,
            child_min + slice / 2.0,
            (child_min, child_max),
            depth + 1,
            visited,
            placement,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::{approx, sample};
    use crate::layout::{LayoutEngine, LayoutMode};

    #[test]
    fn children_split_parent_window_by_count() {
        let (graph, ids) = sample();
        let placement = LayoutEngine::default().compute(&graph, LayoutMode::Tree);

        assert_eq!(placement[&ids[0]], Point::new(0.0, 0.0));

        // Three slices of 1000/3 across [-500, 500].
        let slice = 1000.0 / 3.0;
        for (index, child) in ids[1..4].iter().enumerate() {
            let p = placement[child];
            assert!(approx(p.x, -500.0 + slice * (index as f64 + 0.5)));
            assert_eq!(p.y, 200.0);
        }

        // a's slice is [-500, -500 + slice], halved for its two children.
        let quarter = slice / 4.0;
        assert!(approx(placement[&ids[4]].x, -500.0 + quarter));
        assert!(approx(placement[&ids[5]].x, -500.0 + 3.0 * quarter));
        assert_eq!(placement[&ids[4]].y, 400.0);
    }

    #[test]
    fn repeated_layout_is_identical() {
        let (mut graph, _) = sample();
        let engine = LayoutEngine::default();
        engine.layout(&mut graph, LayoutMode::Tree);
        let first: Vec<_> = graph.all_nodes().map(|n| n.position()).collect();
        engine.layout(&mut graph, LayoutMode::Tree);
        let second: Vec<_> = graph.all_nodes().map(|n| n.position()).collect();
        assert_eq!(first, second);
    }
}
