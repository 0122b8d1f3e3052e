//! Timeline layout.
//!
//! Tree depth does not decide placement here. Every visible node is ordered
//! by its timeline key (due date, else creation time; ties keep tree order)
//! and spaced `level_distance` apart along the x-axis, centered on 0.
//!
//! Nodes are then visited in that order: each is put on the spine and its
//! direct children are stacked at the node's x, alternating below and above
//! the spine by child index (`+1, -2, +3, ...` times `node_spacing`). A later
//! visit overrides an earlier one, so a child that sorts after its parent
//! ends up back on the spine.

use std::collections::HashSet;

use super::{visible_children, Placement};
use crate::config::LayoutConfig;
use crate::graph::{NodeGraph, Point};

pub(super) fn layout(config: &LayoutConfig, graph: &NodeGraph) -> Placement {
    let mut ordered = graph.visible_nodes();
    // Stable, so nodes with equal keys stay in pre-order.
    ordered.sort_by_key(|node| node.timeline_key());

    let span = ordered.len().saturating_sub(1) as f64 * config.level_distance;
    let start_x = -span / 2.0;

    let mut placement = Placement::new();
    let no_skip = HashSet::new();
    for (index, node) in ordered.iter().enumerate() {
        let x = start_x + index as f64 * config.level_distance;
        placement.insert(node.id().clone(), Point::new(x, 0.0));

        for (child_index, child) in visible_children(graph, node.id(), &no_skip).iter().enumerate() {
            let offset = (child_index + 1) as f64 * config.node_spacing;
            let y = if child_index % 2 == 0 { offset } else { -offset };
            placement.insert(child.clone(), Point::new(x, y));
        }
    }
    placement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;
    use crate::layout::{LayoutEngine, LayoutMode};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn spine_is_centered_and_ordered_by_due_date() {
        let mut graph = NodeGraph::new();
        let root = graph.root_id().clone();
        let base = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        let late = graph.create_node(&root, "late", 0.0, 0.0).unwrap();
        let early = graph.create_node(&root, "early", 0.0, 0.0).unwrap();
        graph.set_due_date(&root, Some(base - Duration::days(10)));
        graph.set_due_date(&late, Some(base + Duration::days(2)));
        graph.set_due_date(&early, Some(base + Duration::days(1)));

        let placement = LayoutEngine::default().compute(&graph, LayoutMode::Timeline);

        // Order: root, early, late -> x = -200, 0, 200.
        assert_eq!(placement[&root], Point::new(-200.0, 0.0));
        assert_eq!(placement[&early], Point::new(0.0, 0.0));
        assert_eq!(placement[&late], Point::new(200.0, 0.0));
    }

    #[test]
    fn children_sorted_before_parent_hang_off_its_column() {
        let mut graph = NodeGraph::new();
        let root = graph.root_id().clone();
        let base = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        let parent = graph.create_node(&root, "parent", 0.0, 0.0).unwrap();
        let kids: Vec<NodeId> = (0..3)
            .map(|i| graph.create_node(&parent, format!("k{i}"), 0.0, 0.0).unwrap())
            .collect();

        graph.set_due_date(&root, Some(base - Duration::days(30)));
        for kid in &kids {
            graph.set_due_date(kid, Some(base - Duration::days(20)));
        }
        graph.set_due_date(&parent, Some(base));

        let placement = LayoutEngine::default().compute(&graph, LayoutMode::Timeline);

        // Five nodes; parent sorts last at x = 400.
        assert_eq!(placement[&parent], Point::new(400.0, 0.0));
        assert_eq!(placement[&kids[0]], Point::new(400.0, 50.0));
        assert_eq!(placement[&kids[1]], Point::new(400.0, -100.0));
        assert_eq!(placement[&kids[2]], Point::new(400.0, 150.0));
    }

    #[test]
    fn single_node_sits_at_origin() {
        let graph = NodeGraph::new();
        let placement = LayoutEngine::default().compute(&graph, LayoutMode::Timeline);
        assert_eq!(placement[graph.root_id()], Point::ORIGIN);
    }
}
