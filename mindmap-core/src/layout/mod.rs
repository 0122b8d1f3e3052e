//! Layout Engine
//!
//! Assigns 2-D positions to the nodes of a [`NodeGraph`] under one of five
//! spatial algorithms.
//!
//! # Overview
//!
//! Every mode walks the tree depth-first from the root and computes a
//! [`Placement`] (node id to position) from the graph's read interface only.
//! The engine then writes the placement back and announces it once with
//! [`GraphEvent::LayoutApplied`]. Layout never changes structure, ids, text
//! or collapse flags.
//!
//! - `radial`: children fan out on widening angular wedges around their parent.
//! - `tree`: each node's horizontal window is bisected evenly among its children.
//! - `org`: bottom-up subtree widths, then top-down centering under each parent.
//! - `fishbone`: root branches alternate above and below a horizontal spine.
//! - `timeline`: nodes ordered by due date (or creation time) along the x-axis.
//!
//! # Malformed input
//!
//! Each pass carries a visited set: a node reached a second time is skipped,
//! and children that reference missing nodes are filtered out. A collapsed
//! node counts as having no visible children, so its hidden descendants keep
//! their previous positions.

mod fishbone;
mod org;
mod radial;
mod timeline;
mod tree;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{instrument, trace};

use crate::config::LayoutConfig;
use crate::error::ParseLayoutModeError;
use crate::graph::{GraphEvent, NodeGraph, NodeId, Point};

pub use org::OrgMeasure;
pub use radial::slot_angles;

/// Positions computed by a layout pass, in the order nodes were placed.
pub type Placement = IndexMap<NodeId, Point>;

/// The spatial algorithm used to position nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Radial,
    Tree,
    Org,
    Fishbone,
    Timeline,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 5] = [
        LayoutMode::Radial,
        LayoutMode::Tree,
        LayoutMode::Org,
        LayoutMode::Fishbone,
        LayoutMode::Timeline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Radial => "radial",
            LayoutMode::Tree => "tree",
            LayoutMode::Org => "org",
            LayoutMode::Fishbone => "fishbone",
            LayoutMode::Timeline => "timeline",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = ParseLayoutModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ParseLayoutModeError(s.to_string()))
    }
}

/// Computes and applies layouts.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute positions for `mode` without touching the graph.
    pub fn compute(&self, graph: &NodeGraph, mode: LayoutMode) -> Placement {
        match mode {
            LayoutMode::Radial => radial::layout(&self.config, graph),
            LayoutMode::Tree => tree::layout(&self.config, graph),
            LayoutMode::Org => org::layout(&self.config, graph),
            LayoutMode::Fishbone => fishbone::layout(&self.config, graph),
            LayoutMode::Timeline => timeline::layout(&self.config, graph),
        }
    }

    /// Lay out the graph with `mode` and write the positions back.
    ///
    /// Returns the number of nodes that were positioned.
    #[instrument(level = "trace", skip(self, graph), fields(nodes = graph.len()))]
    pub fn layout(&self, graph: &mut NodeGraph, mode: LayoutMode) -> usize {
        let placement = self.compute(graph, mode);
        for (id, position) in &placement {
            graph.place(id, *position);
        }
        trace!(%mode, placed = placement.len(), "layout applied");
        graph.notify(GraphEvent::LayoutApplied(mode));
        placement.len()
    }

    /// Lay out the graph with the mode stored in the document.
    pub fn layout_document(&self, graph: &mut NodeGraph) -> usize {
        let mode = graph.layout_mode();
        self.layout(graph, mode)
    }

    /// Pass one of the org layout: subtree widths and per-level row extents.
    pub fn measure_org(&self, graph: &NodeGraph) -> OrgMeasure {
        org::measure(&self.config, graph)
    }

    /// Translate every node so the centroid of all positions is the origin.
    ///
    /// Every node moves by the same vector; relative positions are unchanged.
    pub fn auto_arrange(&self, graph: &mut NodeGraph) {
        let count = graph.len();
        if count == 0 {
            return;
        }

        let (sum_x, sum_y) = graph
            .all_nodes()
            .fold((0.0, 0.0), |(sx, sy), n| (sx + n.x(), sy + n.y()));
        let center = Point::new(sum_x / count as f64, sum_y / count as f64);

        let shifted: Vec<_> = graph
            .all_nodes()
            .map(|n| (n.id().clone(), Point::new(n.x() - center.x, n.y() - center.y)))
            .collect();
        for (id, position) in &shifted {
            graph.place(id, *position);
        }

        trace!(dx = -center.x, dy = -center.y, "recentered layout");
        graph.notify(GraphEvent::Arranged);
    }
}

/// Children of `id` that exist, have not been visited, and are not hidden by
/// a collapsed parent.
pub(crate) fn visible_children(
    graph: &NodeGraph,
    id: &NodeId,
    visited: &HashSet<NodeId>,
) -> SmallVec<[NodeId; 8]> {
    let Some(node) = graph.get_node(id) else {
        return SmallVec::new();
    };
    if node.is_collapsed() {
        return SmallVec::new();
    }
    node.children()
        .iter()
        .filter(|c| graph.contains(c) && !visited.contains(*c))
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Root with three children; the first child has two children of its own.
    pub(crate) fn sample() -> (NodeGraph, Vec<NodeId>) {
        let mut graph = NodeGraph::new();
        let root = graph.root_id().clone();
        let a = graph.create_node(&root, "a", 0.0, 0.0).unwrap();
        let b = graph.create_node(&root, "b", 0.0, 0.0).unwrap();
        let c = graph.create_node(&root, "c", 0.0, 0.0).unwrap();
        let a1 = graph.create_node(&a, "a1", 0.0, 0.0).unwrap();
        let a2 = graph.create_node(&a, "a2", 0.0, 0.0).unwrap();
        (graph, vec![root, a, b, c, a1, a2])
    }

    pub(crate) fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn layout_modes_parse_and_display() {
        for mode in LayoutMode::ALL {
            assert_eq!(mode.to_string().parse::<LayoutMode>().unwrap(), mode);
        }
        assert!("spiral".parse::<LayoutMode>().is_err());
        assert_eq!(LayoutMode::default(), LayoutMode::Radial);
        assert_eq!(serde_json::to_string(&LayoutMode::Fishbone).unwrap(), "\"fishbone\"");
    }

    #[test]
    fn root_only_graph_is_placed_at_origin() {
        let mut graph = NodeGraph::new();
        let engine = LayoutEngine::default();
        for mode in LayoutMode::ALL {
            graph.move_node_absolute(&graph.root_id().clone(), 5.0, 5.0);
            assert_eq!(engine.layout(&mut graph, mode), 1);
            assert_eq!(graph.root_node().position(), Point::ORIGIN, "{mode}");
        }
    }

    #[test]
    fn every_mode_survives_a_cyclic_child_link() {
        let (mut graph, ids) = sample();
        // a1 claims its own parent as a child.
        graph
            .nodes
            .get_mut(&ids[4])
            .unwrap()
            .push_child(ids[1].clone());

        let engine = LayoutEngine::default();
        for mode in LayoutMode::ALL {
            let placement = engine.compute(&graph, mode);
            assert_eq!(placement.len(), 6, "{mode}");
            for (id, point) in &placement {
                assert!(point.x.is_finite() && point.y.is_finite(), "{mode}: {id}");
            }
        }
    }

    #[test]
    fn layout_never_changes_structure() {
        let (mut graph, _) = sample();
        let before = graph.to_document();
        let engine = LayoutEngine::default();
        for mode in LayoutMode::ALL {
            engine.layout(&mut graph, mode);
            let after = graph.to_document();
            assert_eq!(after.nodes.len(), before.nodes.len());
            for (old, new) in before.nodes.iter().zip(&after.nodes) {
                assert_eq!(old.id(), new.id());
                assert_eq!(old.text(), new.text());
                assert_eq!(old.children(), new.children());
                assert_eq!(old.is_collapsed(), new.is_collapsed());
            }
        }
    }

    #[test]
    fn collapsed_descendants_keep_their_positions() {
        let (mut graph, ids) = sample();
        graph.move_node_absolute(&ids[4], 999.0, 999.0);
        graph.toggle_collapse(&ids[1]);

        let engine = LayoutEngine::default();
        for mode in LayoutMode::ALL {
            let placement = engine.compute(&graph, mode);
            assert!(!placement.contains_key(&ids[4]), "{mode}");
            assert!(placement.contains_key(&ids[1]), "{mode}");
        }
        engine.layout(&mut graph, LayoutMode::Tree);
        assert_eq!(graph.get_node(&ids[4]).unwrap().position(), Point::new(999.0, 999.0));
    }

    #[test]
    fn auto_arrange_recenters_on_origin() {
        let (mut graph, ids) = sample();
        let engine = LayoutEngine::default();
        engine.layout(&mut graph, LayoutMode::Tree);
        let before: Vec<_> = graph.all_nodes().map(|n| n.position()).collect();

        engine.auto_arrange(&mut graph);

        let after: Vec<_> = graph.all_nodes().map(|n| n.position()).collect();
        let n = after.len() as f64;
        let cx: f64 = after.iter().map(|p| p.x).sum::<f64>() / n;
        let cy: f64 = after.iter().map(|p| p.y).sum::<f64>() / n;
        assert!(cx.abs() < 1e-9 && cy.abs() < 1e-9);

        let dx = after[0].x - before[0].x;
        let dy = after[0].y - before[0].y;
        for (old, new) in before.iter().zip(&after) {
            assert!(approx(new.x - old.x, dx));
            assert!(approx(new.y - old.y, dy));
        }
        assert_eq!(ids.len(), after.len());
    }

    #[test]
    fn layout_notifies_once() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let (mut graph, _) = sample();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        graph.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        LayoutEngine::default().layout(&mut graph, LayoutMode::Org);
        assert_eq!(*events.borrow(), vec![GraphEvent::LayoutApplied(LayoutMode::Org)]);
    }

    #[test]
    fn layout_document_uses_stored_mode() {
        let (mut graph, ids) = sample();
        graph.set_layout_mode(LayoutMode::Tree);
        LayoutEngine::default().layout_document(&mut graph);
        assert_eq!(graph.get_node(&ids[1]).unwrap().y(), 200.0);
    }

    #[test]
    fn visible_children_filters_missing_and_visited() {
        let (mut graph, ids) = sample();
        graph
            .nodes
            .get_mut(&ids[0])
            .unwrap()
            .push_child(NodeId::from("ghost"));
        let visited = HashSet::from([ids[2].clone()]);
        let children = visible_children(&graph, &ids[0], &visited);
        assert_eq!(children.as_slice(), [ids[1].clone(), ids[3].clone()]);
    }
}
