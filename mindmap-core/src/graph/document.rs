//! Document Format
//!
//! JSON shape used for export and import:
//!
//! ```json
//! {
//!   "nodes": [ { "id": "node_0", "text": "...", "parent": null, "children": ["node_1"], ... } ],
//!   "rootId": "node_0",
//!   "selectedNodeId": "node_0",
//!   "title": "New Mind Map",
//!   "layout": "radial",
//!   "theme": "default"
//! }
//! ```
//!
//! `nodes` is a bare array of node objects in insertion order, each keyed by
//! its own `id` field. Timestamps are ISO-8601 strings.
//!
//! Import validates the graph invariants before anything is replaced, so a
//! document that fails validation leaves the target graph untouched.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::node::{Node, NodeId};
use super::node_graph::NodeGraph;
use super::observer::GraphEvent;
use crate::config::GraphConfig;
use crate::error::{ImportError, ImportResult};
use crate::layout::LayoutMode;

fn default_theme() -> String {
    "default".to_string()
}

/// Serialized form of a [`NodeGraph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub nodes: Vec<Node>,
    pub root_id: NodeId,
    #[serde(default)]
    pub selected_node_id: Option<NodeId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub layout: LayoutMode,
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Document {
    /// Snapshot a graph.
    pub fn from_graph(graph: &NodeGraph) -> Self {
        Self {
            nodes: graph.all_nodes().cloned().collect(),
            root_id: graph.root_id().clone(),
            selected_node_id: graph.selected_id().cloned(),
            title: Some(graph.title().to_string()),
            layout: graph.layout_mode(),
            theme: graph.theme().to_string(),
        }
    }

    /// Parse a document from JSON without validating it.
    pub fn from_json(json: &str) -> ImportResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the document and build a graph from it.
    pub fn into_graph(self, config: GraphConfig) -> ImportResult<NodeGraph> {
        let nodes = validate(self.nodes, &self.root_id)?;

        let selected = match self.selected_node_id {
            Some(id) if nodes.contains_key(&id) => Some(id),
            Some(id) => {
                warn!(id = %id, "imported selection refers to a missing node; clearing it");
                None
            }
            None => None,
        };

        let mut graph = NodeGraph::from_parts(nodes, self.root_id, None, config);
        if let Some(title) = self.title {
            graph.title = title;
        }
        graph.layout = self.layout;
        graph.theme = self.theme;

        // Rebuild selection flags from selectedNodeId so exactly one node carries it.
        for node in graph.nodes.values_mut() {
            node.set_selected(false);
        }
        if let Some(id) = selected {
            if let Some(node) = graph.nodes.get_mut(&id) {
                node.set_selected(true);
            }
            graph.selected = Some(id);
        }

        Ok(graph)
    }
}

/// Check the graph invariants on an untrusted node list.
fn validate(list: Vec<Node>, root: &NodeId) -> ImportResult<IndexMap<NodeId, Node>> {
    let mut nodes = IndexMap::with_capacity(list.len());
    for node in list {
        let id = node.id().clone();
        if nodes.insert(id.clone(), node).is_some() {
            return Err(ImportError::DuplicateId(id));
        }
    }

    let root_node = nodes
        .get(root)
        .ok_or_else(|| ImportError::MissingRoot(root.clone()))?;
    if let Some(parent) = root_node.parent() {
        return Err(ImportError::RootHasParent {
            root: root.clone(),
            parent: parent.clone(),
        });
    }

    for node in nodes.values() {
        match node.parent() {
            None if node.id() != root => return Err(ImportError::DetachedNode(node.id().clone())),
            None => {}
            Some(parent_id) => {
                let parent = nodes.get(parent_id).ok_or_else(|| ImportError::DanglingParent {
                    node: node.id().clone(),
                    parent: parent_id.clone(),
                })?;
                if !parent.children().contains(node.id()) {
                    return Err(ImportError::LinkMismatch {
                        parent: parent_id.clone(),
                        child: node.id().clone(),
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        for child_id in node.children() {
            let child = nodes.get(child_id).ok_or_else(|| ImportError::DanglingChild {
                node: node.id().clone(),
                child: child_id.clone(),
            })?;
            if child.parent() != Some(node.id()) || !seen.insert(child_id) {
                return Err(ImportError::LinkMismatch {
                    parent: node.id().clone(),
                    child: child_id.clone(),
                });
            }
        }
    }

    // Every parent chain has to end at the root. Chains already known to
    // reach it are remembered so the walk stays linear.
    let mut grounded: HashSet<&NodeId> = HashSet::from([root]);
    for node in nodes.values() {
        let mut chain = Vec::new();
        let mut on_chain = HashSet::new();
        let mut current = node.id();
        while !grounded.contains(current) {
            if !on_chain.insert(current) {
                return Err(ImportError::Cycle(current.clone()));
            }
            chain.push(current);
            // Parents were checked above, so only the root lacks one.
            match nodes.get(current).and_then(Node::parent) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        grounded.extend(chain);
    }

    Ok(nodes)
}

impl NodeGraph {
    /// Build a graph from a JSON document with the default config.
    pub fn from_json(json: &str) -> ImportResult<Self> {
        Document::from_json(json)?.into_graph(GraphConfig::default())
    }

    /// Replace this graph's contents with an imported document.
    ///
    /// Atomic: on error the graph is unchanged. Subscribers and config are
    /// kept, and subscribers receive [`GraphEvent::Imported`] on success.
    pub fn import_json(&mut self, json: &str) -> ImportResult<()> {
        let imported = Document::from_json(json)?.into_graph(self.config.clone())?;
        debug!(nodes = imported.len(), "imported document");
        self.replace_contents(imported);
        self.notify(GraphEvent::Imported);
        Ok(())
    }

    pub fn to_document(&self) -> Document {
        Document::from_graph(self)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_document())
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_document())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: &str, parent: Option<&str>, children: &[&str]) -> serde_json::Value {
        json!({
            "id": id,
            "text": id,
            "x": 0.0,
            "y": 0.0,
            "parent": parent,
            "children": children,
            "createdAt": "2024-01-01T00:00:00Z",
            "modifiedAt": "2024-01-01T00:00:00Z",
        })
    }

    fn doc(nodes: Vec<serde_json::Value>) -> String {
        json!({ "nodes": nodes, "rootId": "r", "layout": "tree" }).to_string()
    }

    #[test]
    fn round_trips_through_json() {
        let mut graph = NodeGraph::new();
        let root = graph.root_id().clone();
        let a = graph.create_node(&root, "a", 10.0, 20.0).unwrap();
        graph.create_node(&a, "a1", 30.0, 40.0).unwrap();
        graph.set_layout_mode(LayoutMode::Org);
        graph.set_title("Plans");

        let json = graph.to_json().unwrap();
        let restored = NodeGraph::from_json(&json).unwrap();

        assert_eq!(restored.len(), 3);
        assert_eq!(restored.title(), "Plans");
        assert_eq!(restored.layout_mode(), LayoutMode::Org);
        assert_eq!(restored.root_node().children(), [a.clone()]);
        assert_eq!(restored.get_node(&a).unwrap().position().x, 10.0);
        assert_eq!(restored.selected_id(), Some(&root));
    }

    #[test]
    fn accepts_minimal_documents() {
        let json = doc(vec![node("r", None, &["a"]), node("a", Some("r"), &[])]);
        let graph = NodeGraph::from_json(&json).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.theme(), "default");
        assert_eq!(graph.layout_mode(), LayoutMode::Tree);
        assert_eq!(graph.get_node(&NodeId::from("a")).unwrap().width(), 100.0);
    }

    #[test]
    fn minting_resumes_after_imported_ids() {
        let json = json!({
            "nodes": [node("node_0", None, &["node_7"]), node("node_7", Some("node_0"), &[])],
            "rootId": "node_0",
        })
        .to_string();
        let mut graph = NodeGraph::from_json(&json).unwrap();
        let root = graph.root_id().clone();
        let fresh = graph.create_node(&root, "new", 0.0, 0.0).unwrap();
        assert_eq!(fresh.as_str(), "node_8");
    }

    #[test]
    fn rejects_missing_root() {
        let json = doc(vec![node("a", None, &[])]);
        assert!(matches!(NodeGraph::from_json(&json), Err(ImportError::MissingRoot(_))));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = doc(vec![node("r", None, &[]), node("r", None, &[])]);
        assert!(matches!(NodeGraph::from_json(&json), Err(ImportError::DuplicateId(_))));
    }

    #[test]
    fn rejects_second_parentless_node() {
        let json = doc(vec![node("r", None, &[]), node("stray", None, &[])]);
        assert!(matches!(NodeGraph::from_json(&json), Err(ImportError::DetachedNode(_))));
    }

    #[test]
    fn rejects_dangling_references() {
        let json = doc(vec![node("r", None, &[]), node("a", Some("ghost"), &[])]);
        assert!(matches!(
            NodeGraph::from_json(&json),
            Err(ImportError::DanglingParent { .. })
        ));

        let json = doc(vec![node("r", None, &["ghost"])]);
        assert!(matches!(
            NodeGraph::from_json(&json),
            Err(ImportError::DanglingChild { .. })
        ));
    }

    #[test]
    fn rejects_one_sided_links() {
        let json = doc(vec![node("r", None, &[]), node("a", Some("r"), &[])]);
        assert!(matches!(
            NodeGraph::from_json(&json),
            Err(ImportError::LinkMismatch { .. })
        ));
    }

    #[test]
    fn rejects_cycles() {
        let json = doc(vec![
            node("r", None, &[]),
            node("a", Some("b"), &["b"]),
            node("b", Some("a"), &["a"]),
        ]);
        assert!(matches!(NodeGraph::from_json(&json), Err(ImportError::Cycle(_))));
    }

    #[test]
    fn failed_import_leaves_graph_untouched() {
        let mut graph = NodeGraph::new();
        let root = graph.root_id().clone();
        graph.create_node(&root, "keep", 0.0, 0.0).unwrap();
        let before = graph.to_document();

        assert!(graph.import_json("{ not json").is_err());
        assert!(graph
            .import_json(&doc(vec![node("r", None, &["ghost"])]))
            .is_err());

        assert_eq!(graph.to_document(), before);
    }

    #[test]
    fn unknown_selection_is_dropped() {
        let json = json!({
            "nodes": [node("r", None, &[])],
            "rootId": "r",
            "selectedNodeId": "ghost",
        })
        .to_string();
        let graph = NodeGraph::from_json(&json).unwrap();
        assert_eq!(graph.selected_id(), None);
    }

    #[test]
    fn selection_flags_follow_selected_id() {
        let mut a = node("a", Some("r"), &[]);
        a["selected"] = json!(true);
        let json = json!({
            "nodes": [node("r", None, &["a"]), a],
            "rootId": "r",
            "selectedNodeId": "r",
        })
        .to_string();
        let graph = NodeGraph::from_json(&json).unwrap();
        assert!(graph.root_node().is_selected());
        assert!(!graph.get_node(&NodeId::from("a")).unwrap().is_selected());
    }
}
