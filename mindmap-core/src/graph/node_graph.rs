//! Node Graph
//!
//! The node graph owns every node of the mind map in an insertion-ordered
//! arena keyed by id. Parent and child links are stored on both ends and
//! every public mutation keeps them consistent:
//!
//! 1. Exactly one node has no parent (the root) and it is never deleted.
//! 2. `child.parent == p.id` iff `p.children` contains `child.id`.
//! 3. No node is its own ancestor.
//! 4. Ids are unique for the lifetime of the graph.
//!
//! Lookups that miss and operations that are not allowed (deleting the root,
//! creating under an unknown parent) return `None`/`false` instead of an
//! error. Traversals carry a visited set, so a malformed graph can produce a
//! wrong answer but never an endless loop.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{debug, instrument, trace, warn};

use super::node::{Node, NodeId, Point};
use super::observer::{GraphEvent, SubscriberId, Subscribers};
use crate::config::{GraphConfig, SelectionFallback};
use crate::layout::LayoutMode;

/// How a move treats the moved node's descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePolicy {
    /// Translate the node and rigidly translate its whole subtree by the same delta.
    /// Used for free-form dragging.
    Cascading,

    /// Reposition only the named node. Used when a layout pass follows and
    /// will place the descendants anyway.
    Absolute,
}

/// Directions for moving through the tree from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Parent,
    FirstChild,
    PreviousSibling,
    NextSibling,
}

/// The mind map document: the node tree plus its document-level properties.
#[derive(Debug)]
pub struct NodeGraph {
    /// All nodes, in insertion order.
    pub(crate) nodes: IndexMap<NodeId, Node>,
    pub(crate) root: NodeId,
    pub(crate) selected: Option<NodeId>,
    pub(crate) title: String,
    pub(crate) layout: LayoutMode,
    pub(crate) theme: String,

    /// Next sequence number for minted ids.
    pub(crate) next_id: u64,
    pub(crate) config: GraphConfig,
    subscribers: Subscribers,
}

impl NodeGraph {
    /// Create a graph holding only a selected root node at the origin.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create a graph holding only a root node, sized from `config`.
    pub fn with_config(config: GraphConfig) -> Self {
        let root_id = NodeId::new("node_0");
        let mut root = Node::new(
            root_id.clone(),
            config.root_text.clone(),
            Point::ORIGIN,
            (config.root_width, config.root_height),
            None,
        );
        root.set_selected(true);

        let mut nodes = IndexMap::new();
        nodes.insert(root_id.clone(), root);

        Self {
            nodes,
            root: root_id.clone(),
            selected: Some(root_id),
            title: config.title.clone(),
            layout: LayoutMode::default(),
            theme: "default".to_string(),
            next_id: 1,
            config,
            subscribers: Subscribers::default(),
        }
    }

    /// Assemble a graph from already-validated parts, keeping this graph's
    /// config and subscribers.
    pub(crate) fn replace_contents(&mut self, other: NodeGraph) {
        self.nodes = other.nodes;
        self.root = other.root;
        self.selected = other.selected;
        self.title = other.title;
        self.layout = other.layout;
        self.theme = other.theme;
        self.next_id = other.next_id;
    }

    pub(crate) fn from_parts(
        nodes: IndexMap<NodeId, Node>,
        root: NodeId,
        selected: Option<NodeId>,
        config: GraphConfig,
    ) -> Self {
        let next_id = nodes
            .keys()
            .filter_map(NodeId::sequence)
            .max()
            .map_or(0, |n| n + 1);

        Self {
            nodes,
            root,
            selected,
            title: config.title.clone(),
            layout: LayoutMode::default(),
            theme: "default".to_string(),
            next_id,
            config,
            subscribers: Subscribers::default(),
        }
    }

    /// Get the graph's configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    fn mint_id(&mut self) -> NodeId {
        loop {
            let id = NodeId::new(format!("node_{}", self.next_id));
            self.next_id += 1;
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    // ---------------------------------------------------------------------
    // Structural mutations
    // ---------------------------------------------------------------------

    /// Create a node as the last child of `parent`.
    ///
    /// Returns `None` if the parent does not exist.
    pub fn create_node(
        &mut self,
        parent: &NodeId,
        text: impl Into<String>,
        x: f64,
        y: f64,
    ) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            debug!(parent = %parent, "create_node: unknown parent");
            return None;
        }

        let id = self.mint_id();
        let size = (self.config.default_node_width, self.config.default_node_height);
        let node = Node::new(id.clone(), text, Point::new(x, y), size, Some(parent.clone()));
        self.nodes.insert(id.clone(), node);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.push_child(id.clone());
        }

        debug!(id = %id, parent = %parent, "created node");
        self.notify(GraphEvent::NodeCreated(id.clone()));
        Some(id)
    }

    /// Delete a node and its entire subtree.
    ///
    /// Returns false for the root or an unknown id. If the selection was
    /// inside the removed subtree it is cleared or moved to the parent,
    /// according to [`GraphConfig::selection_on_delete`].
    #[instrument(level = "trace", skip(self))]
    pub fn delete_node(&mut self, id: &NodeId) -> bool {
        if *id == self.root {
            warn!(id = %id, "refusing to delete the root node");
            return false;
        }
        let Some(node) = self.nodes.get(id) else {
            debug!(id = %id, "delete_node: unknown id");
            return false;
        };
        let parent = node.parent().cloned();

        let doomed = self.descendants(id);
        if let Some(parent_node) = parent.as_ref().and_then(|p| self.nodes.get_mut(p)) {
            parent_node.remove_child(id);
        }
        for doomed_id in &doomed {
            self.nodes.shift_remove(doomed_id);
        }

        let selection_removed = self
            .selected
            .as_ref()
            .is_some_and(|s| !self.nodes.contains_key(s));
        if selection_removed {
            let fallback = match self.config.selection_on_delete {
                SelectionFallback::Clear => None,
                SelectionFallback::Parent => parent,
            };
            self.apply_selection(fallback);
        }

        debug!(id = %id, removed = doomed.len(), "deleted subtree");
        self.notify(GraphEvent::NodeDeleted {
            id: id.clone(),
            removed: doomed.len(),
        });
        if selection_removed {
            self.notify(GraphEvent::SelectionChanged(self.selected.clone()));
        }
        true
    }

    /// Replace a node's text. Returns false if the node is unknown.
    pub fn update_node_text(&mut self, id: &NodeId, text: impl Into<String>) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        node.set_text(text);
        self.notify(GraphEvent::TextChanged(id.clone()));
        true
    }

    /// Move a node with the given policy.
    pub fn move_node(&mut self, id: &NodeId, x: f64, y: f64, policy: MovePolicy) -> bool {
        match policy {
            MovePolicy::Cascading => self.move_node_cascading(id, x, y),
            MovePolicy::Absolute => self.move_node_absolute(id, x, y),
        }
    }

    /// Move a node to `(x, y)` and translate its subtree by the same delta.
    pub fn move_node_cascading(&mut self, id: &NodeId, x: f64, y: f64) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        let dx = x - node.x();
        let dy = y - node.y();

        let subtree = self.descendants(id);
        for member in &subtree {
            if let Some(n) = self.nodes.get_mut(member) {
                n.translate(dx, dy);
            }
        }

        trace!(id = %id, dx, dy, moved = subtree.len(), "cascading move");
        self.notify(GraphEvent::NodeMoved {
            id: id.clone(),
            moved: subtree.len(),
        });
        true
    }

    /// Move only the named node to `(x, y)`.
    pub fn move_node_absolute(&mut self, id: &NodeId, x: f64, y: f64) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        node.set_position(Point::new(x, y));

        trace!(id = %id, x, y, "absolute move");
        self.notify(GraphEvent::NodeMoved {
            id: id.clone(),
            moved: 1,
        });
        true
    }

    /// Record the size the renderer measured for a node.
    pub fn set_node_size(&mut self, id: &NodeId, width: f64, height: f64) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        node.set_size(width, height);
        self.notify(GraphEvent::SizeChanged(id.clone()));
        true
    }

    /// Move `child` to position `index` among its parent's children.
    ///
    /// Indices past the end place it last. Returns false if `child` is not a
    /// child of `parent`.
    pub fn reorder_child(&mut self, parent: &NodeId, child: &NodeId, index: usize) -> bool {
        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return false;
        };
        if !parent_node.reposition_child(child, index) {
            return false;
        }
        trace!(parent = %parent, child = %child, index, "reordered child");
        self.notify(GraphEvent::ChildrenReordered(parent.clone()));
        true
    }

    /// Flip a node's collapsed flag. Returns false if the node is unknown.
    pub fn toggle_collapse(&mut self, id: &NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        node.toggle_collapsed();
        self.notify(GraphEvent::CollapseToggled(id.clone()));
        true
    }

    /// Select a node, or clear the selection with `None`.
    ///
    /// At most one node is selected at a time. Returns false (and leaves the
    /// selection alone) if the id is unknown.
    pub fn select_node(&mut self, id: Option<&NodeId>) -> bool {
        if let Some(id) = id {
            if !self.nodes.contains_key(id) {
                return false;
            }
        }
        self.apply_selection(id.cloned());
        self.notify(GraphEvent::SelectionChanged(self.selected.clone()));
        true
    }

    fn apply_selection(&mut self, id: Option<NodeId>) {
        if let Some(previous) = self.selected.take() {
            if let Some(node) = self.nodes.get_mut(&previous) {
                node.set_selected(false);
            }
        }
        if let Some(node) = id.as_ref().and_then(|id| self.nodes.get_mut(id)) {
            node.set_selected(true);
            self.selected = id;
        }
    }

    /// Move the selection one step from the currently selected node.
    pub fn select_neighbor(&mut self, direction: Navigation) -> bool {
        let Some(current) = self.selected.clone() else {
            return false;
        };
        match self.neighbor(&current, direction) {
            Some(target) => self.select_node(Some(&target)),
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // Metadata
    // ---------------------------------------------------------------------

    fn update_metadata(&mut self, id: &NodeId, update: impl FnOnce(&mut Node) -> bool) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        let changed = update(node);
        if changed {
            self.notify(GraphEvent::MetadataChanged(id.clone()));
        }
        changed
    }

    /// Set the priority, clamped to `0..=5`.
    pub fn set_priority(&mut self, id: &NodeId, priority: u8) -> bool {
        self.update_metadata(id, |n| {
            n.set_priority(priority);
            true
        })
    }

    /// Set the progress percentage, clamped to `0..=100`.
    pub fn set_progress(&mut self, id: &NodeId, progress: u8) -> bool {
        self.update_metadata(id, |n| {
            n.set_progress(progress);
            true
        })
    }

    /// Replace a node's notes.
    pub fn set_notes(&mut self, id: &NodeId, notes: impl Into<String>) -> bool {
        let notes = notes.into();
        self.update_metadata(id, |n| {
            n.set_notes(notes);
            true
        })
    }

    /// Add a tag. Returns false if the node is unknown or already has it.
    pub fn add_tag(&mut self, id: &NodeId, tag: &str) -> bool {
        self.update_metadata(id, |n| n.add_tag(tag))
    }

    /// Remove a tag. Returns false if the node is unknown or lacks it.
    pub fn remove_tag(&mut self, id: &NodeId, tag: &str) -> bool {
        self.update_metadata(id, |n| n.remove_tag(tag))
    }

    /// Set or clear a node's due date.
    pub fn set_due_date(&mut self, id: &NodeId, due: Option<DateTime<Utc>>) -> bool {
        self.update_metadata(id, |n| {
            n.set_due_date(due);
            true
        })
    }

    /// Copy every non-structural attribute of `record` onto node `id`.
    ///
    /// Used when a deleted subtree is recreated; the id, links and selection
    /// flag are left to the caller.
    pub(crate) fn restore_attributes(&mut self, id: &NodeId, record: &Node) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        node.copy_attributes_from(record);
        true
    }

    // ---------------------------------------------------------------------
    // Document properties
    // ---------------------------------------------------------------------

    /// Get the document title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set the document title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.notify(GraphEvent::DocumentChanged);
    }

    /// The layout mode stored with the document.
    pub fn layout_mode(&self) -> LayoutMode {
        self.layout
    }

    /// Store a layout mode with the document. Does not run the layout.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        self.layout = mode;
        self.notify(GraphEvent::DocumentChanged);
    }

    /// Name of the theme; opaque to the core.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Set the theme name.
    pub fn set_theme(&mut self, theme: impl Into<String>) {
        self.theme = theme.into();
        self.notify(GraphEvent::DocumentChanged);
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Get a node by ID.
    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Check if a node with this ID exists.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes in insertion order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// Get the root node's ID.
    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    /// Get the root node. The root always exists.
    pub fn root_node(&self) -> &Node {
        &self.nodes[&self.root]
    }

    /// Get the selected node's ID, if any.
    pub fn selected_id(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// Get the selected node, if any.
    pub fn selected_node(&self) -> Option<&Node> {
        self.selected.as_ref().and_then(|id| self.nodes.get(id))
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Hit test over all nodes with a fixed box size.
    ///
    /// When boxes overlap the last match in insertion order wins, which is
    /// the node drawn on top.
    pub fn find_node_at(&self, point: Point, node_width: f64, node_height: f64) -> Option<&Node> {
        self.nodes
            .values()
            .filter(|n| n.contains(point, node_width, node_height))
            .last()
    }

    /// The node one step away from `id` in the given direction.
    pub fn neighbor(&self, id: &NodeId, direction: Navigation) -> Option<NodeId> {
        let node = self.nodes.get(id)?;
        match direction {
            Navigation::Parent => node.parent().cloned(),
            Navigation::FirstChild => node
                .children()
                .iter()
                .find(|c| self.nodes.contains_key(*c))
                .cloned(),
            Navigation::PreviousSibling | Navigation::NextSibling => {
                let siblings = self.nodes.get(node.parent()?)?.children();
                let index = siblings.iter().position(|s| s == id)?;
                let target = if direction == Navigation::PreviousSibling {
                    index.checked_sub(1)?
                } else {
                    index + 1
                };
                siblings.get(target).cloned()
            }
        }
    }

    /// The node and all its descendants in pre-order (children in order).
    ///
    /// Empty if the id is unknown. Children that point at missing nodes are
    /// skipped, and a node reached twice is only listed once.
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        if !self.nodes.contains_key(id) {
            return result;
        }

        let mut visited = HashSet::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(
                    node.children()
                        .iter()
                        .rev()
                        .filter(|c| !visited.contains(*c))
                        .cloned(),
                );
                result.push(current);
            }
        }
        result
    }

    /// Nodes reachable from the root without entering a collapsed node's
    /// children, in pre-order. This is what a renderer draws.
    pub fn visible_nodes(&self) -> Vec<&Node> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![&self.root];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            result.push(node);
            if !node.is_collapsed() {
                stack.extend(node.children().iter().rev());
            }
        }
        result
    }

    /// Number of edges between the root and `id`.
    pub fn depth_of(&self, id: &NodeId) -> Option<usize> {
        let mut depth = 0;
        let mut current = self.nodes.get(id)?;
        while let Some(parent) = current.parent() {
            depth += 1;
            if depth > self.nodes.len() {
                return None;
            }
            current = self.nodes.get(parent)?;
        }
        Some(depth)
    }

    /// Whether `ancestor` lies strictly above `node` on its parent chain.
    pub fn is_ancestor(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut steps = 0;
        let mut current = self.nodes.get(node).and_then(Node::parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.nodes.get(id).and_then(Node::parent);
        }
        false
    }

    // ---------------------------------------------------------------------
    // Layout support and notification
    // ---------------------------------------------------------------------

    /// Set a node's position without emitting an event; layout passes
    /// announce themselves once with [`GraphEvent::LayoutApplied`].
    pub(crate) fn place(&mut self, id: &NodeId, position: Point) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_position(position);
        }
    }

    /// Put back recorded positions, announced as one move of `id`.
    pub(crate) fn restore_positions(&mut self, id: &NodeId, positions: &[(NodeId, Point)]) {
        let mut moved = 0;
        for (member, position) in positions {
            if let Some(node) = self.nodes.get_mut(member) {
                node.set_position(*position);
                moved += 1;
            }
        }
        if moved > 0 {
            self.notify(GraphEvent::NodeMoved {
                id: id.clone(),
                moved,
            });
        }
    }

    /// Register a callback invoked after every mutation.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriberId
    where
        F: FnMut(&GraphEvent) + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn notify(&mut self, event: GraphEvent) {
        self.subscribers.notify(&event);
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}
