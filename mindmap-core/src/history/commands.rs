//! Concrete commands.
//!
//! # Identity on restore
//!
//! Nodes brought back by undoing a delete, or by redoing a create, are made
//! through [`NodeGraph::create_node`] and receive freshly minted ids. Text,
//! position, size, collapse state, metadata, sibling position and selection
//! are restored under the new ids, and each `old -> new` pair goes into the
//! history's [`IdRenames`]. Commands resolve every id they stored through
//! that table before acting, so an edit recorded against a node that was
//! later deleted and restored still reaches the restored node.

use tracing::{trace, warn};

use super::{Command, IdRenames};
use crate::graph::{MovePolicy, Node, NodeGraph, NodeId, Point};

/// Creates a child node; undo deletes it again.
#[derive(Debug, Clone)]
pub struct CreateNodeCommand {
    parent: NodeId,
    text: String,
    position: Point,
    created: Option<NodeId>,
}

impl CreateNodeCommand {
    pub fn new(parent: NodeId, text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            parent,
            text: text.into(),
            position: Point::new(x, y),
            created: None,
        }
    }

    /// Id assigned by the most recent `execute`, if it succeeded.
    pub fn created_id(&self) -> Option<&NodeId> {
        self.created.as_ref()
    }
}

impl Command for CreateNodeCommand {
    fn execute(&mut self, graph: &mut NodeGraph, renames: &mut IdRenames) {
        let parent = renames.resolve(&self.parent);
        let created = graph.create_node(
            &parent,
            self.text.clone(),
            self.position.x,
            self.position.y,
        );
        // A redo mints a new id for the node an earlier execute created.
        if let (Some(old), Some(new)) = (self.created.take(), created.as_ref()) {
            renames.record(old, new.clone());
        }
        self.created = created;
    }

    fn undo(&mut self, graph: &mut NodeGraph, renames: &mut IdRenames) {
        // Delete is recursive; when undone in reverse order nothing has been
        // created beneath this node yet.
        if let Some(id) = &self.created {
            graph.delete_node(&renames.resolve(id));
        }
    }

    fn label(&self) -> &str {
        "Add node"
    }
}

/// One node of a deleted subtree, captured before deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    /// Id the node had when it was captured.
    pub id: NodeId,

    /// Parent id at capture time.
    pub parent: Option<NodeId>,

    /// Full attribute record.
    pub record: Node,
}

/// Deletes a node and its subtree; undo recreates the subtree top-down.
#[derive(Debug, Clone)]
pub struct DeleteNodeCommand {
    target: NodeId,

    /// Subtree in pre-order; the first entry is the deleted node itself.
    snapshot: Vec<NodeSnapshot>,

    /// Position of the deleted node among its siblings.
    sibling_index: usize,
}

impl DeleteNodeCommand {
    /// Capture the subtree rooted at `id` as it is now.
    pub fn new(graph: &NodeGraph, id: NodeId) -> Self {
        let mut command = Self {
            target: id,
            snapshot: Vec::new(),
            sibling_index: 0,
        };
        command.capture(graph);
        command
    }

    /// The node the next `execute` deletes. Changes after an undo, because
    /// the restored subtree has new ids.
    pub fn target(&self) -> &NodeId {
        &self.target
    }

    pub fn snapshot(&self) -> &[NodeSnapshot] {
        &self.snapshot
    }

    fn capture(&mut self, graph: &NodeGraph) {
        self.snapshot = graph
            .descendants(&self.target)
            .into_iter()
            .filter_map(|id| graph.get_node(&id))
            .map(|node| NodeSnapshot {
                id: node.id().clone(),
                parent: node.parent().cloned(),
                record: node.clone(),
            })
            .collect();

        self.sibling_index = graph
            .get_node(&self.target)
            .and_then(|n| n.parent())
            .and_then(|p| graph.get_node(p))
            .and_then(|p| p.children().iter().position(|c| *c == self.target))
            .unwrap_or(0);
    }
}

impl Command for DeleteNodeCommand {
    fn execute(&mut self, graph: &mut NodeGraph, renames: &mut IdRenames) {
        self.target = renames.resolve(&self.target);
        if graph.contains(&self.target) {
            self.capture(graph);
        }
        graph.delete_node(&self.target);
    }

    fn undo(&mut self, graph: &mut NodeGraph, renames: &mut IdRenames) {
        let Some((top, rest)) = self.snapshot.split_first() else {
            return;
        };
        let Some(parent) = top.parent.as_ref().map(|p| renames.resolve(p)) else {
            return;
        };

        let Some(new_top) =
            graph.create_node(&parent, top.record.text(), top.record.x(), top.record.y())
        else {
            warn!(parent = %parent, "cannot restore deleted subtree: parent is gone");
            return;
        };
        graph.restore_attributes(&new_top, &top.record);
        graph.reorder_child(&parent, &new_top, self.sibling_index);

        let mut renamed = vec![(top.id.clone(), new_top.clone())];
        let mut selected = top.record.is_selected().then(|| new_top.clone());

        for entry in rest {
            let new_parent = entry
                .parent
                .as_ref()
                .and_then(|old| renamed.iter().find(|(from, _)| from == old))
                .map(|(_, to)| to.clone());
            let Some(new_parent) = new_parent else {
                continue;
            };
            let Some(new_id) = graph.create_node(
                &new_parent,
                entry.record.text(),
                entry.record.x(),
                entry.record.y(),
            ) else {
                continue;
            };
            graph.restore_attributes(&new_id, &entry.record);
            if entry.record.is_selected() {
                selected = Some(new_id.clone());
            }
            renamed.push((entry.id.clone(), new_id));
        }

        if let Some(id) = selected {
            graph.select_node(Some(&id));
        }

        trace!(restored = renamed.len(), old = %self.target, new = %new_top, "restored subtree");
        for (old, new) in renamed {
            renames.record(old, new);
        }
        self.target = new_top;
    }

    fn label(&self) -> &str {
        "Delete node"
    }
}

/// Replaces a node's text.
#[derive(Debug, Clone)]
pub struct EditTextCommand {
    id: NodeId,
    old_text: String,
    new_text: String,
}

impl EditTextCommand {
    pub fn new(graph: &NodeGraph, id: NodeId, new_text: impl Into<String>) -> Self {
        let old_text = graph
            .get_node(&id)
            .map(|n| n.text().to_string())
            .unwrap_or_default();
        Self {
            id,
            old_text,
            new_text: new_text.into(),
        }
    }
}

impl Command for EditTextCommand {
    fn execute(&mut self, graph: &mut NodeGraph, renames: &mut IdRenames) {
        graph.update_node_text(&renames.resolve(&self.id), self.new_text.clone());
    }

    fn undo(&mut self, graph: &mut NodeGraph, renames: &mut IdRenames) {
        graph.update_node_text(&renames.resolve(&self.id), self.old_text.clone());
    }

    fn label(&self) -> &str {
        "Edit text"
    }
}

/// Moves a node under an explicit [`MovePolicy`].
///
/// Every position the move changes is recorded before it runs, and undo puts
/// those exact positions back, so a cascading move is reverted without
/// floating-point drift in the subtree.
#[derive(Debug, Clone)]
pub struct MoveNodeCommand {
    id: NodeId,
    target: Point,
    policy: MovePolicy,
    previous: Vec<(NodeId, Point)>,
}

impl MoveNodeCommand {
    pub fn new(graph: &NodeGraph, id: NodeId, x: f64, y: f64, policy: MovePolicy) -> Self {
        let previous = graph
            .get_node(&id)
            .map(|n| vec![(id.clone(), n.position())])
            .unwrap_or_default();
        Self {
            id,
            target: Point::new(x, y),
            policy,
            previous,
        }
    }

    pub fn policy(&self) -> MovePolicy {
        self.policy
    }

    /// Position of the moved node before the move.
    pub fn old_position(&self) -> Option<Point> {
        self.previous.first().map(|(_, p)| *p)
    }
}

impl Command for MoveNodeCommand {
    fn execute(&mut self, graph: &mut NodeGraph, renames: &mut IdRenames) {
        let id = renames.resolve(&self.id);
        let affected = match self.policy {
            MovePolicy::Cascading => graph.descendants(&id),
            MovePolicy::Absolute => vec![id.clone()],
        };
        self.previous = affected
            .into_iter()
            .filter_map(|member| graph.get_node(&member).map(|n| (member, n.position())))
            .collect();

        graph.move_node(&id, self.target.x, self.target.y, self.policy);
    }

    fn undo(&mut self, graph: &mut NodeGraph, renames: &mut IdRenames) {
        let previous: Vec<_> = self
            .previous
            .iter()
            .map(|(member, position)| (renames.resolve(member), *position))
            .collect();
        graph.restore_positions(&renames.resolve(&self.id), &previous);
    }

    fn label(&self) -> &str {
        "Move node"
    }
}

/// Collapses or expands a node; its own inverse.
#[derive(Debug, Clone)]
pub struct ToggleCollapseCommand {
    id: NodeId,
}

impl ToggleCollapseCommand {
    pub fn new(id: NodeId) -> Self {
        Self { id }
    }
}

impl Command for ToggleCollapseCommand {
    fn execute(&mut self, graph: &mut NodeGraph, renames: &mut IdRenames) {
        graph.toggle_collapse(&renames.resolve(&self.id));
    }

    fn undo(&mut self, graph: &mut NodeGraph, renames: &mut IdRenames) {
        graph.toggle_collapse(&renames.resolve(&self.id));
    }

    fn label(&self) -> &str {
        "Toggle collapse"
    }
}
