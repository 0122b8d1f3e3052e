//! Graph Nodes
//!
//! This module defines the node record stored in the mind map arena.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH};

/// Unique identifier for a node in the mind map.
///
/// Ids are opaque strings. Ids minted by [`NodeGraph`](super::NodeGraph) are
/// never reused for the lifetime of that graph; ids coming from an imported
/// document are kept as they are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix of ids shaped like `node_<n>`, used to resume id minting after an import.
    pub(crate) fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix("node_")?.parse().ok()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A 2-D point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

fn default_width() -> f64 {
    DEFAULT_NODE_WIDTH
}

fn default_height() -> f64 {
    DEFAULT_NODE_HEIGHT
}

/// A vertex of the mind map tree.
///
/// Structural fields (`parent`, `children`) and positions are only mutated
/// through [`NodeGraph`](super::NodeGraph) and the layout engine, which keep
/// the parent/child links consistent in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    id: NodeId,
    text: String,
    x: f64,
    y: f64,

    /// Size reported by the renderer after measuring the text.
    #[serde(default = "default_width")]
    width: f64,
    #[serde(default = "default_height")]
    height: f64,

    parent: Option<NodeId>,

    /// Ordered children; the order is the sibling order used by every layout.
    #[serde(default)]
    children: Vec<NodeId>,

    #[serde(default)]
    collapsed: bool,
    #[serde(default)]
    selected: bool,

    #[serde(default)]
    priority: u8,
    #[serde(default)]
    progress: u8,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    tags: Vec<String>,

    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    modified_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<DateTime<Utc>>,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        text: impl Into<String>,
        position: Point,
        size: (f64, f64),
        parent: Option<NodeId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            text: text.into(),
            x: position.x,
            y: position.y,
            width: size.0,
            height: size.1,
            parent,
            children: Vec::new(),
            collapsed: false,
            selected: false,
            priority: 0,
            progress: 0,
            notes: String::new(),
            tags: Vec::new(),
            created_at: now,
            modified_at: now,
            due_date: None,
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Get the node's label text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Horizontal coordinate of the node's center.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Vertical coordinate of the node's center.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Get the node's center as a point.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Get the node's width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Get the node's height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Get the parent ID, `None` for the root.
    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    /// Get the child IDs in sibling order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Check if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Check if the node's children are hidden.
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Check if this is the selected node.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Priority in `0..=5`, 0 meaning unset.
    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Completion percentage in `0..=100`.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Get the node's free-form notes.
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Get the node's tags.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// When the node was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the node's attributes last changed.
    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Get the node's due date, if any.
    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// The instant a timeline orders this node by: due date, else creation time.
    pub fn timeline_key(&self) -> DateTime<Utc> {
        self.due_date.unwrap_or(self.created_at)
    }

    /// Axis-aligned hit test against a box of the given size centered on the node.
    pub fn contains(&self, point: Point, width: f64, height: f64) -> bool {
        point.x >= self.x - width / 2.0
            && point.x <= self.x + width / 2.0
            && point.y >= self.y - height / 2.0
            && point.y <= self.y + height / 2.0
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.touch();
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    pub(crate) fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    pub(crate) fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: &NodeId) {
        self.children.retain(|c| c != child);
    }

    /// Move an existing child to `index`, clamped to the end of the list.
    pub(crate) fn reposition_child(&mut self, child: &NodeId, index: usize) -> bool {
        let Some(current) = self.children.iter().position(|c| c == child) else {
            return false;
        };
        let id = self.children.remove(current);
        let index = index.min(self.children.len());
        self.children.insert(index, id);
        true
    }

    pub(crate) fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn set_priority(&mut self, priority: u8) {
        self.priority = priority.min(5);
        self.touch();
    }

    pub(crate) fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
        self.touch();
    }

    pub(crate) fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
        self.touch();
    }

    /// Add a tag; returns false if it was already present.
    pub(crate) fn add_tag(&mut self, tag: &str) -> bool {
        if self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        self.touch();
        true
    }

    pub(crate) fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        let removed = self.tags.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub(crate) fn set_due_date(&mut self, due: Option<DateTime<Utc>>) {
        self.due_date = due;
        self.touch();
    }

    /// Take text, position, size, collapse state and metadata from `record`.
    pub(crate) fn copy_attributes_from(&mut self, record: &Node) {
        self.text = record.text.clone();
        self.x = record.x;
        self.y = record.y;
        self.width = record.width;
        self.height = record.height;
        self.collapsed = record.collapsed;
        self.priority = record.priority;
        self.progress = record.progress;
        self.notes = record.notes.clone();
        self.tags = record.tags.clone();
        self.created_at = record.created_at;
        self.modified_at = record.modified_at;
        self.due_date = record.due_date;
    }

    #[cfg(test)]
    pub(crate) fn set_created_at(&mut self, created_at: DateTime<Utc>) {
        self.created_at = created_at;
    }

    fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}
