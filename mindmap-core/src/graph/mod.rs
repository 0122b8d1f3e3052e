//! Mind Map Graph
//!
//! This module holds the document model: the node tree, its document-level
//! properties, change notification and the JSON document format.
//!
//! # Overview
//!
//! The graph is a rooted tree stored in a flat arena:
//!
//! - Nodes are owned by the [`NodeGraph`] and addressed by [`NodeId`]
//! - Each node keeps its parent id and an ordered list of child ids
//! - The root is created with the graph and can never be removed
//!
//! All mutation goes through `NodeGraph` methods, which keep both ends of
//! every parent/child link in step and then notify subscribers.
//!
//! # Design Decisions
//!
//! 1. The arena is an insertion-ordered map, so serialization, hit testing
//!    and iteration are deterministic.
//!
//! 2. Ids are minted from a per-graph counter and never reused, even after
//!    deletion.
//!
//! 3. Operations that cannot apply return a sentinel (`None`/`false`).
//!    Only importing a document reports a typed error.

mod document;
mod node;
mod node_graph;
mod observer;

pub use document::Document;
pub use node::{Node, NodeId, Point};
pub use node_graph::{MovePolicy, Navigation, NodeGraph};
pub use observer::{GraphEvent, SubscriberId};
