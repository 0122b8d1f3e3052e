//! Mind Map Core
//!
//! This crate provides the editing core of a mind map application.
//! It implements:
//!
//! - A rooted node tree with per-node metadata and single selection
//! - Five layout algorithms (radial, tree, org chart, fishbone, timeline)
//! - A bounded undo/redo history built on invertible commands
//! - A JSON document format with validating import
//!
//! Rendering, input handling and persistence are left to the embedding
//! application, which observes the graph through subscriptions.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Node tree, document properties and change notification
//! - `layout`: Layout modes and the engine that applies them
//! - `history`: Commands and the undo/redo manager
//! - `config`: Tunable constants, loadable from JSON
//! - `error`: Import and configuration errors
//!
//! # Example
//!
//! ```rust,ignore
//! use mindmap_core::{CommandManager, CreateNodeCommand, LayoutEngine, LayoutMode, NodeGraph};
//!
//! let mut graph = NodeGraph::new();
//! let mut history = CommandManager::new();
//!
//! // Add a child under the root through the history
//! let root = graph.root_id().clone();
//! history.execute(&mut graph, CreateNodeCommand::new(root, "Idea", 0.0, 0.0));
//!
//! // Arrange everything as an org chart
//! LayoutEngine::default().layout(&mut graph, LayoutMode::Org);
//!
//! // Take it back
//! history.undo(&mut graph);
//! assert_eq!(graph.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod history;
pub mod layout;

pub use config::{CoreConfig, GraphConfig, HistoryConfig, LayoutConfig, SelectionFallback};
pub use error::{ConfigError, ImportError};
pub use graph::{GraphEvent, MovePolicy, Navigation, Node, NodeGraph, NodeId, Point};
pub use history::{
    Command, CommandManager, CreateNodeCommand, DeleteNodeCommand, EditTextCommand, IdRenames,
    MoveNodeCommand, ToggleCollapseCommand,
};
pub use layout::{LayoutEngine, LayoutMode, Placement};
