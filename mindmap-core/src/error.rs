//! Error Types
//!
//! Most graph operations report "not found" and "not allowed" through
//! sentinel returns (`Option` / `bool`) so interaction code can ignore them.
//! The errors here are the ones a caller must handle: a document that fails
//! validation on import, and a configuration that cannot be used.

use thiserror::Error;

use crate::graph::NodeId;

/// Failure while importing a serialized mind map.
///
/// Import is atomic: when any of these is returned the graph that was being
/// imported into is left exactly as it was.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("node id `{0}` appears more than once")]
    DuplicateId(NodeId),

    #[error("root node `{0}` is not present in the node list")]
    MissingRoot(NodeId),

    #[error("root node `{root}` has parent `{parent}`")]
    RootHasParent { root: NodeId, parent: NodeId },

    #[error("node `{0}` has no parent but is not the root")]
    DetachedNode(NodeId),

    #[error("node `{node}` references missing parent `{parent}`")]
    DanglingParent { node: NodeId, parent: NodeId },

    #[error("node `{node}` lists missing child `{child}`")]
    DanglingChild { node: NodeId, child: NodeId },

    #[error("link mismatch between parent `{parent}` and child `{child}`")]
    LinkMismatch { parent: NodeId, child: NodeId },

    #[error("cycle detected in node hierarchy at `{0}`")]
    Cycle(NodeId),
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Failure while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// A layout mode name that is not one of the five known modes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown layout mode `{0}` (expected radial, tree, org, fishbone or timeline)")]
pub struct ParseLayoutModeError(pub String);
