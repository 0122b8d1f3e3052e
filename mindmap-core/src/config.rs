//! Configuration
//!
//! Tunables for the three components. Every struct deserializes with
//! `#[serde(default)]`, so a config document only needs the fields it wants
//! to override:
//!
//! ```rust,ignore
//! let config = CoreConfig::from_json_str(r#"{ "layout": { "levelDistance": 150 } }"#)?;
//! let engine = LayoutEngine::new(config.layout);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Width of a newly created node, and of imported nodes that omit one.
pub const DEFAULT_NODE_WIDTH: f64 = 100.0;

/// Height of a newly created node, and of imported nodes that omit one.
pub const DEFAULT_NODE_HEIGHT: f64 = 36.0;

/// Size of the root node a fresh graph starts with.
pub const ROOT_NODE_WIDTH: f64 = 120.0;
pub const ROOT_NODE_HEIGHT: f64 = 40.0;

/// Radial/vertical separation between depth levels.
pub const LEVEL_DISTANCE: f64 = 200.0;

/// Minimum horizontal clearance between sibling subtrees.
pub const NODE_SPACING: f64 = 50.0;

/// Half-width of the window the tree layout bisects.
pub const TREE_HALF_WIDTH: f64 = 500.0;

/// Outward step per depth along a fishbone branch, as a fraction of the level distance.
pub const FISHBONE_BRANCH_FACTOR: f64 = 0.7;

/// Maximum number of commands kept in the undo history.
pub const MAX_HISTORY_SIZE: usize = 100;

/// What happens to the selection when the selected node is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionFallback {
    /// Nothing is selected afterwards.
    #[default]
    Clear,

    /// The deleted node's parent becomes selected.
    Parent,
}

/// Spacing parameters for the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub level_distance: f64,
    pub node_spacing: f64,
    pub tree_half_width: f64,
    pub fishbone_branch_factor: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            level_distance: LEVEL_DISTANCE,
            node_spacing: NODE_SPACING,
            tree_half_width: TREE_HALF_WIDTH,
            fishbone_branch_factor: FISHBONE_BRANCH_FACTOR,
        }
    }
}

impl LayoutConfig {
    /// Check that every distance is finite and positive.
    pub fn validate(&self) -> ConfigResult<()> {
        positive("levelDistance", self.level_distance)?;
        positive("nodeSpacing", self.node_spacing)?;
        positive("treeHalfWidth", self.tree_half_width)?;
        positive("fishboneBranchFactor", self.fishbone_branch_factor)?;
        Ok(())
    }
}

/// Node defaults and policies for the node graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
    pub selection_on_delete: SelectionFallback,
    pub default_node_width: f64,
    pub default_node_height: f64,
    pub root_width: f64,
    pub root_height: f64,
    pub root_text: String,
    pub title: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            selection_on_delete: SelectionFallback::Clear,
            default_node_width: DEFAULT_NODE_WIDTH,
            default_node_height: DEFAULT_NODE_HEIGHT,
            root_width: ROOT_NODE_WIDTH,
            root_height: ROOT_NODE_HEIGHT,
            root_text: "Central Topic".to_string(),
            title: "New Mind Map".to_string(),
        }
    }
}

impl GraphConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        positive("defaultNodeWidth", self.default_node_width)?;
        positive("defaultNodeHeight", self.default_node_height)?;
        positive("rootWidth", self.root_width)?;
        positive("rootHeight", self.root_height)?;
        Ok(())
    }
}

/// Bounds for the command history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    pub max_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: MAX_HISTORY_SIZE,
        }
    }
}

impl HistoryConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_size == 0 {
            return Err(ConfigError::Invalid {
                field: "maxSize",
                reason: "history must hold at least one command".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration for the whole core, grouped by component.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub graph: GraphConfig,
    pub layout: LayoutConfig,
    pub history: HistoryConfig,
}

impl CoreConfig {
    /// Parse a JSON config document and validate every section.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.graph.validate()?;
        self.layout.validate()?;
        self.history.validate()
    }
}

fn positive(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a finite positive number, got {value}"),
        })
    }
}
