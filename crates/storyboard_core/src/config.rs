//! Engine configuration values.
//!
//! # Responsibility
//! - Hold the reserved canvas markers, layout constants and the format
//!   registry as one immutable value handed to services.
//! - Load partial overrides from JSON; absent fields keep their defaults.
//!
//! # Invariants
//! - No configuration is read from global mutable state.

use crate::format::FormatRegistry;
use serde::{Deserialize, Serialize};

/// Frame title that marks a story container.
pub const DEFAULT_CONTAINER_TITLE: &str = "Twine Story";
/// Metadata key under which role discriminants are stored.
pub const DEFAULT_METADATA_KEY: &str = "twine-data";

/// Fixed pixel constants used by the spatial layout and header rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal distance between node centers on one level.
    pub node_pitch: f64,
    /// Vertical distance between levels.
    pub row_height: f64,
    /// Margin added left/right of every node center for the bounding box.
    pub node_half_width: f64,
    /// Margin added above/below every node center for the bounding box.
    pub node_half_height: f64,
    pub min_width: f64,
    pub min_height: f64,
    /// Space reserved at the top of the container for title/format/IFID rows.
    pub header_height: f64,
    pub padding: f64,
    pub card_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_pitch: 260.0,
            row_height: 180.0,
            node_half_width: 110.0,
            node_half_height: 60.0,
            min_width: 800.0,
            min_height: 450.0,
            header_height: 120.0,
            padding: 10.0,
            card_width: 200.0,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub container_title: String,
    pub metadata_key: String,
    pub layout: LayoutConfig,
    pub formats: FormatRegistry,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            container_title: DEFAULT_CONTAINER_TITLE.to_string(),
            metadata_key: DEFAULT_METADATA_KEY.to_string(),
            layout: LayoutConfig::default(),
            formats: FormatRegistry::builtin(),
        }
    }
}

impl EngineConfig {
    /// Parses a JSON configuration document.
    pub fn from_json(source: &str) -> Result<Self, String> {
        serde_json::from_str(source).map_err(|err| format!("invalid engine config: {err}"))
    }
}
