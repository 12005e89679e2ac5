//! Enhancer Configuration

use serde::{Deserialize, Serialize};

/// Hidden slot name used as the enhancement marker
pub const MARKER_KEY: &str = "__fosEnhanced";

/// Enhancer configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Skip writes whose value already matches the DOM
    pub fine_grained: bool,

    /// Hand selector-keyed updates to an accessor's own update
    pub selector_delegation: bool,

    /// Maximum memoised lookup results
    pub max_cached_queries: usize,

    /// Log an informational line when updating an empty collection
    pub log_empty_collections: bool,

    /// Hidden slot name for the enhancement marker
    pub marker_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fine_grained: false,
            selector_delegation: true,
            max_cached_queries: 128,
            log_empty_collections: true,
            marker_key: MARKER_KEY.to_string(),
        }
    }
}

impl Config {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
