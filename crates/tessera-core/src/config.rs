//! Mapper configuration.

use serde::{Deserialize, Serialize};

/// Default maximum nesting depth of a block tree.
pub const DEFAULT_MAX_BLOCK_DEPTH: usize = 32;

/// Default number of sort orders a stored collection may be missing.
pub const DEFAULT_MAX_COLLECTION_GAP: usize = 64;

/// Configuration shared by the content mapper and the block tree codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Maximum nesting depth accepted when rebuilding a block tree.
    pub max_block_depth: usize,

    /// Fail with `UnknownFieldType` instead of dropping fields whose stored
    /// type name cannot be resolved.
    pub strict_field_types: bool,

    /// Delete trailing collection rows when a collection shrinks.
    pub prune_collections: bool,

    /// Sort orders a stored collection may be missing before loading fails
    /// with `Deserialization`.
    pub max_collection_gap: usize,
}

impl MapperConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            max_block_depth: DEFAULT_MAX_BLOCK_DEPTH,
            strict_field_types: false,
            prune_collections: true,
            max_collection_gap: DEFAULT_MAX_COLLECTION_GAP,
        }
    }

    /// Set the maximum block tree depth.
    pub fn with_max_block_depth(mut self, depth: usize) -> Self {
        self.max_block_depth = depth.max(1);
        self
    }

    /// Treat unresolved field types as errors.
    pub fn with_strict_field_types(mut self) -> Self {
        self.strict_field_types = true;
        self
    }

    /// Set how many sort orders a stored collection may be missing.
    pub fn with_max_collection_gap(mut self, gap: usize) -> Self {
        self.max_collection_gap = gap;
        self
    }

    /// Keep trailing collection rows on save.
    pub fn without_pruning(mut self) -> Self {
        self.prune_collections = false;
        self
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self::new()
    }
}
