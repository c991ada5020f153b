use crate::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;
pub const DEFAULT_NEIGHBORS_PER_ITEM: usize = 5;
pub const DEFAULT_LIMIT: usize = 5;

/// Pipeline configuration, passed into every entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommenderConfig {
    /// Batches longer than this are truncated before normalization
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Similar properties gathered per history item
    #[serde(default = "default_neighbors_per_item")]
    pub neighbors_per_item: usize,
    /// Result count when a request omits `limit`
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Scale encoded columns by the schema's field weights
    #[serde(default)]
    pub apply_weights: bool,
}

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

fn default_neighbors_per_item() -> usize {
    DEFAULT_NEIGHBORS_PER_ITEM
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            neighbors_per_item: DEFAULT_NEIGHBORS_PER_ITEM,
            default_limit: DEFAULT_LIMIT,
            apply_weights: false,
        }
    }
}

impl RecommenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_batch_size == 0 {
            return Err(Error::InvalidConfig(
                "max_batch_size must be greater than zero".to_string(),
            ));
        }
        if self.neighbors_per_item == 0 {
            return Err(Error::InvalidConfig(
                "neighbors_per_item must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    #[must_use]
    pub fn with_neighbors_per_item(mut self, neighbors_per_item: usize) -> Self {
        self.neighbors_per_item = neighbors_per_item;
        self
    }

    #[must_use]
    pub fn with_weights(mut self, apply_weights: bool) -> Self {
        self.apply_weights = apply_weights;
        self
    }
}
