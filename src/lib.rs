//! # propsim
//!
//! Content-based recommendations for real-estate listings.
//!
//! propsim ranks property listings by similarity to a reference listing or
//! to everything a user has viewed. Each request is self-contained: the
//! property batch is normalized, encoded into a batch-relative feature
//! matrix, and ranked by cosine similarity, then discarded.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! propsim '{"mode": "test"}'
//! propsim '{"mode": "similar_properties", "property_id": "p1", "all_properties": [...]}'
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use propsim::prelude::*;
//!
//! let properties: Vec<PropertyRecord> = serde_json::from_value(serde_json::json!([
//!     {"id": "p1", "property_type": "Apartment", "price": 100000, "governate": "Beirut", "city": "Hamra"},
//!     {"id": "p2", "property_type": "Apartment", "price": 105000, "governate": "Beirut", "city": "Hamra"},
//!     {"id": "p3", "property_type": "Villa", "price": 750000, "governate": "North", "city": "Batroun"},
//! ])).unwrap();
//!
//! let recommender = Recommender::new(RecommenderConfig::default());
//! let similar = recommender
//!     .similar_properties(Some(&PropertyId::from("p1")), &properties, 5)
//!     .into_inner();
//! assert_eq!(similar[0], PropertyId::from("p2"));
//! ```
//!
//! ## Crate Structure
//!
//! - `propsim-core` - records, vectors, configuration, fail-soft outcomes
//! - `propsim-schema` - normalizer, feature schema, standard scaler and one-hot encoder
//! - `propsim-similarity` - cosine ranking, history recommendations, backfill, explain
//! - `propsim-api` - JSON request dispatch and response envelopes

// Re-export core types
pub use propsim_core::{
    EmptyReason, Error, HistoryItem, NormalizedRecord, Outcome, PropertyId, PropertyRecord,
    RecommenderConfig, Result, Vector,
};

// Re-export pipeline stages
pub use propsim_schema::{
    Encoded, FeatureEncoder, FeatureMatrix, FeatureSchema, FieldConfig, FittedEncoder, Normalized,
    Normalizer,
};
pub use propsim_similarity::{
    ExplainedResult, PreparedBatch, Recommender, SimilarityRanker, SimilarityStats,
};

// Re-export API
pub use propsim_api::{Handler, Request, Response};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        EmptyReason, Encoded, Error, FeatureEncoder, FeatureMatrix, FeatureSchema, Handler,
        HistoryItem, NormalizedRecord, Normalizer, Outcome, PropertyId, PropertyRecord,
        Recommender, RecommenderConfig, Request, Response, Result, SimilarityRanker,
    };
}
