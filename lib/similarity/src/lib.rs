//! # propsim Similarity
//!
//! Cosine similarity ranking over encoded property batches.
//!
//! ## Features
//!
//! - **Find similar**: rank every property in a batch against one reference property
//! - **Recommend for user**: merge the neighbors of every viewed property by frequency
//! - **Backfill**: pad short lists with featured, then newest, listings
//! - **Explainability**: per-field breakdown of each cosine score
//!
//! ## Example
//!
//! ```rust
//! use propsim_similarity::Recommender;
//! use propsim_core::{HistoryItem, PropertyRecord, RecommenderConfig};
//! use serde_json::json;
//!
//! let properties: Vec<PropertyRecord> = serde_json::from_value(json!([
//!     {"id": "a", "property_type": "Apartment", "price": 100000, "governate": "Beirut", "city": "Hamra"},
//!     {"id": "b", "property_type": "Apartment", "price": 110000, "governate": "Beirut", "city": "Hamra"},
//!     {"id": "c", "property_type": "Villa", "price": 800000, "governate": "North", "city": "Batroun"},
//! ])).unwrap();
//!
//! let recommender = Recommender::new(RecommenderConfig::default());
//! let picks = recommender
//!     .recommend_for_user(&[HistoryItem::new("a")], &properties, 2)
//!     .into_inner();
//! assert_eq!(picks.len(), 2);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Normalizer  │────>│   Encoder   │────>│   Matrix    │
//! │ (raw→rows)  │     │ (rows→v)    │     │ (per batch) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                      ┌─────────────┐           │
//!                      │   Ranker    │<──────────┘
//!                      │ (cosine)    │
//!                      └─────────────┘
//!                             │
//!                      ┌─────────────┐
//!                      │ Recommender │
//!                      │ (+backfill) │
//!                      └─────────────┘
//! ```

pub mod explain;
pub mod rank;
pub mod recommend;

pub use explain::{ExplainedResult, SimilarityStats};
pub use rank::{ScoredCandidate, SimilarityRanker};
pub use recommend::{backfill, PreparedBatch, Recommender};
