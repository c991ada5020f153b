//! # propsim Core
//!
//! Core types shared by every stage of the propsim recommendation pipeline.
//!
//! - [`PropertyRecord`] - a raw, loosely typed property listing
//! - [`NormalizedRecord`] - the same listing with every field resolved
//! - [`Vector`] - one encoded row of the feature matrix
//! - [`Outcome`] - fail-soft result used by pipeline operations
//! - [`RecommenderConfig`] - batch cap, fan-out and weighting switches
//!
//! ## Example
//!
//! ```rust
//! use propsim_core::{PropertyRecord, Vector};
//!
//! let record: PropertyRecord = serde_json::from_value(serde_json::json!({
//!     "id": "prop1",
//!     "price": "100000",
//!     "governate": "Beirut"
//! })).unwrap();
//! assert!(record.area.is_none());
//!
//! let a = Vector::new(vec![1.0, 0.0]);
//! let b = Vector::new(vec![1.0, 1.0]);
//! assert!(a.cosine_similarity(&b) > 0.7);
//! ```

pub mod config;
pub mod error;
pub mod outcome;
pub mod property;
pub mod vector;

pub use config::RecommenderConfig;
pub use error::{Error, Result};
pub use outcome::{EmptyReason, Outcome};
pub use property::{columns, HistoryItem, NormalizedRecord, PropertyId, PropertyRecord};
pub use vector::Vector;
