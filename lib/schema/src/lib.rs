//! # propsim Schema
//!
//! Normalization and feature encoding for property batches.
//!
//! ## Overview
//!
//! Raw listings arrive with missing, mistyped, or malformed fields. This
//! crate turns a batch of them into a numeric matrix that the similarity
//! ranker can compare row by row:
//!
//! 1. [`Normalizer`] resolves each [`PropertyRecord`](propsim_core::PropertyRecord)
//!    into a fully populated [`NormalizedRecord`](propsim_core::NormalizedRecord)
//! 2. [`FeatureEncoder`] fits a [`StandardScaler`] per numeric column and a
//!    [`OneHotEncoder`] per categorical column on the batch
//! 3. The result is a [`FeatureMatrix`] plus the [`FittedEncoder`] that produced it
//!
//! Everything is batch-relative: scales and category vocabularies are
//! recomputed for each batch and never persisted.
//!
//! ## Example
//!
//! ```rust
//! use propsim_schema::{FeatureEncoder, FeatureSchema, Normalizer};
//! use propsim_core::PropertyRecord;
//! use serde_json::json;
//!
//! let raw: Vec<PropertyRecord> = vec![
//!     serde_json::from_value(json!({"id": "a", "price": 100, "property_type": "Apartment"})).unwrap(),
//!     serde_json::from_value(json!({"id": "b", "price": "250", "property_type": "Villa"})).unwrap(),
//! ];
//!
//! let normalized = Normalizer::default().normalize(&raw);
//! let encoded = FeatureEncoder::new(FeatureSchema::default()).encode(&normalized.records);
//! assert_eq!(encoded.matrix().unwrap().len(), 2);
//! ```

pub mod encoder;
pub mod normalize;
pub mod scaler;
pub mod schema;

pub use encoder::{Encoded, FeatureEncoder, FeatureMatrix, FittedEncoder};
pub use normalize::{Normalized, Normalizer};
pub use scaler::{OneHotEncoder, StandardScaler};
pub use schema::{FeatureSchema, FieldConfig, FieldType, SchemaError};
