//! Feature schema definitions
//!
//! Declares which normalized columns feed the feature matrix, whether each
//! one is scaled as a number or expanded as a category, and the weight it
//! carries when weighting is switched on.

use propsim_core::columns;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Feature schema for encoding property batches
///
/// Field names that no normalized column answers to are kept in the
/// schema but dropped during column selection, so a schema can list
/// candidates that a given batch does not carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSchema {
    /// Schema version for future compatibility
    #[serde(default = "default_version")]
    pub version: u32,

    /// Field configurations keyed by column name
    pub fields: HashMap<String, FieldConfig>,
}

fn default_version() -> u32 {
    1
}

impl Default for FeatureSchema {
    /// The property schema: five scaled numeric columns, two one-hot
    /// categorical columns, and the listing weight table.
    fn default() -> Self {
        let fields = HashMap::from([
            (columns::PROPERTY_TYPE.to_string(), FieldConfig::categorical(5.0)),
            (columns::PRICE.to_string(), FieldConfig::numeric(3.0)),
            (columns::AREA.to_string(), FieldConfig::numeric(2.0)),
            (columns::BEDROOMS.to_string(), FieldConfig::numeric(1.5)),
            (columns::BATHROOMS.to_string(), FieldConfig::numeric(1.5)),
            (columns::LOCATION.to_string(), FieldConfig::categorical(4.0)),
            (columns::FEATURES_COUNT.to_string(), FieldConfig::numeric(2.0)),
        ]);
        Self::new(fields)
    }
}

impl FeatureSchema {
    /// Create a new feature schema with the given fields
    pub fn new(fields: HashMap<String, FieldConfig>) -> Self {
        Self { version: 1, fields }
    }

    /// Validate the schema and normalize weights to sum to 1.0
    ///
    /// Scaling every weight by the same factor leaves cosine scores
    /// unchanged, so normalization only makes weights comparable.
    pub fn validate_and_normalize(&mut self) -> Result<(), SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        for (name, config) in &self.fields {
            if config.weight < 0.0 || !config.weight.is_finite() {
                return Err(SchemaError::NegativeWeight(name.clone()));
            }
        }

        let weight_sum: f32 = self.fields.values().map(|f| f.weight).sum();

        if weight_sum <= 0.0 {
            return Err(SchemaError::ZeroTotalWeight);
        }

        if (weight_sum - 1.0).abs() > 0.001 {
            for config in self.fields.values_mut() {
                config.weight /= weight_sum;
            }
        }

        Ok(())
    }

    /// Numeric fields a normalized record can supply, sorted by name
    pub fn numeric_fields(&self) -> Vec<&str> {
        self.selected(FieldType::Numeric, &columns::NUMERIC)
    }

    /// Categorical fields a normalized record can supply, sorted by name
    pub fn categorical_fields(&self) -> Vec<&str> {
        self.selected(FieldType::Categorical, &columns::CATEGORICAL)
    }

    fn selected(&self, field_type: FieldType, known: &[&str]) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .fields
            .iter()
            .filter(|(name, config)| {
                config.field_type == field_type && known.contains(&name.as_str())
            })
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Weight of a field, 1.0 when the field is not in the schema
    pub fn weight(&self, name: &str) -> f32 {
        self.fields.get(name).map(|f| f.weight).unwrap_or(1.0)
    }
}

/// Configuration for a single column in the feature schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldConfig {
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Relative importance of this column
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

impl FieldConfig {
    /// A column standardized with batch mean and standard deviation
    pub fn numeric(weight: f32) -> Self {
        Self {
            field_type: FieldType::Numeric,
            weight,
        }
    }

    /// A column expanded into one indicator per observed value
    pub fn categorical(weight: f32) -> Self {
        Self {
            field_type: FieldType::Categorical,
            weight,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Numeric,
    Categorical,
}

/// Errors that can occur during schema validation
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema cannot be empty")]
    EmptySchema,

    #[error("Field '{0}' has a negative or non-finite weight")]
    NegativeWeight(String),

    #[error("Total weight cannot be zero")]
    ZeroTotalWeight,
}

impl From<SchemaError> for propsim_core::Error {
    fn from(err: SchemaError) -> Self {
        propsim_core::Error::InvalidConfig(err.to_string())
    }
}
