//! Feature encoder
//!
//! Turns a batch of normalized records into a dense [`FeatureMatrix`]:
//! every selected numeric column is standardized with batch statistics and
//! every selected categorical column is one-hot expanded over the values
//! the batch contains. The fitted transformation is returned alongside the
//! matrix as a [`FittedEncoder`] so further records can be encoded the
//! same way.

use crate::scaler::{OneHotEncoder, StandardScaler};
use crate::schema::FeatureSchema;
use propsim_core::{Error, NormalizedRecord, RecommenderConfig, Result, Vector};
use tracing::{debug, warn};

/// Encoded rows, in the same order as the records they came from
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureMatrix {
    rows: Vec<Vector>,
    columns: Vec<String>,
}

impl FeatureMatrix {
    pub fn new(rows: Vec<Vector>, columns: Vec<String>) -> Self {
        Self { rows, columns }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns
    pub fn dim(&self) -> usize {
        self.columns.len()
    }

    pub fn row(&self, index: usize) -> Option<&Vector> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[Vector] {
        &self.rows
    }

    /// Column labels: numeric names, then `column=value` indicators
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Column transforms fitted on one batch, with their weight factors
#[derive(Debug, Clone)]
pub struct FittedEncoder {
    numeric: Vec<(StandardScaler, f32)>,
    categorical: Vec<(OneHotEncoder, f32)>,
}

impl FittedEncoder {
    pub fn dim(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|(c, _)| c.width()).sum::<usize>()
    }

    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .numeric
            .iter()
            .map(|(s, _)| s.column().to_string())
            .collect();
        for (encoder, _) in &self.categorical {
            names.extend(
                encoder
                    .categories()
                    .iter()
                    .map(|c| format!("{}={}", encoder.column(), c)),
            );
        }
        names
    }

    pub fn scalers(&self) -> impl Iterator<Item = &StandardScaler> {
        self.numeric.iter().map(|(s, _)| s)
    }

    pub fn one_hot_encoders(&self) -> impl Iterator<Item = &OneHotEncoder> {
        self.categorical.iter().map(|(c, _)| c)
    }

    /// Encode one record with the fitted transforms
    ///
    /// Categories the batch never contained encode as all-zero indicators.
    pub fn transform(&self, record: &NormalizedRecord) -> Result<Vector> {
        let mut components = Vec::with_capacity(self.dim());

        for (scaler, weight) in &self.numeric {
            let value = record.numeric(scaler.column()).ok_or_else(|| {
                Error::InvalidInput(format!("record has no numeric column {}", scaler.column()))
            })?;
            components.push(scaler.transform(value) * weight);
        }

        for (encoder, weight) in &self.categorical {
            let value = record.categorical(encoder.column()).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "record has no categorical column {}",
                    encoder.column()
                ))
            })?;
            let start = components.len();
            components.resize(start + encoder.width(), 0.0);
            encoder.transform_into(value, *weight, &mut components[start..]);
        }

        Ok(Vector::new(components))
    }
}

/// Result of encoding a batch
#[derive(Debug, Clone, Default)]
pub enum Encoded {
    /// No encoding available: empty batch, no usable columns, or a failed fit
    #[default]
    Empty,
    Ready {
        matrix: FeatureMatrix,
        encoder: FittedEncoder,
    },
}

impl Encoded {
    pub fn is_empty(&self) -> bool {
        matches!(self, Encoded::Empty)
    }

    pub fn matrix(&self) -> Option<&FeatureMatrix> {
        match self {
            Encoded::Empty => None,
            Encoded::Ready { matrix, .. } => Some(matrix),
        }
    }

    pub fn encoder(&self) -> Option<&FittedEncoder> {
        match self {
            Encoded::Empty => None,
            Encoded::Ready { encoder, .. } => Some(encoder),
        }
    }
}

/// Builds batch-relative feature matrices from a [`FeatureSchema`]
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    schema: FeatureSchema,
    apply_weights: bool,
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new(FeatureSchema::default())
    }
}

impl FeatureEncoder {
    pub fn new(schema: FeatureSchema) -> Self {
        Self {
            schema,
            apply_weights: false,
        }
    }

    pub fn from_config(schema: FeatureSchema, config: &RecommenderConfig) -> Self {
        Self::new(schema).with_weights(config.apply_weights)
    }

    /// Scale each column by the square root of its field weight, so a
    /// field's share of the dot product grows linearly with its weight
    #[must_use]
    pub fn with_weights(mut self, apply_weights: bool) -> Self {
        self.apply_weights = apply_weights;
        self
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Encode a batch; any failure yields [`Encoded::Empty`]
    pub fn encode(&self, records: &[NormalizedRecord]) -> Encoded {
        match self.try_encode(records) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %err, rows = records.len(), "failed to build feature matrix");
                Encoded::Empty
            }
        }
    }

    /// Encode a batch, surfacing fit and transform errors
    pub fn try_encode(&self, records: &[NormalizedRecord]) -> Result<Encoded> {
        if records.is_empty() {
            return Ok(Encoded::Empty);
        }

        let numeric_fields = self.schema.numeric_fields();
        let categorical_fields = self.schema.categorical_fields();
        if numeric_fields.is_empty() && categorical_fields.is_empty() {
            debug!("no schema columns available for encoding");
            return Ok(Encoded::Empty);
        }

        let encoder = self.fit(records, &numeric_fields, &categorical_fields)?;
        let rows = records
            .iter()
            .map(|record| encoder.transform(record))
            .collect::<Result<Vec<_>>>()?;

        let matrix = FeatureMatrix::new(rows, encoder.column_names());
        debug!(rows = matrix.len(), columns = matrix.dim(), "built feature matrix");

        Ok(Encoded::Ready { matrix, encoder })
    }

    fn fit(
        &self,
        records: &[NormalizedRecord],
        numeric_fields: &[&str],
        categorical_fields: &[&str],
    ) -> Result<FittedEncoder> {
        let numeric = numeric_fields
            .iter()
            .map(|field| {
                let values: Vec<f64> = records.iter().filter_map(|r| r.numeric(field)).collect();
                Ok((StandardScaler::fit(field, &values)?, self.weight_factor(field)))
            })
            .collect::<Result<Vec<_>>>()?;

        let categorical = categorical_fields
            .iter()
            .map(|field| {
                let encoder = OneHotEncoder::fit(field, records.iter().filter_map(|r| r.categorical(field)));
                (encoder, self.weight_factor(field))
            })
            .collect();

        Ok(FittedEncoder {
            numeric,
            categorical,
        })
    }

    fn weight_factor(&self, field: &str) -> f32 {
        if self.apply_weights {
            self.schema.weight(field).max(0.0).sqrt()
        } else {
            1.0
        }
    }
}
