//! Column transforms fitted on one batch
//!
//! [`StandardScaler`] centers a numeric column on its batch mean and
//! divides by the batch standard deviation. [`OneHotEncoder`] expands a
//! categorical column into one indicator per value seen while fitting;
//! values first seen afterwards leave every indicator at zero.

use ahash::AHashMap;
use propsim_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Standardizes one column: z = (x - mean) / std
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    column: String,
    mean: f64,
    /// Population standard deviation, replaced by 1.0 for constant columns
    scale: f64,
}

impl StandardScaler {
    /// Fit mean and population standard deviation over `values`
    pub fn fit(column: &str, values: &[f64]) -> Result<Self> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::NonFinite(column.to_string()));
        }

        let n = values.len().max(1) as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        if !mean.is_finite() || !variance.is_finite() {
            return Err(Error::NonFinite(column.to_string()));
        }

        let std = variance.sqrt();
        let scale = if std > f64::EPSILON * mean.abs().max(1.0) {
            std
        } else {
            1.0
        };

        Ok(Self {
            column: column.to_string(),
            mean,
            scale,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn transform(&self, value: f64) -> f32 {
        ((value - self.mean) / self.scale) as f32
    }
}

/// One indicator column per category observed during fit
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    column: String,
    categories: Vec<String>,
    index: AHashMap<String, usize>,
}

impl OneHotEncoder {
    /// Collect the distinct values of a column, in sorted order
    pub fn fit<'a>(column: &str, values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut categories: Vec<String> = values.into_iter().map(str::to_string).collect();
        categories.sort_unstable();
        categories.dedup();

        let index = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        Self {
            column: column.to_string(),
            categories,
            index,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of indicator columns
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Position of a category, `None` for values unseen during fit
    pub fn position(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    /// Write the indicators for `value` into `out`, which must be `width()` long
    ///
    /// Unseen values leave `out` untouched (all zero).
    pub fn transform_into(&self, value: &str, weight: f32, out: &mut [f32]) {
        if let Some(pos) = self.position(value) {
            out[pos] = weight;
        }
    }
}
