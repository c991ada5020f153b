//! Property normalizer
//!
//! Resolves raw [`PropertyRecord`]s into fully populated
//! [`NormalizedRecord`]s. Numbers are coerced leniently, missing prices and
//! areas take the batch median, counts are truncated to integers, and the
//! derived `location` and `features_count` columns are filled in.
//!
//! Normalization never fails. A bad field only affects its own record;
//! when the strict pass rejects the whole batch the degraded pass runs
//! instead and the result is flagged.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use propsim_core::{Error, NormalizedRecord, PropertyRecord, RecommenderConfig, Result};
use serde_json::Value;
use tracing::{debug, warn};

const UNKNOWN: &str = "Unknown";

/// Result of normalizing one batch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Normalized {
    pub records: Vec<NormalizedRecord>,
    /// Set when the strict pass failed and defaults were applied without coercion
    pub degraded: bool,
    /// Original length when the batch was cut down to the size cap
    pub truncated_from: Option<usize>,
}

impl Normalized {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    max_batch_size: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::from_config(&RecommenderConfig::default())
    }
}

impl Normalizer {
    pub fn new(max_batch_size: usize) -> Self {
        Self { max_batch_size }
    }

    pub fn from_config(config: &RecommenderConfig) -> Self {
        Self::new(config.max_batch_size)
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Normalize a batch, stamping missing `created_at` with the current time
    pub fn normalize(&self, records: &[PropertyRecord]) -> Normalized {
        self.normalize_at(records, Utc::now())
    }

    /// Normalize a batch using `now` as the processing time
    pub fn normalize_at(&self, records: &[PropertyRecord], now: DateTime<Utc>) -> Normalized {
        let (batch, truncated_from) = self.cap(records);

        match self.normalize_strict(batch, now) {
            Ok(records) => Normalized {
                records,
                degraded: false,
                truncated_from,
            },
            Err(err) => {
                warn!(error = %err, "normalization failed, falling back to degraded pass");
                Normalized {
                    records: normalize_degraded(batch, now),
                    degraded: true,
                    truncated_from,
                }
            }
        }
    }

    /// Re-run normalization over records that are already canonical
    ///
    /// Values already in canonical form come back unchanged.
    pub fn renormalize(&self, records: &[NormalizedRecord]) -> Normalized {
        let raw: Vec<PropertyRecord> = records.iter().map(PropertyRecord::from).collect();
        self.normalize(&raw)
    }

    fn cap<'a>(&self, records: &'a [PropertyRecord]) -> (&'a [PropertyRecord], Option<usize>) {
        if records.len() > self.max_batch_size {
            warn!(
                received = records.len(),
                kept = self.max_batch_size,
                "property batch exceeds size cap, truncating"
            );
            (&records[..self.max_batch_size], Some(records.len()))
        } else {
            (records, None)
        }
    }

    /// Full normalization with numeric coercion and median fill
    ///
    /// `records` must already be capped; medians are taken over exactly
    /// this slice.
    pub fn normalize_strict(
        &self,
        records: &[PropertyRecord],
        now: DateTime<Utc>,
    ) -> Result<Vec<NormalizedRecord>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let prices: Vec<Option<f64>> = records
            .iter()
            .map(|r| r.price.as_ref().and_then(coerce_number))
            .collect();
        let areas: Vec<Option<f64>> = records
            .iter()
            .map(|r| r.area.as_ref().and_then(coerce_number))
            .collect();

        let price_fill = column_fill("price", &prices)?;
        let area_fill = column_fill("area", &areas)?;
        debug!(rows = records.len(), price_fill, area_fill, "computed median fills");

        Ok(records
            .iter()
            .zip(prices.into_iter().zip(areas))
            .map(|(record, (price, area))| {
                let bedrooms = count_field(record, "bedrooms", record.bedrooms.as_ref());
                let bathrooms = count_field(record, "bathrooms", record.bathrooms.as_ref());
                assemble(
                    record,
                    price.unwrap_or(price_fill),
                    area.unwrap_or(area_fill),
                    bedrooms,
                    bathrooms,
                    now,
                )
            })
            .collect())
    }
}

/// Fallback that only guarantees every field is populated
///
/// Numbers are taken as-is when they are already JSON numbers and zero
/// otherwise; counts saturate into range.
fn normalize_degraded(records: &[PropertyRecord], now: DateTime<Utc>) -> Vec<NormalizedRecord> {
    records
        .iter()
        .map(|record| {
            let raw = |v: Option<&Value>| v.and_then(Value::as_f64).filter(|n| n.is_finite());
            assemble(
                record,
                raw(record.price.as_ref()).unwrap_or(0.0),
                raw(record.area.as_ref()).unwrap_or(0.0),
                raw(record.bedrooms.as_ref()).map(|n| n as u32).unwrap_or(0),
                raw(record.bathrooms.as_ref()).map(|n| n as u32).unwrap_or(0),
                now,
            )
        })
        .collect()
}

fn assemble(
    record: &PropertyRecord,
    price: f64,
    area: f64,
    bedrooms: u32,
    bathrooms: u32,
    now: DateTime<Utc>,
) -> NormalizedRecord {
    let text = |v: Option<&Value>| v.and_then(coerce_text).unwrap_or_else(|| UNKNOWN.to_string());

    let property_type = text(record.property_type.as_ref());
    let governate = text(record.governate.as_ref());
    let city = text(record.city.as_ref());
    let location = format!("{}_{}", governate, city);
    let features = record.features.as_ref().map(parse_features).unwrap_or_default();

    NormalizedRecord {
        id: record.id.clone(),
        property_type,
        price,
        area,
        bedrooms,
        bathrooms,
        governate,
        city,
        features_count: features.len(),
        features,
        created_at: record
            .created_at
            .as_ref()
            .and_then(parse_timestamp)
            .unwrap_or(now),
        is_featured: record.is_featured.as_ref().map(coerce_flag).unwrap_or(false),
        location,
    }
}

/// Median of the present values, 0 for an all-missing column
///
/// A fill that is not finite poisons every missing row of the column, so
/// the strict pass gives up on the batch.
fn column_fill(column: &str, values: &[Option<f64>]) -> Result<f64> {
    let fill = median(values.iter().flatten().copied()).unwrap_or(0.0);
    if !fill.is_finite() {
        return Err(Error::NonFinite(column.to_string()));
    }
    Ok(fill)
}

/// Coerce a count, truncating toward zero
///
/// Missing, non-numeric, negative and oversized counts all resolve to 0
/// for this record only.
fn count_field(record: &PropertyRecord, field: &'static str, value: Option<&Value>) -> u32 {
    let Some(n) = value.and_then(coerce_number) else {
        return 0;
    };
    let truncated = n.trunc();
    if truncated < 0.0 || truncated > f64::from(u32::MAX) {
        warn!(id = %record.id, field, value = n, "count out of range, treating as missing");
        return 0;
    }
    truncated as u32
}

/// Numbers and numeric strings; anything else, or a non-finite result, is missing
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Strings pass through, scalars are rendered, null and containers are missing
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    }
}

/// Parse the feature list from an inline array or a JSON-encoded string
///
/// Malformed JSON and anything that is not a list yield no features.
pub fn parse_features(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(s) if !s.trim().is_empty() => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(naive.and_utc());
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

/// Median of the given values; the mean of the middle pair for even counts
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut values: Vec<f64> = values.into_iter().collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
