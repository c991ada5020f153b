use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Column names shared by the normalizer, the encoder and the schema
pub mod columns {
    pub const PRICE: &str = "price";
    pub const AREA: &str = "area";
    pub const BEDROOMS: &str = "bedrooms";
    pub const BATHROOMS: &str = "bathrooms";
    pub const FEATURES_COUNT: &str = "features_count";
    pub const PROPERTY_TYPE: &str = "property_type";
    pub const LOCATION: &str = "location";
    pub const GOVERNATE: &str = "governate";
    pub const CITY: &str = "city";

    /// Columns [`super::NormalizedRecord::numeric`] can resolve
    pub const NUMERIC: [&str; 5] = [PRICE, AREA, BEDROOMS, BATHROOMS, FEATURES_COUNT];

    /// Columns [`super::NormalizedRecord::categorical`] can resolve
    pub const CATEGORICAL: [&str; 4] = [PROPERTY_TYPE, LOCATION, GOVERNATE, CITY];
}

/// Property identifier as it arrived on the wire
///
/// Strings and integers are kept apart: `"42"` and `42` are different
/// properties, and each serializes back in the shape it came in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyId {
    String(String),
    Integer(i64),
}

impl PropertyId {
    /// Empty strings and zero do not reference a property from history
    pub fn is_blank(&self) -> bool {
        match self {
            PropertyId::String(s) => s.is_empty(),
            PropertyId::Integer(i) => *i == 0,
        }
    }
}

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyId::String(s) => write!(f, "{}", s),
            PropertyId::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for PropertyId {
    fn from(s: &str) -> Self {
        PropertyId::String(s.to_string())
    }
}

impl From<String> for PropertyId {
    fn from(s: String) -> Self {
        PropertyId::String(s)
    }
}

impl From<i64> for PropertyId {
    fn from(i: i64) -> Self {
        PropertyId::Integer(i)
    }
}

/// A raw property record as supplied by the caller
///
/// Every field except `id` is optional and loosely typed: numbers may
/// arrive as strings, `features` as a JSON-encoded string or an inline
/// array. The normalizer resolves all of it into a [`NormalizedRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: PropertyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governate: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<Value>,
}

impl PropertyRecord {
    /// A record with only an identifier; every other field is missing
    pub fn new(id: impl Into<PropertyId>) -> Self {
        Self {
            id: id.into(),
            property_type: None,
            price: None,
            area: None,
            bedrooms: None,
            bathrooms: None,
            governate: None,
            city: None,
            features: None,
            created_at: None,
            is_featured: None,
        }
    }
}

/// A property with every field resolved to a canonical value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub id: PropertyId,
    pub property_type: String,
    pub price: f64,
    pub area: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub governate: String,
    pub city: String,
    /// Parsed feature list, empty when absent or malformed
    pub features: Vec<Value>,
    pub created_at: DateTime<Utc>,
    pub is_featured: bool,
    /// `governate + "_" + city`
    pub location: String,
    pub features_count: usize,
}

impl NormalizedRecord {
    /// Look up a numeric column by name
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            columns::PRICE => Some(self.price),
            columns::AREA => Some(self.area),
            columns::BEDROOMS => Some(f64::from(self.bedrooms)),
            columns::BATHROOMS => Some(f64::from(self.bathrooms)),
            columns::FEATURES_COUNT => Some(self.features_count as f64),
            _ => None,
        }
    }

    /// Look up a categorical column by name
    pub fn categorical(&self, column: &str) -> Option<&str> {
        match column {
            columns::PROPERTY_TYPE => Some(&self.property_type),
            columns::LOCATION => Some(&self.location),
            columns::GOVERNATE => Some(&self.governate),
            columns::CITY => Some(&self.city),
            _ => None,
        }
    }
}

impl From<&NormalizedRecord> for PropertyRecord {
    fn from(record: &NormalizedRecord) -> Self {
        Self {
            id: record.id.clone(),
            property_type: Some(Value::from(record.property_type.clone())),
            price: Some(Value::from(record.price)),
            area: Some(Value::from(record.area)),
            bedrooms: Some(Value::from(record.bedrooms)),
            bathrooms: Some(Value::from(record.bathrooms)),
            governate: Some(Value::from(record.governate.clone())),
            city: Some(Value::from(record.city.clone())),
            features: Some(Value::Array(record.features.clone())),
            created_at: Some(Value::from(record.created_at.to_rfc3339())),
            is_featured: Some(Value::Bool(record.is_featured)),
        }
    }
}

/// One entry of a user's viewing history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(default, deserialize_with = "lenient_id")]
    pub property_id: Option<PropertyId>,
}

/// Identifiers that are neither strings nor integers count as absent
pub fn lenient_id<'de, D>(deserializer: D) -> Result<Option<PropertyId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

impl HistoryItem {
    pub fn new(id: impl Into<PropertyId>) -> Self {
        Self {
            property_id: Some(id.into()),
        }
    }

    /// The viewed property, if the entry carries a usable identifier
    pub fn target(&self) -> Option<&PropertyId> {
        self.property_id.as_ref().filter(|id| !id.is_blank())
    }
}
