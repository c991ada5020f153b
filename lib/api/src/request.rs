use propsim_core::{Error, HistoryItem, PropertyId, PropertyRecord, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

pub const MODE_USER_RECOMMENDATIONS: &str = "user_recommendations";
pub const MODE_SIMILAR_PROPERTIES: &str = "similar_properties";
pub const MODE_TEST: &str = "test";

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    UserRecommendations(UserRecommendationsRequest),
    SimilarProperties(SimilarPropertiesRequest),
    Test,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRecommendationsRequest {
    #[serde(default, deserialize_with = "lenient_list")]
    user_history: Option<Vec<HistoryItem>>,
    #[serde(default, deserialize_with = "lenient_list")]
    all_properties: Option<Vec<PropertyRecord>>,
    #[serde(default, deserialize_with = "lenient_limit")]
    pub limit: Option<i64>,
}

impl UserRecommendationsRequest {
    pub fn user_history(&self) -> &[HistoryItem] {
        self.user_history.as_deref().unwrap_or_default()
    }

    pub fn all_properties(&self) -> &[PropertyRecord] {
        self.all_properties.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimilarPropertiesRequest {
    #[serde(default, deserialize_with = "propsim_core::property::lenient_id")]
    pub property_id: Option<PropertyId>,
    #[serde(default, deserialize_with = "lenient_list")]
    all_properties: Option<Vec<PropertyRecord>>,
    #[serde(default, deserialize_with = "lenient_limit")]
    pub limit: Option<i64>,
}

impl SimilarPropertiesRequest {
    pub fn all_properties(&self) -> &[PropertyRecord] {
        self.all_properties.as_deref().unwrap_or_default()
    }
}

impl Request {
    /// Parse the raw invocation argument
    pub fn parse(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|err| Error::InvalidInput(format!("input is not valid JSON: {}", err)))?;
        Self::from_value(value)
    }

    /// Dispatch on `mode`, defaulting to user recommendations
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidInput("input must be a JSON object".to_string()));
        }

        let mode = match value.get("mode") {
            None | Some(Value::Null) => MODE_USER_RECOMMENDATIONS.to_string(),
            Some(Value::String(mode)) => mode.clone(),
            Some(other) => return Err(Error::UnknownMode(other.to_string())),
        };

        match mode.as_str() {
            MODE_USER_RECOMMENDATIONS => Ok(Request::UserRecommendations(
                serde_json::from_value(value)?,
            )),
            MODE_SIMILAR_PROPERTIES => Ok(Request::SimilarProperties(serde_json::from_value(
                value,
            )?)),
            MODE_TEST => Ok(Request::Test),
            _ => Err(Error::UnknownMode(mode)),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Request::UserRecommendations(_) => MODE_USER_RECOMMENDATIONS,
            Request::SimilarProperties(_) => MODE_SIMILAR_PROPERTIES,
            Request::Test => MODE_TEST,
        }
    }
}

/// Deserialize a list entry by entry, dropping entries that do not parse
///
/// A value that is not a list at all counts as absent.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!(found = %other, "expected a list, ignoring field");
            return Ok(None);
        }
        None => return Ok(None),
    };

    let parsed = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(index, error = %err, "skipping malformed list entry");
                None
            }
        })
        .collect();
    Ok(Some(parsed))
}

/// Integral limits, or numbers truncated toward zero; anything else is unset
fn lenient_limit<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let limit = Option::<Value>::deserialize(deserializer)?.and_then(|value| {
        value
            .as_i64()
            .or_else(|| value.as_f64().filter(|n| n.is_finite()).map(|n| n.trunc() as i64))
    });
    Ok(limit)
}

/// Resolve a requested limit; negative limits mean zero
pub fn resolve_limit(limit: Option<i64>, default_limit: usize) -> usize {
    match limit {
        Some(limit) => usize::try_from(limit.max(0)).unwrap_or(usize::MAX),
        None => default_limit,
    }
}
