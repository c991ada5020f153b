use propsim_core::PropertyId;
use propsim_similarity::SimilarityStats;
use serde::Serialize;

/// Success payload, one shape per mode
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    Recommendations {
        success: bool,
        recommendations: Vec<PropertyId>,
    },
    SimilarProperties {
        success: bool,
        similar_properties: Vec<PropertyId>,
    },
    Diagnostics(Diagnostics),
}

impl Response {
    pub fn recommendations(recommendations: Vec<PropertyId>) -> Self {
        Response::Recommendations {
            success: true,
            recommendations,
        }
    }

    pub fn similar_properties(similar_properties: Vec<PropertyId>) -> Self {
        Response::SimilarProperties {
            success: true,
            similar_properties,
        }
    }
}

/// Output of the built-in self-test scenario
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub success: bool,
    pub message: String,
    pub similar_to_prop1: Vec<PropertyId>,
    pub user_recommendations: Vec<PropertyId>,
    pub stats: SimilarityStats,
}

/// Failure payload for boundary errors
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            traceback: None,
        }
    }

    #[must_use]
    pub fn with_traceback(mut self, traceback: impl Into<String>) -> Self {
        self.traceback = Some(traceback.into());
        self
    }
}
