//! # propsim API
//!
//! The JSON invocation contract: one request object in, one response
//! object out.
//!
//! | `mode` | fields | response |
//! |---|---|---|
//! | `user_recommendations` (default) | `user_history`, `all_properties`, `limit` | `{"success": true, "recommendations": [...]}` |
//! | `similar_properties` | `property_id`, `all_properties`, `limit` | `{"success": true, "similar_properties": [...]}` |
//! | `test` | - | self-test diagnostics |
//!
//! Malformed input and unknown modes are hard errors. Everything past
//! parsing fails soft: the pipeline answers with an empty list instead.

pub mod diagnostics;
pub mod request;
pub mod response;

pub use diagnostics::run_self_test;
pub use request::{resolve_limit, Request, SimilarPropertiesRequest, UserRecommendationsRequest};
pub use response::{Diagnostics, ErrorResponse, Response};

use propsim_core::{Outcome, RecommenderConfig, Result};
use propsim_schema::FeatureSchema;
use propsim_similarity::Recommender;
use tracing::{debug, info};

/// Dispatches parsed requests to the recommender
#[derive(Debug, Clone)]
pub struct Handler {
    recommender: Recommender,
}

impl Handler {
    /// Build a handler after validating the configuration and schema
    pub fn new(config: RecommenderConfig, mut schema: FeatureSchema) -> Result<Self> {
        config.validate()?;
        schema.validate_and_normalize()?;
        Ok(Self {
            recommender: Recommender::with_schema(config, schema),
        })
    }

    pub fn recommender(&self) -> &Recommender {
        &self.recommender
    }

    /// Parse and answer a raw JSON request
    pub fn handle_str(&self, input: &str) -> Result<Response> {
        let request = Request::parse(input)?;
        Ok(self.handle(&request))
    }

    pub fn handle(&self, request: &Request) -> Response {
        info!(mode = request.mode(), "handling request");
        let default_limit = self.recommender.config().default_limit;

        match request {
            Request::UserRecommendations(req) => {
                let outcome = self.recommender.recommend_for_user(
                    req.user_history(),
                    req.all_properties(),
                    resolve_limit(req.limit, default_limit),
                );
                log_empty(&outcome);
                Response::recommendations(outcome.into_inner())
            }
            Request::SimilarProperties(req) => {
                let outcome = self.recommender.similar_properties(
                    req.property_id.as_ref(),
                    req.all_properties(),
                    resolve_limit(req.limit, default_limit),
                );
                log_empty(&outcome);
                Response::similar_properties(outcome.into_inner())
            }
            Request::Test => Response::Diagnostics(run_self_test(&self.recommender)),
        }
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self {
            recommender: Recommender::default(),
        }
    }
}

fn log_empty<T>(outcome: &Outcome<T>) {
    if let Some(reason) = outcome.empty_reason() {
        debug!(%reason, "request produced no results");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propsim_core::Error;
    use serde_json::{json, Value};

    fn handle(input: Value) -> Value {
        let response = Handler::default().handle_str(&input.to_string()).unwrap();
        serde_json::to_value(response).unwrap()
    }

    fn scenario() -> Value {
        serde_json::to_value(diagnostics::scenario_properties()).unwrap()
    }

    #[test]
    fn test_user_recommendations_mode() {
        let output = handle(json!({
            "mode": "user_recommendations",
            "user_history": [{"property_id": "prop1"}],
            "all_properties": scenario(),
            "limit": 2
        }));

        assert_eq!(output, json!({"success": true, "recommendations": ["prop2", "prop3"]}));
    }

    #[test]
    fn test_similar_properties_mode() {
        let output = handle(json!({
            "mode": "similar_properties",
            "property_id": "prop1",
            "all_properties": scenario()
        }));

        assert_eq!(output, json!({"success": true, "similar_properties": ["prop2", "prop3"]}));
    }

    #[test]
    fn test_missing_target_is_soft() {
        let output = handle(json!({
            "mode": "similar_properties",
            "all_properties": scenario()
        }));

        assert_eq!(output, json!({"success": true, "similar_properties": []}));
    }

    #[test]
    fn test_test_mode() {
        let output = handle(json!({"mode": "test"}));

        assert_eq!(output["success"], true);
        assert_eq!(output["message"], "All tests passed");
        assert_eq!(output["similar_to_prop1"], json!(["prop2", "prop3"]));
        assert!(output["stats"]["best_score"].as_f64().unwrap() > 0.9);
    }

    #[test]
    fn test_malformed_records_are_soft() {
        let mut properties = scenario();
        properties
            .as_array_mut()
            .unwrap()
            .push(json!({"property_type": "Apartment", "price": 1}));

        let output = handle(json!({
            "mode": "similar_properties",
            "property_id": "prop1",
            "all_properties": properties
        }));
        assert_eq!(output, json!({"success": true, "similar_properties": ["prop2", "prop3"]}));

        let output = handle(json!({
            "user_history": [{"property_id": "prop1"}, {"property_id": 2.5}],
            "all_properties": scenario(),
            "limit": 2
        }));
        assert_eq!(output, json!({"success": true, "recommendations": ["prop2", "prop3"]}));
    }

    #[test]
    fn test_unknown_mode_is_hard_error() {
        let result = Handler::default().handle_str(r#"{"mode": "bogus"}"#);
        assert!(matches!(result, Err(Error::UnknownMode(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RecommenderConfig::default().with_max_batch_size(0);
        assert!(Handler::new(config, FeatureSchema::default()).is_err());

        let empty_schema = FeatureSchema::new(Default::default());
        assert!(Handler::new(RecommenderConfig::default(), empty_schema).is_err());
    }
}
