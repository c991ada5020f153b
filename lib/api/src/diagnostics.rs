//! Built-in three-listing scenario for the `test` mode

use crate::response::Diagnostics;
use propsim_core::{HistoryItem, PropertyId, PropertyRecord};
use propsim_similarity::{Recommender, SimilarityStats};
use serde_json::json;

const SCENARIO_LIMIT: usize = 5;

/// Two Beirut apartments and one Mount Lebanon villa
pub fn scenario_properties() -> Vec<PropertyRecord> {
    let raw = json!([
        {
            "id": "prop1",
            "property_type": "Apartment",
            "price": 100000,
            "area": 100,
            "bedrooms": 2,
            "bathrooms": 1,
            "governate": "Beirut",
            "city": "Downtown",
            "created_at": "2023-01-01T00:00:00Z",
            "is_featured": true
        },
        {
            "id": "prop2",
            "property_type": "Apartment",
            "price": 120000,
            "area": 110,
            "bedrooms": 2,
            "bathrooms": 1,
            "governate": "Beirut",
            "city": "Downtown",
            "created_at": "2023-01-02T00:00:00Z",
            "is_featured": false
        },
        {
            "id": "prop3",
            "property_type": "Villa",
            "price": 500000,
            "area": 300,
            "bedrooms": 4,
            "bathrooms": 3,
            "governate": "Mount Lebanon",
            "city": "Broumana",
            "created_at": "2023-01-03T00:00:00Z",
            "is_featured": false
        }
    ]);
    serde_json::from_value(raw).unwrap_or_default()
}

/// Run the scenario end to end and report what each stage produced
pub fn run_self_test(recommender: &Recommender) -> Diagnostics {
    let properties = scenario_properties();
    let target = PropertyId::from("prop1");

    let batch = recommender.prepare(&properties);
    let (similar, stats) = match batch.ranker() {
        Some(ranker) => {
            let explained = ranker.explain(&target, SCENARIO_LIMIT).into_inner();
            let stats = SimilarityStats::compute(&explained, ranker.matrix().len());
            let ids = explained.into_iter().map(|r| r.id).collect();
            (ids, stats)
        }
        None => (Vec::new(), SimilarityStats::compute(&[], 0)),
    };

    let recommendations = recommender
        .recommend_for_user(&[HistoryItem::new(target)], &properties, SCENARIO_LIMIT)
        .into_inner();

    let passed = similar.first() == Some(&PropertyId::from("prop2"))
        && recommendations.first() == Some(&PropertyId::from("prop2"));
    let message = if passed {
        "All tests passed".to_string()
    } else {
        format!(
            "Unexpected ranking: similar={:?} recommendations={:?}",
            similar, recommendations
        )
    };

    Diagnostics {
        success: passed,
        message,
        similar_to_prop1: similar,
        user_recommendations: recommendations,
        stats,
    }
}
