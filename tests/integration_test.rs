// Integration tests for propsim
use propsim::prelude::*;
use propsim_api::diagnostics::scenario_properties;
use propsim_similarity::backfill;
use serde_json::{json, Value};

fn records(raw: Value) -> Vec<PropertyRecord> {
    serde_json::from_value(raw).unwrap()
}

fn ids(raw: &[&str]) -> Vec<PropertyId> {
    raw.iter().map(|id| PropertyId::from(*id)).collect()
}

fn mixed_batch() -> Vec<PropertyRecord> {
    records(json!([
        {"id": "a", "property_type": "Apartment", "price": 100000, "area": 90, "bedrooms": 2, "bathrooms": 1,
         "governate": "Beirut", "city": "Hamra", "features": ["parking", "balcony"], "created_at": "2024-03-01T10:00:00Z"},
        {"id": "b", "property_type": "Apartment", "price": "125000", "bedrooms": "3",
         "governate": "Beirut", "city": "Achrafieh", "created_at": "2024-03-05 08:30:00", "is_featured": 1},
        {"id": "c", "price": null, "area": "n/a", "features": "pool"},
        {"id": 4, "property_type": "Villa", "price": 650000, "area": 400, "bedrooms": 5, "bathrooms": 4,
         "governate": "Mount Lebanon", "city": "Broumana", "features": ["pool", "garden", "parking"],
         "created_at": "2024-02-01", "is_featured": "true"}
    ]))
}

#[test]
fn test_normalized_records_have_every_field() {
    let normalized = Normalizer::new(500).normalize(&mixed_batch());

    assert!(!normalized.degraded);
    assert_eq!(normalized.len(), 4);

    let c = &normalized.records[2];
    assert_eq!(c.property_type, "Unknown");
    assert_eq!(c.governate, "Unknown");
    assert_eq!(c.city, "Unknown");
    assert_eq!(c.location, "Unknown_Unknown");
    assert_eq!(c.features_count, 0);
    assert_eq!(c.bedrooms, 0);
    assert!(!c.is_featured);
    assert!(c.price.is_finite() && c.area.is_finite());

    let b = &normalized.records[1];
    assert_eq!(b.price, 125000.0);
    assert_eq!(b.bedrooms, 3);
    assert!(b.is_featured);
    assert_eq!(b.location, "Beirut_Achrafieh");

    assert_eq!(normalized.records[3].id, PropertyId::Integer(4));
    assert_eq!(normalized.records[3].features_count, 3);
}

#[test]
fn test_median_fill() {
    let normalized = Normalizer::new(500).normalize(&records(json!([
        {"id": "a", "price": 100, "area": 50},
        {"id": "b"},
        {"id": "c", "price": 300, "area": 70},
        {"id": "d", "price": 400}
    ])));

    let b = &normalized.records[1];
    assert_eq!(b.price, 300.0);
    assert_eq!(b.area, 60.0);
    assert_eq!(normalized.records[3].area, 60.0);
}

#[test]
fn test_normalization_is_idempotent() {
    let normalizer = Normalizer::new(500);
    let first = normalizer.normalize(&mixed_batch());
    let second = normalizer.renormalize(&first.records);

    assert_eq!(first.records, second.records);
}

#[test]
fn test_batch_cap() {
    let batch: Vec<PropertyRecord> = (0..12)
        .map(|i| {
            let mut record = PropertyRecord::new(i as i64);
            record.price = Some(json!(1000 * (i + 1)));
            record
        })
        .collect();

    let normalized = Normalizer::new(10).normalize(&batch);
    assert_eq!(normalized.len(), 10);
    assert_eq!(normalized.truncated_from, Some(12));
    assert_eq!(normalized.records[9].id, PropertyId::Integer(9));

    // Listings past the cap are invisible to ranking
    let config = RecommenderConfig::default().with_max_batch_size(10);
    let similar = Recommender::new(config)
        .similar_properties(Some(&PropertyId::Integer(11)), &batch, 5)
        .into_inner();
    assert!(similar.is_empty());
}

#[test]
fn test_unknown_category_encodes_as_zeros() {
    let normalizer = Normalizer::new(500);
    let encoder = FeatureEncoder::new(FeatureSchema::default());

    let fitted = normalizer.normalize(&scenario_properties());
    let encoded = encoder.encode(&fitted.records);
    let fitted_encoder = encoded.encoder().unwrap();

    let mut stranger = PropertyRecord::new("x");
    stranger.property_type = Some(json!("Chalet"));
    stranger.governate = Some(json!("South"));
    stranger.city = Some(json!("Tyre"));
    let stranger = &normalizer.normalize(&[stranger]).records[0];

    let vector = fitted_encoder.transform(stranger).unwrap();
    let columns = fitted_encoder.column_names();
    for (value, label) in vector.as_slice().iter().zip(&columns) {
        if label.contains('=') {
            assert_eq!(*value, 0.0, "column {} should be zero", label);
        }
    }
}

#[test]
fn test_scenario_find_similar() {
    let recommender = Recommender::default();
    let properties = scenario_properties();

    let similar = recommender
        .similar_properties(Some(&PropertyId::from("prop1")), &properties, 5)
        .into_inner();
    assert_eq!(similar, ids(&["prop2", "prop3"]));

    let one = recommender
        .similar_properties(Some(&PropertyId::from("prop1")), &properties, 1)
        .into_inner();
    assert_eq!(one, ids(&["prop2"]));
}

#[test]
fn test_scenario_recommend_for_user() {
    let recommender = Recommender::default();
    let properties = scenario_properties();

    let picks = recommender
        .recommend_for_user(&[HistoryItem::new("prop1")], &properties, 5)
        .into_inner();
    assert_eq!(picks, ids(&["prop2", "prop3", "prop1"]));
}

#[test]
fn test_find_similar_never_returns_target() {
    let recommender = Recommender::default();
    let properties = mixed_batch();
    let normalized = Normalizer::new(500).normalize(&properties);

    for record in &normalized.records {
        let similar = recommender
            .similar_properties(Some(&record.id), &properties, 10)
            .into_inner();
        assert!(!similar.contains(&record.id));
        assert_eq!(similar.len(), properties.len() - 1);
    }
}

#[test]
fn test_result_length_bounds() {
    let recommender = Recommender::default();
    let properties = mixed_batch();
    let history = vec![HistoryItem::new("a"), HistoryItem::new(4i64)];

    for count in 0..6 {
        let picks = recommender
            .recommend_for_user(&history, &properties, count)
            .into_inner();
        assert_eq!(picks.len(), count.min(properties.len()));

        let similar = recommender
            .similar_properties(Some(&PropertyId::from("a")), &properties, count)
            .into_inner();
        assert!(similar.len() <= count);
    }

    assert!(recommender.recommend_for_user(&[], &properties, 5).into_inner().is_empty());
    assert!(recommender.recommend_for_user(&history, &[], 5).into_inner().is_empty());
    assert!(recommender
        .similar_properties(Some(&PropertyId::from("a")), &[], 5)
        .into_inner()
        .is_empty());
    assert!(matches!(
        recommender.recommend_for_user(&history, &properties, 0),
        Outcome::Empty(EmptyReason::ZeroLimit)
    ));
}

#[test]
fn test_backfill_is_exhaustive() {
    let recommender = Recommender::default();
    let properties = mixed_batch();

    // History pointing nowhere still fills the list from the pool
    let picks = recommender
        .recommend_for_user(&[HistoryItem::new("missing")], &properties, 10)
        .into_inner();
    assert_eq!(picks.len(), properties.len());

    let mut unique = picks.clone();
    unique.sort_by_key(|id| id.to_string());
    unique.dedup();
    assert_eq!(unique.len(), picks.len());

    // Featured first, newest first within each group
    assert_eq!(picks[0], PropertyId::from("b"));
    assert_eq!(picks[1], PropertyId::Integer(4));
}

#[test]
fn test_backfill_skips_selected() {
    let normalized = Normalizer::new(500).normalize(&mixed_batch());
    let mut selected = ids(&["b"]);

    backfill(&normalized.records, &mut selected, 3);

    assert_eq!(selected.len(), 3);
    assert_eq!(selected[0], PropertyId::from("b"));
    assert_eq!(selected[1], PropertyId::Integer(4));
}

#[test]
fn test_handler_modes() {
    let handler = Handler::default();
    let all_properties = serde_json::to_value(scenario_properties()).unwrap();

    let user = handler
        .handle_str(
            &json!({"user_history": [{"property_id": "prop1"}], "all_properties": all_properties})
                .to_string(),
        )
        .unwrap();
    assert_eq!(
        serde_json::to_value(user).unwrap(),
        json!({"success": true, "recommendations": ["prop2", "prop3", "prop1"]})
    );

    let similar = handler
        .handle_str(
            &json!({"mode": "similar_properties", "property_id": "prop1", "all_properties": all_properties, "limit": 1})
                .to_string(),
        )
        .unwrap();
    assert_eq!(
        serde_json::to_value(similar).unwrap(),
        json!({"success": true, "similar_properties": ["prop2"]})
    );

    let diagnostics = serde_json::to_value(handler.handle_str(r#"{"mode": "test"}"#).unwrap()).unwrap();
    assert_eq!(diagnostics["message"], "All tests passed");

    assert!(matches!(
        handler.handle_str(r#"{"mode": "trending"}"#),
        Err(Error::UnknownMode(_))
    ));
    assert!(matches!(handler.handle_str("not json"), Err(Error::InvalidInput(_))));
}

#[test]
fn test_integer_ids_round_trip() {
    let handler = Handler::default();
    let input = json!({
        "mode": "similar_properties",
        "property_id": 1,
        "all_properties": [
            {"id": 1, "property_type": "Apartment", "price": 100},
            {"id": 2, "property_type": "Apartment", "price": 110},
            {"id": "3", "property_type": "Villa", "price": 900}
        ]
    });

    let output = serde_json::to_value(handler.handle_str(&input.to_string()).unwrap()).unwrap();
    assert_eq!(output, json!({"success": true, "similar_properties": [2, "3"]}));
}

#[test]
fn test_bad_count_keeps_batch_median() {
    let normalized = Normalizer::new(500).normalize(&records(json!([
        {"id": "a", "price": 100},
        {"id": "b", "price": "300"},
        {"id": "c", "bedrooms": -1}
    ])));

    assert!(!normalized.degraded);
    let prices: Vec<f64> = normalized.records.iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![100.0, 300.0, 200.0]);
    assert_eq!(normalized.records[2].bedrooms, 0);
}

#[test]
fn test_malformed_entries_do_not_fail_request() {
    let handler = Handler::default();
    let mut all_properties = serde_json::to_value(scenario_properties()).unwrap();
    all_properties
        .as_array_mut()
        .unwrap()
        .push(json!({"price": 150000, "property_type": "Apartment"}));

    let similar = handler
        .handle_str(
            &json!({"mode": "similar_properties", "property_id": "prop1", "all_properties": all_properties})
                .to_string(),
        )
        .unwrap();
    assert_eq!(
        serde_json::to_value(similar).unwrap(),
        json!({"success": true, "similar_properties": ["prop2", "prop3"]})
    );

    let user = handler
        .handle_str(
            &json!({
                "user_history": [{"property_id": "prop1"}, {"property_id": 2.5}, {"property_id": 0}],
                "all_properties": all_properties
            })
            .to_string(),
        )
        .unwrap();
    assert_eq!(
        serde_json::to_value(user).unwrap(),
        json!({"success": true, "recommendations": ["prop2", "prop3", "prop1"]})
    );
}
