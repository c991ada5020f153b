//! History-based recommendations
//!
//! Each viewed property contributes its nearest neighbors; candidates are
//! ranked by how many history items proposed them. Short lists are padded
//! with featured listings first, then with the newest remaining ones.

use crate::rank::SimilarityRanker;
use ahash::{AHashMap, AHashSet};
use propsim_core::{
    EmptyReason, HistoryItem, NormalizedRecord, Outcome, PropertyId, PropertyRecord,
    RecommenderConfig, Result,
};
use propsim_schema::{Encoded, FeatureEncoder, FeatureSchema, Normalizer};
use std::cmp::Reverse;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A property batch normalized and encoded once per request
#[derive(Debug, Clone, Default)]
pub struct PreparedBatch {
    pub records: Vec<NormalizedRecord>,
    pub encoded: Encoded,
    pub degraded: bool,
    pub truncated_from: Option<usize>,
}

impl PreparedBatch {
    /// A ranker over the batch, `None` when no encoding is available
    pub fn ranker(&self) -> Option<SimilarityRanker<'_>> {
        self.encoded
            .matrix()
            .map(|matrix| SimilarityRanker::new(&self.records, matrix))
    }
}

/// Entry point for both recommendation modes
#[derive(Debug, Clone)]
pub struct Recommender {
    config: RecommenderConfig,
    normalizer: Normalizer,
    encoder: FeatureEncoder,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(RecommenderConfig::default())
    }
}

impl Recommender {
    pub fn new(config: RecommenderConfig) -> Self {
        Self::with_schema(config, FeatureSchema::default())
    }

    pub fn with_schema(config: RecommenderConfig, schema: FeatureSchema) -> Self {
        Self {
            normalizer: Normalizer::from_config(&config),
            encoder: FeatureEncoder::from_config(schema, &config),
            config,
        }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Normalize and encode a property pool
    pub fn prepare(&self, properties: &[PropertyRecord]) -> PreparedBatch {
        let start = Instant::now();
        let normalized = self.normalizer.normalize(properties);
        let encoded = self.encoder.encode(&normalized.records);
        debug!(
            rows = normalized.len(),
            encoded = !encoded.is_empty(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "prepared property batch"
        );

        PreparedBatch {
            records: normalized.records,
            encoded,
            degraded: normalized.degraded,
            truncated_from: normalized.truncated_from,
        }
    }

    /// Properties most similar to one reference property
    pub fn similar_properties(
        &self,
        target: Option<&PropertyId>,
        properties: &[PropertyRecord],
        count: usize,
    ) -> Outcome<Vec<PropertyId>> {
        let Some(target) = target else {
            return Outcome::Empty(EmptyReason::UnknownTarget(None));
        };
        if properties.is_empty() {
            return Outcome::Empty(EmptyReason::EmptyPool);
        }

        let batch = self.prepare(properties);
        match batch.ranker() {
            Some(ranker) => ranker.find_similar(target, count),
            None => Outcome::Empty(EmptyReason::NoEncoding),
        }
    }

    /// Recommendations from a user's viewing history
    pub fn recommend_for_user(
        &self,
        history: &[HistoryItem],
        properties: &[PropertyRecord],
        count: usize,
    ) -> Outcome<Vec<PropertyId>> {
        if history.is_empty() {
            return Outcome::Empty(EmptyReason::EmptyHistory);
        }
        if properties.is_empty() {
            return Outcome::Empty(EmptyReason::EmptyPool);
        }
        if count == 0 {
            return Outcome::Empty(EmptyReason::ZeroLimit);
        }

        let start = Instant::now();
        let batch = self.prepare(properties);
        let Some(ranker) = batch.ranker() else {
            return Outcome::Empty(EmptyReason::NoEncoding);
        };

        match self.try_recommend(&ranker, history, count) {
            Ok(recommendations) => {
                info!(
                    history = history.len(),
                    pool = batch.records.len(),
                    results = recommendations.len(),
                    elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "recommendations ready"
                );
                Outcome::Found(recommendations)
            }
            Err(err) => {
                warn!(error = %err, "recommendation failed");
                Outcome::Empty(EmptyReason::Failed(err.to_string()))
            }
        }
    }

    fn try_recommend(
        &self,
        ranker: &SimilarityRanker<'_>,
        history: &[HistoryItem],
        count: usize,
    ) -> Result<Vec<PropertyId>> {
        let mut tally = Tally::default();
        for target in history.iter().filter_map(HistoryItem::target) {
            match ranker.try_rank(target, self.config.neighbors_per_item)? {
                Some(candidates) => tally.extend(candidates.into_iter().map(|c| c.id)),
                None => debug!(property = %target, "history property not in pool"),
            }
        }

        let mut selected = tally.most_common(count);
        let from_similarity = selected.len();
        backfill(ranker.records(), &mut selected, count);
        debug!(
            from_similarity,
            backfilled = selected.len() - from_similarity,
            "merged history candidates"
        );

        Ok(selected)
    }
}

/// Occurrence counts that remember first-seen order
#[derive(Debug, Default)]
struct Tally {
    counts: Vec<(PropertyId, usize)>,
    index: AHashMap<PropertyId, usize>,
}

impl Tally {
    fn extend(&mut self, ids: impl IntoIterator<Item = PropertyId>) {
        for id in ids {
            match self.index.get(&id) {
                Some(&slot) => self.counts[slot].1 += 1,
                None => {
                    self.index.insert(id.clone(), self.counts.len());
                    self.counts.push((id, 1));
                }
            }
        }
    }

    /// Top `n` by count; equal counts keep first-seen order
    fn most_common(mut self, n: usize) -> Vec<PropertyId> {
        self.counts.sort_by_key(|(_, count)| Reverse(*count));
        self.counts.into_iter().take(n).map(|(id, _)| id).collect()
    }
}

/// Pad `selected` up to `count` from the pool
///
/// Featured properties go first, newest first, then any remaining
/// properties newest first. Identifiers already selected are skipped.
pub fn backfill(pool: &[NormalizedRecord], selected: &mut Vec<PropertyId>, count: usize) {
    if selected.len() >= count {
        return;
    }

    let mut taken: AHashSet<PropertyId> = selected.iter().cloned().collect();
    let mut by_recency: Vec<&NormalizedRecord> = pool.iter().collect();
    by_recency.sort_by_key(|r| Reverse(r.created_at));

    for featured_only in [true, false] {
        for record in &by_recency {
            if selected.len() >= count {
                return;
            }
            if featured_only && !record.is_featured {
                continue;
            }
            if taken.insert(record.id.clone()) {
                selected.push(record.id.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pool(values: Vec<serde_json::Value>) -> Vec<PropertyRecord> {
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    fn ids(values: &[&str]) -> Vec<PropertyId> {
        values.iter().map(|v| PropertyId::from(*v)).collect()
    }

    fn listings() -> Vec<PropertyRecord> {
        pool(vec![
            json!({"id": "prop1", "property_type": "Apartment", "price": 100000, "area": 100,
                   "bedrooms": 2, "bathrooms": 1, "governate": "Beirut", "city": "Downtown",
                   "created_at": "2023-01-01T00:00:00Z", "is_featured": true}),
            json!({"id": "prop2", "property_type": "Apartment", "price": 120000, "area": 110,
                   "bedrooms": 2, "bathrooms": 1, "governate": "Beirut", "city": "Downtown",
                   "created_at": "2023-01-02T00:00:00Z", "is_featured": false}),
            json!({"id": "prop3", "property_type": "Villa", "price": 500000, "area": 300,
                   "bedrooms": 4, "bathrooms": 3, "governate": "Mount Lebanon", "city": "Broumana",
                   "created_at": "2023-01-03T00:00:00Z", "is_featured": false}),
        ])
    }

    #[test]
    fn test_tally_orders_by_count_then_first_seen() {
        let mut tally = Tally::default();
        tally.extend(ids(&["c", "a", "b", "a", "b", "d"]));

        assert_eq!(tally.most_common(3), ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_backfill_featured_then_newest() {
        let records = Normalizer::default()
            .normalize(&pool(vec![
                json!({"id": "old_featured", "is_featured": true, "created_at": "2022-01-01"}),
                json!({"id": "new_plain", "created_at": "2024-01-01"}),
                json!({"id": "new_featured", "is_featured": true, "created_at": "2023-06-01"}),
                json!({"id": "mid_plain", "created_at": "2023-01-01"}),
            ]))
            .records;

        let mut selected = ids(&["mid_plain"]);
        backfill(&records, &mut selected, 4);

        assert_eq!(
            selected,
            ids(&["mid_plain", "new_featured", "old_featured", "new_plain"])
        );
    }

    #[test]
    fn test_backfill_never_duplicates() {
        let records = Normalizer::default()
            .normalize(&pool(vec![
                json!({"id": "a", "is_featured": true}),
                json!({"id": "a"}),
                json!({"id": "b"}),
            ]))
            .records;

        let mut selected = Vec::new();
        backfill(&records, &mut selected, 10);

        assert_eq!(selected, ids(&["a", "b"]));
    }

    #[test]
    fn test_user_scenario() {
        let recommender = Recommender::default();
        let result = recommender
            .recommend_for_user(&[HistoryItem::new("prop1")], &listings(), 5)
            .into_inner();

        // prop1 comes back through the featured backfill
        assert_eq!(result, ids(&["prop2", "prop3", "prop1"]));
    }

    #[test]
    fn test_similar_scenario() {
        let recommender = Recommender::default();
        let result = recommender.similar_properties(Some(&"prop1".into()), &listings(), 5);

        assert_eq!(result, Outcome::Found(ids(&["prop2", "prop3"])));
    }

    #[test]
    fn test_empty_inputs() {
        let recommender = Recommender::default();

        assert_eq!(
            recommender
                .recommend_for_user(&[], &listings(), 5)
                .empty_reason(),
            Some(&EmptyReason::EmptyHistory)
        );
        assert_eq!(
            recommender
                .recommend_for_user(&[HistoryItem::new("prop1")], &[], 5)
                .empty_reason(),
            Some(&EmptyReason::EmptyPool)
        );
        assert_eq!(
            recommender
                .recommend_for_user(&[HistoryItem::new("prop1")], &listings(), 0)
                .empty_reason(),
            Some(&EmptyReason::ZeroLimit)
        );
        assert_eq!(
            recommender
                .similar_properties(None, &listings(), 5)
                .empty_reason(),
            Some(&EmptyReason::UnknownTarget(None))
        );
    }

    #[test]
    fn test_unknown_history_still_backfills() {
        let recommender = Recommender::default();
        let result = recommender
            .recommend_for_user(&[HistoryItem::new("nope")], &listings(), 2)
            .into_inner();

        assert_eq!(result, ids(&["prop1", "prop3"]));
    }

    #[test]
    fn test_frequency_across_history() {
        let recommender =
            Recommender::new(RecommenderConfig::default().with_neighbors_per_item(1));
        let properties = pool(vec![
            json!({"id": "a", "property_type": "Flat", "price": 100, "governate": "X", "city": "Y"}),
            json!({"id": "b", "property_type": "Flat", "price": 110, "governate": "X", "city": "Y"}),
            json!({"id": "c", "property_type": "Flat", "price": 120, "governate": "X", "city": "Y"}),
            json!({"id": "d", "property_type": "Farm", "price": 900, "governate": "Z", "city": "W"}),
        ]);

        // Both a and c have b as their single nearest neighbor
        let result = recommender
            .recommend_for_user(
                &[HistoryItem::new("a"), HistoryItem::new("c")],
                &properties,
                1,
            )
            .into_inner();

        assert_eq!(result, ids(&["b"]));
    }

    #[test]
    fn test_limit_bounds_result() {
        let recommender = Recommender::default();
        let result = recommender
            .recommend_for_user(&[HistoryItem::new("prop1")], &listings(), 1)
            .into_inner();

        assert_eq!(result, ids(&["prop2"]));
    }
}
