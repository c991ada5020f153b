//! Explainability for similarity results
//!
//! Breaks a cosine score down into per-field contributions and summarizes
//! a ranked list for diagnostics.

use crate::rank::ScoredCandidate;
use propsim_core::{PropertyId, Vector};
use serde::Serialize;
use std::collections::HashMap;

/// A similarity result with per-field score breakdown
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedResult {
    pub id: PropertyId,
    /// Cosine similarity to the target
    pub score: f32,
    /// Share of the score contributed by each source field; sums to `score`
    pub explain: HashMap<String, f32>,
}

impl ExplainedResult {
    /// Split the cosine between `target` and `candidate` by source field
    ///
    /// `columns` labels the matrix columns; one-hot indicators are labelled
    /// `field=value` and fold back into `field`.
    pub fn compute(
        scored: ScoredCandidate,
        target: &Vector,
        candidate: &Vector,
        columns: &[String],
    ) -> Self {
        let mut explain: HashMap<String, f32> = HashMap::new();
        let denom = target.norm() * candidate.norm();

        if denom > 0.0 {
            for ((a, b), label) in target
                .as_slice()
                .iter()
                .zip(candidate.as_slice())
                .zip(columns)
            {
                let field = label.split_once('=').map_or(label.as_str(), |(f, _)| f);
                *explain.entry(field.to_string()).or_insert(0.0) += a * b / denom;
            }
        }

        Self {
            id: scored.id,
            score: scored.score,
            explain,
        }
    }

    /// Field with the largest contribution
    pub fn top_field(&self) -> Option<&str> {
        self.explain
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(name, _)| name.as_str())
    }
}

/// Summary statistics for a similarity query
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimilarityStats {
    /// Rows scored, including the target
    pub candidates_count: usize,
    pub results_count: usize,
    pub avg_score: f32,
    pub best_score: f32,
    /// Field that contributed most to the best result
    pub top_contributing_field: Option<String>,
}

impl SimilarityStats {
    /// Compute stats from ranked results (best first)
    pub fn compute(results: &[ExplainedResult], candidates_count: usize) -> Self {
        let Some(best) = results.first() else {
            return Self {
                candidates_count,
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
                top_contributing_field: None,
            };
        };

        let avg_score = results.iter().map(|r| r.score).sum::<f32>() / results.len() as f32;

        Self {
            candidates_count,
            results_count: results.len(),
            avg_score,
            best_score: best.score,
            top_contributing_field: best.top_field().map(str::to_string),
        }
    }
}
