//! Nearest-neighbor ranking over a feature matrix
//!
//! Scores every row of the matrix against one target row by cosine
//! similarity and returns the best candidates, never the target itself.

use crate::explain::ExplainedResult;
use ordered_float::OrderedFloat;
use propsim_core::{EmptyReason, Error, NormalizedRecord, Outcome, PropertyId, Result};
use propsim_schema::FeatureMatrix;
use serde::Serialize;
use std::cmp::Reverse;
use tracing::debug;

/// A candidate row with its similarity to the target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub id: PropertyId,
    /// Row of the candidate in the matrix
    #[serde(skip)]
    pub row: usize,
    pub score: f32,
}

/// Ranks rows of one matrix; records and matrix rows join by position
#[derive(Debug, Clone, Copy)]
pub struct SimilarityRanker<'a> {
    records: &'a [NormalizedRecord],
    matrix: &'a FeatureMatrix,
}

impl<'a> SimilarityRanker<'a> {
    pub fn new(records: &'a [NormalizedRecord], matrix: &'a FeatureMatrix) -> Self {
        Self { records, matrix }
    }

    pub fn records(&self) -> &'a [NormalizedRecord] {
        self.records
    }

    pub fn matrix(&self) -> &'a FeatureMatrix {
        self.matrix
    }

    /// Row of the first record with this identifier
    pub fn position(&self, id: &PropertyId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }

    /// Identifiers of the `count` rows most similar to `target`
    pub fn find_similar(&self, target: &PropertyId, count: usize) -> Outcome<Vec<PropertyId>> {
        self.rank(target, count)
            .map(|candidates| candidates.into_iter().map(|c| c.id).collect())
    }

    /// The `count` rows most similar to `target`, with scores
    ///
    /// An unknown target and any internal failure both come back empty.
    pub fn rank(&self, target: &PropertyId, count: usize) -> Outcome<Vec<ScoredCandidate>> {
        if count == 0 {
            return Outcome::Empty(EmptyReason::ZeroLimit);
        }
        match self.try_rank(target, count) {
            Ok(Some(candidates)) => Outcome::Found(candidates),
            Ok(None) => {
                debug!(property = %target, "property not found in batch");
                Outcome::Empty(EmptyReason::UnknownTarget(Some(target.clone())))
            }
            Err(err) => Outcome::Empty(EmptyReason::Failed(err.to_string())),
        }
    }

    /// Rank with errors surfaced; `Ok(None)` when the target is not in the batch
    ///
    /// Candidates are ordered by descending score, equal scores keeping
    /// row order. Rows sharing the target's identifier are excluded, and
    /// each identifier appears at most once.
    pub fn try_rank(
        &self,
        target: &PropertyId,
        count: usize,
    ) -> Result<Option<Vec<ScoredCandidate>>> {
        if self.records.len() != self.matrix.len() {
            return Err(Error::InvalidDimension {
                expected: self.records.len(),
                actual: self.matrix.len(),
            });
        }

        let Some(target_row) = self.position(target) else {
            return Ok(None);
        };
        let target_vector = self.row(target_row)?;

        let mut scored = Vec::with_capacity(self.matrix.len());
        for (row, vector) in self.matrix.rows().iter().enumerate() {
            if vector.dim() != target_vector.dim() {
                return Err(Error::InvalidDimension {
                    expected: target_vector.dim(),
                    actual: vector.dim(),
                });
            }
            scored.push((row, target_vector.cosine_similarity(vector)));
        }

        // Stable: equal scores stay in row order
        scored.sort_by_key(|(_, score)| Reverse(OrderedFloat(*score)));

        let mut candidates: Vec<ScoredCandidate> = Vec::with_capacity(count);
        for (row, score) in scored {
            if candidates.len() >= count {
                break;
            }
            let id = &self.records[row].id;
            if id == target || candidates.iter().any(|c| &c.id == id) {
                continue;
            }
            candidates.push(ScoredCandidate {
                id: id.clone(),
                row,
                score,
            });
        }

        Ok(Some(candidates))
    }

    /// Ranked candidates with a per-field breakdown of each score
    pub fn explain(&self, target: &PropertyId, count: usize) -> Outcome<Vec<ExplainedResult>> {
        let candidates = match self.rank(target, count) {
            Outcome::Found(candidates) => candidates,
            Outcome::Empty(reason) => return Outcome::Empty(reason),
        };
        let Some(target_vector) = self.position(target).and_then(|row| self.matrix.row(row)) else {
            return Outcome::Empty(EmptyReason::UnknownTarget(Some(target.clone())));
        };

        Outcome::Found(
            candidates
                .into_iter()
                .filter_map(|candidate| {
                    let vector = self.matrix.row(candidate.row)?;
                    Some(ExplainedResult::compute(
                        candidate,
                        target_vector,
                        vector,
                        self.matrix.columns(),
                    ))
                })
                .collect(),
        )
    }

    fn row(&self, row: usize) -> Result<&'a propsim_core::Vector> {
        self.matrix.row(row).ok_or(Error::RowOutOfBounds {
            row,
            rows: self.matrix.len(),
        })
    }
}
