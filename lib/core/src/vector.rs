use serde::{Deserialize, Serialize};

/// One encoded row of the feature matrix
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![0.0; dim],
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Dot product; mismatched dimensions yield 0.0
    #[inline]
    pub fn dot(&self, other: &Vector) -> f32 {
        if self.dim() != other.dim() {
            return 0.0;
        }
        dot_product(&self.data, &other.data)
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        dot_product(&self.data, &self.data).sqrt()
    }

    /// Compute cosine similarity with another vector
    ///
    /// A zero-length vector (every column at its batch mean and no
    /// categories set) has no direction, so it scores 0.0 against everything.
    #[inline]
    pub fn cosine_similarity(&self, other: &Vector) -> f32 {
        if self.dim() != other.dim() {
            return 0.0;
        }

        let norm_a = self.norm();
        let norm_b = other.norm();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product(&self.data, &other.data) / (norm_a * norm_b)
    }
}

/// Scalar dot product with two accumulators for better pipelining
#[inline]
fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    let mut sum1 = 0.0f32;
    let mut sum2 = 0.0f32;

    let mut chunks_a = a.chunks_exact(2);
    let mut chunks_b = b.chunks_exact(2);
    for (x, y) in (&mut chunks_a).zip(&mut chunks_b) {
        sum1 += x[0] * y[0];
        sum2 += x[1] * y[1];
    }
    for (x, y) in chunks_a.remainder().iter().zip(chunks_b.remainder()) {
        sum1 += x * y;
    }

    sum1 + sum2
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}
