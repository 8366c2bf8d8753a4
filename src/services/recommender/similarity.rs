use ndarray::{Array2, ArrayView1};

use super::matrix::InteractionMatrix;

/// Pairwise cosine similarity between the rows of an [`InteractionMatrix`]
///
/// Square and symmetric, with the same row ordering as the source matrix.
/// Scores lie in `[0, 1]` and the diagonal is always `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    scores: Array2<f64>,
}

impl SimilarityMatrix {
    /// Computes cosine similarity for every pair of retailers, O(R^2 * C)
    pub fn cosine(matrix: &InteractionMatrix) -> Self {
        let rows = matrix.cells().mapv(f64::from);
        // Off-diagonal cells hold dot products, the diagonal holds squared norms
        let gram = rows.dot(&rows.t());
        let n = gram.nrows();

        let scores = Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j {
                1.0
            } else {
                cosine(gram[[i, j]], gram[[i, i]], gram[[j, j]])
            }
        });

        Self { scores }
    }

    pub fn len(&self) -> usize {
        self.scores.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.scores[[i, j]]
    }

    /// Similarity of row `index` against every row, itself included
    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.scores.row(index)
    }
}

/// Cosine from a dot product and the two squared norms; `0/0` is `0`
fn cosine(dot: f64, squared_norm_a: f64, squared_norm_b: f64) -> f64 {
    let denominator = (squared_norm_a * squared_norm_b).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}
