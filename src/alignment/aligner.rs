// Topic aligner: turns a similarity matrix into a bijection between the
// topics of model A and model B.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::assignment::{greedy_assignment, max_weight_assignment, AssignmentStrategy};
use crate::error::{Result, StabilityError};
use crate::model::TopicModel;
use crate::similarity::{similarity_matrix, AlignmentBasis, SimilarityMatrix, SimilarityMeasure};

/// A one-to-one correspondence from model A's topics to model B's topics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alignment {
    /// `forward[i]` is model B's topic matched to model A's topic `i`.
    forward: Vec<usize>,
    /// `inverse[j]` is model A's topic matched to model B's topic `j`.
    #[serde(skip)]
    inverse: Vec<usize>,
    /// Similarity of each matched pair, indexed by model A's topic. Empty
    /// when the alignment was built from a bare permutation.
    similarities: Vec<f64>,
}

impl Alignment {
    /// Build from a permutation, rejecting anything that is not a bijection
    /// over `0..len`.
    pub fn from_permutation(forward: Vec<usize>) -> Result<Self> {
        let inverse = invert(&forward)?;
        Ok(Self {
            forward,
            inverse,
            similarities: Vec::new(),
        })
    }

    /// Build from a permutation and record each matched pair's similarity.
    pub fn with_similarities(forward: Vec<usize>, matrix: &SimilarityMatrix) -> Result<Self> {
        if forward.len() != matrix.size() {
            return Err(StabilityError::DimensionMismatch {
                left: forward.len(),
                right: matrix.size(),
            });
        }
        let mut alignment = Self::from_permutation(forward)?;
        alignment.similarities = alignment
            .forward
            .iter()
            .enumerate()
            .map(|(i, &j)| matrix.get(i, j))
            .collect();
        Ok(alignment)
    }

    pub fn identity(len: usize) -> Self {
        let forward: Vec<usize> = (0..len).collect();
        Self {
            inverse: forward.clone(),
            forward,
            similarities: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Model B topic matched to model A topic `i`.
    pub fn map(&self, i: usize) -> usize {
        self.forward[i]
    }

    /// Model A topic matched to model B topic `j`.
    pub fn inverse_map(&self, j: usize) -> usize {
        self.inverse[j]
    }

    pub fn forward(&self) -> &[usize] {
        &self.forward
    }

    pub fn inverse(&self) -> &[usize] {
        &self.inverse
    }

    /// Matched `(a_topic, b_topic)` pairs in model A order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.forward.iter().copied().enumerate()
    }

    pub fn is_identity(&self) -> bool {
        self.forward.iter().enumerate().all(|(i, &j)| i == j)
    }

    /// Similarity of the pair containing model A topic `i`, if recorded.
    pub fn matched_similarity(&self, i: usize) -> Option<f64> {
        self.similarities.get(i).copied()
    }

    pub fn similarities(&self) -> &[f64] {
        &self.similarities
    }

    /// Sum of matched similarities (0.0 if none were recorded).
    pub fn total_similarity(&self) -> f64 {
        self.similarities.iter().sum()
    }
}

fn invert(forward: &[usize]) -> Result<Vec<usize>> {
    let n = forward.len();
    let mut inverse = vec![usize::MAX; n];
    for (i, &j) in forward.iter().enumerate() {
        if j >= n || inverse[j] != usize::MAX {
            return Err(StabilityError::InvalidParameter(format!(
                "alignment {forward:?} is not a permutation of 0..{n}"
            )));
        }
        inverse[j] = i;
    }
    Ok(inverse)
}

/// Matches topics between two models.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopicAligner {
    pub basis: AlignmentBasis,
    pub measure: SimilarityMeasure,
    pub strategy: AssignmentStrategy,
}

impl TopicAligner {
    /// Compute the similarity matrix between `a` and `b` and align it.
    ///
    /// Fails with `DimensionMismatch` if the models have different topic
    /// counts.
    pub fn align(&self, a: &TopicModel, b: &TopicModel) -> Result<(SimilarityMatrix, Alignment)> {
        if a.num_topics() != b.num_topics() {
            return Err(StabilityError::DimensionMismatch {
                left: a.num_topics(),
                right: b.num_topics(),
            });
        }

        let matrix = similarity_matrix(a, b, self.basis, self.measure)?;
        let alignment = self.align_matrix(&matrix)?;

        info!(
            model_a = a.label(),
            model_b = b.label(),
            topics = alignment.len(),
            basis = %self.basis,
            strategy = %self.strategy,
            total_similarity = alignment.total_similarity(),
            identity = alignment.is_identity(),
            "Aligned topic models"
        );

        Ok((matrix, alignment))
    }

    /// Solve the assignment problem on a precomputed similarity matrix.
    pub fn align_matrix(&self, matrix: &SimilarityMatrix) -> Result<Alignment> {
        let forward = match self.strategy {
            AssignmentStrategy::Exact => max_weight_assignment(matrix),
            AssignmentStrategy::Greedy => {
                warn!(
                    topics = matrix.size(),
                    "Greedy topic matching is an approximation and may miss the optimal alignment"
                );
                greedy_assignment(matrix)
            }
        };

        debug!(?forward, "Solved topic assignment");
        Alignment::with_similarities(forward, matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_permutation_rejects_duplicates() {
        assert!(Alignment::from_permutation(vec![0, 0, 1]).is_err());
        assert!(Alignment::from_permutation(vec![0, 3, 1]).is_err());
    }

    #[test]
    fn test_inverse_round_trip() {
        let alignment = Alignment::from_permutation(vec![2, 0, 3, 1]).unwrap();
        for i in 0..alignment.len() {
            assert_eq!(alignment.inverse_map(alignment.map(i)), i);
            assert_eq!(alignment.map(alignment.inverse_map(i)), i);
        }
    }

    #[test]
    fn test_with_similarities_records_pairs() {
        let matrix = SimilarityMatrix::from_rows(vec![vec![0.1, 0.9], vec![0.8, 0.2]]).unwrap();
        let alignment = TopicAligner::default().align_matrix(&matrix).unwrap();
        assert_eq!(alignment.forward(), &[1, 0]);
        assert_eq!(alignment.matched_similarity(0), Some(0.9));
        assert!((alignment.total_similarity() - 1.7).abs() < 1e-12);
    }

    #[test]
    fn test_identity() {
        let alignment = Alignment::identity(3);
        assert!(alignment.is_identity());
        assert_eq!(alignment.inverse(), &[0, 1, 2]);
        assert_eq!(alignment.matched_similarity(0), None);
    }
}
