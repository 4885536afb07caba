// Vector similarity measures for probability rows.
//
// Cosine similarity is the default: it is scale-invariant and bounded, which
// suits sparse topic-word rows over a large shared vocabulary. Total variation
// similarity (1 - half the L1 distance) is kept as an alternative because it
// reads directly as "fraction of probability mass the two rows share".

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Which measure to use when comparing two probability rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimilarityMeasure {
    /// Dot product over the product of L2 norms.
    #[default]
    Cosine,
    /// `1 - 0.5 * sum(|a_i - b_i|)`.
    TotalVariation,
}

impl SimilarityMeasure {
    /// Compare two rows under this measure.
    pub fn compare(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            SimilarityMeasure::Cosine => cosine_similarity(a, b),
            SimilarityMeasure::TotalVariation => total_variation_similarity(a, b),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMeasure::Cosine => "cosine",
            SimilarityMeasure::TotalVariation => "total-variation",
        }
    }
}

impl fmt::Display for SimilarityMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SimilarityMeasure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(SimilarityMeasure::Cosine),
            "total-variation" | "tv" | "l1" => Ok(SimilarityMeasure::TotalVariation),
            other => Err(format!(
                "unknown similarity measure '{other}' (expected cosine or total-variation)"
            )),
        }
    }
}

/// Cosine similarity between two rows.
///
/// Returns a value in [-1, 1]. A zero-norm row (or mismatched/empty input)
/// has similarity 0.0 to everything rather than dividing by zero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a = l2_norm(a);
    let mag_b = l2_norm(b);

    let denom = mag_a * mag_b;
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}

/// Total variation similarity: `1 - 0.5 * ||a - b||_1`.
///
/// For two probability distributions this lies in [0, 1]. Mismatched or
/// empty input returns 0.0.
pub fn total_variation_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let l1: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum();
    1.0 - 0.5 * l1
}

/// Euclidean norm of a row.
pub fn l2_norm(row: &[f64]) -> f64 {
    row.iter().map(|x| x * x).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let a = vec![0.2, 0.3, 0.5];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_opposite_is_negative() {
        // Not clamped to zero: probability rows never hit this, but raw
        // vectors can and the full [-1, 1] range is reported.
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_norm_row() {
        let zero = vec![0.0, 0.0, 0.0];
        let b = vec![0.5, 0.25, 0.25];
        assert_eq!(cosine_similarity(&zero, &b), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_cosine_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_total_variation_bounds() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(total_variation_similarity(&a, &b).abs() < 1e-12);
        assert!((total_variation_similarity(&a, &a) - 1.0).abs() < 1e-12);

        let c = vec![0.5, 0.5];
        assert!((total_variation_similarity(&a, &c) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_measure_parse() {
        assert_eq!("cosine".parse(), Ok(SimilarityMeasure::Cosine));
        assert_eq!(
            "Total-Variation".parse(),
            Ok(SimilarityMeasure::TotalVariation)
        );
        assert!("euclid".parse::<SimilarityMeasure>().is_err());
    }
}
