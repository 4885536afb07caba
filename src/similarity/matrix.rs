// Pairwise topic similarity between two models.
//
// Entry (i, j) scores topic i of model A against topic j of model B. The
// default basis compares phi rows (what the topics are about). The document
// cluster basis instead compares which documents each topic dominates:
//
//   sim(i, j) = 1 - |C_i symmetric-difference C'_j| / num_docs
//
// so two topics that claim exactly the same documents score 1.0.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use super::measure::{l2_norm, SimilarityMeasure};
use crate::error::{Result, StabilityError};
use crate::model::TopicModel;

/// What the aligner compares when matching topics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentBasis {
    /// Topic-word distributions (phi rows).
    #[default]
    TopicWords,
    /// Sets of documents whose dominant topic each topic is.
    DocumentClusters,
}

impl AlignmentBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlignmentBasis::TopicWords => "topic-words",
            AlignmentBasis::DocumentClusters => "document-clusters",
        }
    }
}

impl fmt::Display for AlignmentBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlignmentBasis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "topic-words" | "phi" => Ok(AlignmentBasis::TopicWords),
            "document-clusters" | "clusters" => Ok(AlignmentBasis::DocumentClusters),
            other => Err(format!(
                "unknown alignment basis '{other}' (expected topic-words or document-clusters)"
            )),
        }
    }
}

/// Dense K x K similarity matrix, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Build from explicit rows. Every row must have as many entries as
    /// there are rows, and every entry must be finite.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        if let Some(row) = rows.iter().find(|r| r.len() != size) {
            return Err(StabilityError::DimensionMismatch {
                left: size,
                right: row.len(),
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if let Some((j, value)) = row.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(StabilityError::InvalidParameter(format!(
                    "similarity[{i}][{j}] = {value} is not finite"
                )));
            }
        }
        Ok(Self {
            size,
            values: rows.into_iter().flatten().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    /// Largest absolute entry (0.0 for an empty matrix).
    pub fn max_abs(&self) -> f64 {
        self.values.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    /// Total similarity of a full assignment `forward[i] = j`.
    pub fn assignment_total(&self, forward: &[usize]) -> f64 {
        forward
            .iter()
            .enumerate()
            .map(|(i, &j)| self.get(i, j))
            .sum()
    }
}

/// Similarity between every topic of `a` and every topic of `b`.
pub fn similarity_matrix(
    a: &TopicModel,
    b: &TopicModel,
    basis: AlignmentBasis,
    measure: SimilarityMeasure,
) -> Result<SimilarityMatrix> {
    match basis {
        AlignmentBasis::TopicWords => topic_word_similarity(a, b, measure),
        AlignmentBasis::DocumentClusters => cluster_similarity(a, b),
    }
}

/// Compare phi rows of the two models under `measure`.
pub fn topic_word_similarity(
    a: &TopicModel,
    b: &TopicModel,
    measure: SimilarityMeasure,
) -> Result<SimilarityMatrix> {
    check_topic_counts(a, b)?;

    for (model, rows) in [(a, a.phi()), (b, b.phi())] {
        for (k, row) in rows.iter().enumerate() {
            if l2_norm(row) < f64::EPSILON {
                debug!(model = model.label(), topic = k, "Zero-norm phi row, similarity defined as 0");
            }
        }
    }

    let k = a.num_topics();
    let mut values = Vec::with_capacity(k * k);
    for row_a in a.phi() {
        for row_b in b.phi() {
            values.push(measure.compare(row_a, row_b));
        }
    }

    Ok(SimilarityMatrix { size: k, values })
}

/// Compare the document clusters each topic dominates.
///
/// Both models must describe the same corpus.
pub fn cluster_similarity(a: &TopicModel, b: &TopicModel) -> Result<SimilarityMatrix> {
    check_topic_counts(a, b)?;
    if a.num_docs() != b.num_docs() {
        return Err(StabilityError::shape(
            "model pair",
            format!(
                "{} has {} documents but {} has {}",
                a.label(),
                a.num_docs(),
                b.label(),
                b.num_docs()
            ),
        ));
    }

    let clusters_a = a.doc_clusters();
    let clusters_b = b.doc_clusters();
    let num_docs = a.num_docs().max(1) as f64;

    let k = a.num_topics();
    let mut values = Vec::with_capacity(k * k);
    for ca in &clusters_a {
        for cb in &clusters_b {
            let shared = ca.intersection(cb).count();
            let sym_diff = ca.len() + cb.len() - 2 * shared;
            values.push(1.0 - sym_diff as f64 / num_docs);
        }
    }

    Ok(SimilarityMatrix { size: k, values })
}

fn check_topic_counts(a: &TopicModel, b: &TopicModel) -> Result<()> {
    if a.num_topics() != b.num_topics() {
        return Err(StabilityError::DimensionMismatch {
            left: a.num_topics(),
            right: b.num_topics(),
        });
    }
    Ok(())
}
