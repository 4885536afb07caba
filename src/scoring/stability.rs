// The four stability metrics.
//
// Each metric is a pure function of (model A, model B, alignment) and reads
// nothing else:
//
//   theta:     mean similarity of each document's topic mixture, with
//              model A's mixture reordered into model B's topic order
//   doc:       fraction of documents whose dominant topic survives the
//              alignment
//   phi:       mean similarity of matched topics' word distributions
//   top words: mean overlap of matched topics' top-N word lists, |A ∩ B| / N
//
// Doc-level metrics need both models to describe the same documents; phi
// needs the same vocabulary. Top-word overlap compares word strings, so it
// only needs matched topics.

use std::collections::HashSet;

use crate::alignment::Alignment;
use crate::error::{Result, StabilityError};
use crate::model::topic_model::permute_row;
use crate::model::TopicModel;
use crate::similarity::SimilarityMeasure;

/// Default number of top words compared per topic.
pub const DEFAULT_TOP_N: usize = 10;

/// A metric's mean together with the per-document or per-topic values it
/// averages.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDetail {
    pub mean: f64,
    pub values: Vec<f64>,
}

impl MetricDetail {
    fn from_values(values: Vec<f64>) -> Self {
        Self {
            mean: mean(&values),
            values,
        }
    }
}

/// Scores agreement between two aligned models.
#[derive(Debug, Clone, Copy)]
pub struct StabilityScorer {
    /// Measure for theta and phi row comparisons.
    pub measure: SimilarityMeasure,
    /// How many top words per topic the overlap metric compares.
    pub top_n: usize,
}

impl Default for StabilityScorer {
    fn default() -> Self {
        Self {
            measure: SimilarityMeasure::Cosine,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl StabilityScorer {
    /// Per-document similarity of topic mixtures after alignment.
    pub fn theta(&self, a: &TopicModel, b: &TopicModel, alignment: &Alignment) -> Result<MetricDetail> {
        check_topics(a, b, alignment)?;
        check_same_docs(a, b)?;

        let values = a
            .theta()
            .iter()
            .zip(b.theta())
            .map(|(row_a, row_b)| self.measure.compare(&permute_row(row_a, alignment), row_b))
            .collect();

        Ok(MetricDetail::from_values(values))
    }

    /// Per-document dominant-topic agreement (1.0 or 0.0) after alignment.
    pub fn doc(&self, a: &TopicModel, b: &TopicModel, alignment: &Alignment) -> Result<MetricDetail> {
        check_topics(a, b, alignment)?;
        check_same_docs(a, b)?;

        let values = a
            .doc_labels()
            .into_iter()
            .zip(b.doc_labels())
            .map(|(label_a, label_b)| {
                if alignment.map(label_a) == label_b {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();

        Ok(MetricDetail::from_values(values))
    }

    /// Per-topic similarity of matched word distributions.
    pub fn phi(&self, a: &TopicModel, b: &TopicModel, alignment: &Alignment) -> Result<MetricDetail> {
        check_topics(a, b, alignment)?;
        if a.vocab_size() != b.vocab_size() {
            return Err(StabilityError::shape(
                "model pair",
                format!(
                    "{} has {} vocabulary words but {} has {}",
                    a.label(),
                    a.vocab_size(),
                    b.label(),
                    b.vocab_size()
                ),
            ));
        }

        let values = alignment
            .pairs()
            .map(|(i, j)| self.measure.compare(&a.phi()[i], &b.phi()[j]))
            .collect();

        Ok(MetricDetail::from_values(values))
    }

    /// Per-topic overlap of matched top-N word lists, normalized by N.
    ///
    /// N is `top_n` clamped to the smaller vocabulary, so every value is a
    /// multiple of 1/N.
    pub fn top_words(&self, a: &TopicModel, b: &TopicModel, alignment: &Alignment) -> Result<MetricDetail> {
        check_topics(a, b, alignment)?;
        if self.top_n == 0 {
            return Err(StabilityError::InvalidParameter(
                "top-N for word overlap must be at least 1".to_string(),
            ));
        }

        let n = self.top_n.min(a.vocab_size()).min(b.vocab_size());
        if n == 0 {
            return Err(StabilityError::shape(
                "model pair",
                "cannot compare top words over an empty vocabulary",
            ));
        }

        let top_a = a.top_words(n);
        let top_b = b.top_words(n);

        let values = alignment
            .pairs()
            .map(|(i, j)| {
                let words_a: HashSet<&str> = top_a[i].iter().map(String::as_str).collect();
                let shared = top_b[j]
                    .iter()
                    .filter(|w| words_a.contains(w.as_str()))
                    .count();
                shared as f64 / n as f64
            })
            .collect();

        Ok(MetricDetail::from_values(values))
    }
}

/// Mean cosine similarity of aligned document-topic mixtures.
pub fn theta_stability(a: &TopicModel, b: &TopicModel, alignment: &Alignment) -> Result<f64> {
    StabilityScorer::default().theta(a, b, alignment).map(|d| d.mean)
}

/// Fraction of documents whose dominant topic is preserved by the alignment.
pub fn doc_stability(a: &TopicModel, b: &TopicModel, alignment: &Alignment) -> Result<f64> {
    StabilityScorer::default().doc(a, b, alignment).map(|d| d.mean)
}

/// Mean cosine similarity of matched topic-word distributions.
pub fn phi_stability(a: &TopicModel, b: &TopicModel, alignment: &Alignment) -> Result<f64> {
    StabilityScorer::default().phi(a, b, alignment).map(|d| d.mean)
}

/// Mean top-N word overlap of matched topics.
pub fn topwords_stability(
    a: &TopicModel,
    b: &TopicModel,
    alignment: &Alignment,
    top_n: usize,
) -> Result<f64> {
    let scorer = StabilityScorer {
        top_n,
        ..StabilityScorer::default()
    };
    scorer.top_words(a, b, alignment).map(|d| d.mean)
}

/// Mean of the values; 0.0 for an empty slice.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn check_topics(a: &TopicModel, b: &TopicModel, alignment: &Alignment) -> Result<()> {
    if a.num_topics() != b.num_topics() {
        return Err(StabilityError::DimensionMismatch {
            left: a.num_topics(),
            right: b.num_topics(),
        });
    }
    if alignment.len() != a.num_topics() {
        return Err(StabilityError::DimensionMismatch {
            left: a.num_topics(),
            right: alignment.len(),
        });
    }
    Ok(())
}

fn check_same_docs(a: &TopicModel, b: &TopicModel) -> Result<()> {
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
    Ok(())
}
