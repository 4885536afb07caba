// Full evaluation of a model pair: similarity, alignment, and all four
// stability metrics bundled into one serializable report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::stability::{StabilityScorer, DEFAULT_TOP_N};
use crate::alignment::{Alignment, AssignmentStrategy, TopicAligner};
use crate::error::Result;
use crate::model::TopicModel;
use crate::similarity::{AlignmentBasis, SimilarityMeasure};

/// Knobs for one evaluation run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoringOptions {
    pub top_n: usize,
    pub measure: SimilarityMeasure,
    pub basis: AlignmentBasis,
    pub strategy: AssignmentStrategy,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            measure: SimilarityMeasure::default(),
            basis: AlignmentBasis::default(),
            strategy: AssignmentStrategy::default(),
        }
    }
}

/// Stability of one model pair.
#[derive(Debug, Clone, Serialize)]
pub struct StabilityReport {
    pub model_a: String,
    pub model_b: String,
    pub num_topics: usize,
    pub num_docs: usize,
    pub options: ScoringOptions,
    pub alignment: Alignment,
    /// Mean aligned document-topic similarity.
    pub theta_stability: f64,
    /// Fraction of documents whose dominant topic is preserved.
    pub doc_stability: f64,
    /// Mean matched topic-word similarity.
    pub phi_stability: f64,
    /// Mean top-N word overlap of matched topics.
    pub topwords_stability: f64,
    pub per_document_theta: Vec<f64>,
    pub per_document_agreement: Vec<bool>,
    pub per_topic_phi: Vec<f64>,
    pub per_topic_topwords: Vec<f64>,
    pub evaluated_at: DateTime<Utc>,
}

/// Align `b` to `a` and compute every stability metric.
pub fn evaluate(a: &TopicModel, b: &TopicModel, options: &ScoringOptions) -> Result<StabilityReport> {
    let aligner = TopicAligner {
        basis: options.basis,
        measure: options.measure,
        strategy: options.strategy,
    };
    let (_matrix, alignment) = aligner.align(a, b)?;

    let scorer = StabilityScorer {
        measure: options.measure,
        top_n: options.top_n,
    };
    let theta = scorer.theta(a, b, &alignment)?;
    let doc = scorer.doc(a, b, &alignment)?;
    let phi = scorer.phi(a, b, &alignment)?;
    let top_words = scorer.top_words(a, b, &alignment)?;

    info!(
        theta = theta.mean,
        doc = doc.mean,
        phi = phi.mean,
        top_words = top_words.mean,
        "Computed stability scores"
    );

    Ok(StabilityReport {
        model_a: a.label().to_string(),
        model_b: b.label().to_string(),
        num_topics: a.num_topics(),
        num_docs: a.num_docs(),
        options: *options,
        alignment,
        theta_stability: theta.mean,
        doc_stability: doc.mean,
        phi_stability: phi.mean,
        topwords_stability: top_words.mean,
        per_document_theta: theta.values,
        per_document_agreement: doc.values.iter().map(|&v| v > 0.5).collect(),
        per_topic_phi: phi.values,
        per_topic_topwords: top_words.values,
        evaluated_at: Utc::now(),
    })
}
