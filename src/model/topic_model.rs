// TopicModel: one trained model's outputs plus the derived queries the
// aligner and scorer need.
//
// A model is validated once at construction and never mutated afterwards:
// theta must have one row per document, phi one column per vocabulary word,
// and every row of both must be a probability distribution.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::alignment::Alignment;
use crate::error::{Result, StabilityError};
use crate::similarity::cosine_similarity;

/// Maximum allowed |row_sum - 1| for theta and phi rows.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// A trained topic model: document-topic and topic-word distributions over
/// a tokenized corpus.
#[derive(Debug, Clone)]
pub struct TopicModel {
    label: String,
    num_topics: usize,
    /// Document-topic distributions, one row per document.
    theta: Vec<Vec<f64>>,
    /// Topic-word distributions, one row per topic.
    phi: Vec<Vec<f64>>,
    /// Documents as token ids into `vocab`.
    docs: Vec<Vec<usize>>,
    vocab: Vec<String>,
}

impl TopicModel {
    /// Build a model, validating shapes and the probability-row invariant
    /// with the default tolerance.
    ///
    /// `label` identifies the model in error messages and reports.
    pub fn new(
        label: impl Into<String>,
        num_topics: usize,
        theta: Vec<Vec<f64>>,
        phi: Vec<Vec<f64>>,
        docs: Vec<Vec<usize>>,
        vocab: Vec<String>,
    ) -> Result<Self> {
        Self::with_tolerance(label, num_topics, theta, phi, docs, vocab, DEFAULT_TOLERANCE)
    }

    /// Like [`TopicModel::new`] with an explicit row-sum tolerance.
    pub fn with_tolerance(
        label: impl Into<String>,
        num_topics: usize,
        theta: Vec<Vec<f64>>,
        phi: Vec<Vec<f64>>,
        docs: Vec<Vec<usize>>,
        vocab: Vec<String>,
        tolerance: f64,
    ) -> Result<Self> {
        let label = label.into();

        if num_topics == 0 {
            return Err(StabilityError::shape(&label, "number of topics must be positive"));
        }
        if theta.len() != docs.len() {
            return Err(StabilityError::shape(
                &label,
                format!(
                    "theta has {} rows but the corpus has {} documents",
                    theta.len(),
                    docs.len()
                ),
            ));
        }
        if phi.len() != num_topics {
            return Err(StabilityError::shape(
                &label,
                format!("phi has {} rows, expected {num_topics} topics", phi.len()),
            ));
        }

        check_rows(&label, "theta", &theta, num_topics, tolerance)?;
        check_rows(&label, "phi", &phi, vocab.len(), tolerance)?;

        for (d, doc) in docs.iter().enumerate() {
            if let Some(&bad) = doc.iter().find(|&&w| w >= vocab.len()) {
                return Err(StabilityError::shape(
                    &label,
                    format!(
                        "document {d} contains word id {bad}, vocabulary has {} words",
                        vocab.len()
                    ),
                ));
            }
        }

        Ok(Self {
            label,
            num_topics,
            theta,
            phi,
            docs,
            vocab,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    pub fn theta(&self) -> &[Vec<f64>] {
        &self.theta
    }

    pub fn phi(&self) -> &[Vec<f64>] {
        &self.phi
    }

    pub fn docs(&self) -> &[Vec<usize>] {
        &self.docs
    }

    pub fn vocab(&self) -> &[String] {
        &self.vocab
    }

    /// Vocabulary ids of the `n` most probable words for each topic.
    ///
    /// Ties are broken by lower vocabulary index so the result is
    /// deterministic. `n` is clamped to the vocabulary size.
    pub fn top_word_ids(&self, n: usize) -> Vec<Vec<usize>> {
        let n = n.min(self.vocab.len());
        self.phi
            .iter()
            .map(|row| {
                let mut ids: Vec<usize> = (0..row.len()).collect();
                // partial_cmp treats -0.0 and 0.0 as equal mass
                ids.sort_by(|&a, &b| {
                    row[b]
                        .partial_cmp(&row[a])
                        .unwrap_or(Ordering::Equal)
                        .then(a.cmp(&b))
                });
                ids.truncate(n);
                ids
            })
            .collect()
    }

    /// The `n` most probable words for each topic, as strings.
    pub fn top_words(&self, n: usize) -> Vec<Vec<String>> {
        self.top_word_ids(n)
            .into_iter()
            .map(|ids| ids.into_iter().map(|id| self.vocab[id].clone()).collect())
            .collect()
    }

    /// Most probable topic for a document, ties broken by lowest index.
    ///
    /// Returns None if `doc` is out of range.
    pub fn dominant_topic(&self, doc: usize) -> Option<usize> {
        self.theta.get(doc).map(|row| argmax(row))
    }

    /// Dominant topic of every document, in corpus order.
    pub fn doc_labels(&self) -> Vec<usize> {
        self.theta.iter().map(|row| argmax(row)).collect()
    }

    /// For each topic, the set of documents whose dominant topic it is.
    pub fn doc_clusters(&self) -> Vec<BTreeSet<usize>> {
        let mut clusters = vec![BTreeSet::new(); self.num_topics];
        for (doc, label) in self.doc_labels().into_iter().enumerate() {
            clusters[label].insert(doc);
        }
        clusters
    }

    /// Re-express this model in another model's topic order.
    ///
    /// Topic `i` of this model becomes topic `alignment.map(i)` of the
    /// result: theta columns and phi rows are moved accordingly.
    pub fn permuted(&self, alignment: &Alignment) -> Result<TopicModel> {
        if alignment.len() != self.num_topics {
            return Err(StabilityError::DimensionMismatch {
                left: self.num_topics,
                right: alignment.len(),
            });
        }

        let theta = self
            .theta
            .iter()
            .map(|row| permute_row(row, alignment))
            .collect();

        let mut phi = vec![Vec::new(); self.num_topics];
        for (i, row) in self.phi.iter().enumerate() {
            phi[alignment.map(i)] = row.clone();
        }

        Ok(TopicModel {
            label: format!("{} (aligned)", self.label),
            num_topics: self.num_topics,
            theta,
            phi,
            docs: self.docs.clone(),
            vocab: self.vocab.clone(),
        })
    }

    /// Corpus perplexity under this model: `exp(-loglik / tokens)`.
    ///
    /// Returns None for a corpus with no tokens. A token the model assigns
    /// zero probability makes the result infinite.
    pub fn perplexity(&self) -> Option<f64> {
        let mut log_likelihood = 0.0;
        let mut token_count = 0usize;

        for (doc, topic_mix) in self.docs.iter().zip(self.theta.iter()) {
            for &word in doc {
                let pr: f64 = topic_mix
                    .iter()
                    .zip(self.phi.iter())
                    .map(|(p_topic, phi_row)| p_topic * phi_row[word])
                    .sum();
                log_likelihood += pr.ln();
                token_count += 1;
            }
        }

        if token_count == 0 {
            None
        } else {
            Some((-log_likelihood / token_count as f64).exp())
        }
    }

    /// Cosine similarity between two documents' topic mixtures.
    pub fn document_similarity(&self, doc_a: usize, doc_b: usize) -> Option<f64> {
        let a = self.theta.get(doc_a)?;
        let b = self.theta.get(doc_b)?;
        Some(cosine_similarity(a, b))
    }
}

/// Reorder a topic-indexed row through an alignment: entry `k` moves to
/// position `alignment.map(k)`.
pub(crate) fn permute_row(row: &[f64], alignment: &Alignment) -> Vec<f64> {
    let mut out = vec![0.0; row.len()];
    for (k, &value) in row.iter().enumerate() {
        out[alignment.map(k)] = value;
    }
    out
}

fn argmax(row: &[f64]) -> usize {
    let mut best = 0;
    for (k, &value) in row.iter().enumerate().skip(1) {
        if value > row[best] {
            best = k;
        }
    }
    best
}

fn check_rows(
    model: &str,
    matrix: &str,
    rows: &[Vec<f64>],
    width: usize,
    tolerance: f64,
) -> Result<()> {
    for (r, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(StabilityError::shape(
                model,
                format!("{matrix} row {r} has {} columns, expected {width}", row.len()),
            ));
        }
        if let Some((c, &value)) = row
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(StabilityError::shape(
                model,
                format!("{matrix}[{r}][{c}] = {value} is not a probability"),
            ));
        }
        let sum: f64 = row.iter().sum();
        if (sum - 1.0).abs() > tolerance {
            return Err(StabilityError::shape(
                model,
                format!("{matrix} row {r} sums to {sum:.6}, not 1 (tolerance {tolerance})"),
            ));
        }
    }
    Ok(())
}
