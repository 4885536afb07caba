// Topic model trainer trait: the collaborator seam.
//
// Training itself happens outside this crate. Anything that can turn a
// tokenized corpus and vocabulary into theta/phi matrices on disk can sit
// behind this trait; the default implementation shells out to the compiled
// sampler binary.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::model::ModelFiles;

/// Hyperparameters passed through to the sampler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingParams {
    pub num_topics: usize,
    /// Vocabulary size the sampler should use.
    pub num_words: usize,
    /// Document-topic Dirichlet prior.
    pub alpha: f64,
    /// Topic-word Dirichlet prior.
    pub beta: f64,
    /// Strength of the word-cluster prior.
    pub eta: f64,
    pub epochs: u32,
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            num_topics: 10,
            num_words: 5000,
            alpha: 1.0,
            beta: 0.01,
            eta: 1000.0,
            epochs: 5,
            seed: 42,
        }
    }
}

/// Files the sampler reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingInputs {
    /// Tokenized corpus, one document per line.
    pub corpus: PathBuf,
    /// Vocabulary, one word per line.
    pub vocab: PathBuf,
    /// Optional word-cluster file from preprocessing.
    pub word_clusters: Option<PathBuf>,
    /// Optional initial topic-assignment samples from preprocessing.
    pub initial_samples: Option<PathBuf>,
}

impl TrainingInputs {
    pub fn new(corpus: impl Into<PathBuf>, vocab: impl Into<PathBuf>) -> Self {
        Self {
            corpus: corpus.into(),
            vocab: vocab.into(),
            word_clusters: None,
            initial_samples: None,
        }
    }
}

/// Trains one topic model and reports where its matrices were written.
pub trait TopicModelTrainer {
    fn train(
        &self,
        inputs: &TrainingInputs,
        params: &TrainingParams,
        output_dir: &Path,
    ) -> Result<ModelFiles>;
}
