// Error types for the alignment and scoring core.
//
// The core only fails on malformed inputs: a model whose matrices don't fit
// its corpus, or a pair of models that can't be compared. File and process
// glue (loader, trainer, CLI) wraps these in anyhow with path context.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, StabilityError>;

/// Errors raised while building or comparing topic models.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StabilityError {
    /// A matrix is inconsistent with its docs/vocab, or a row is not a
    /// probability distribution.
    #[error("shape mismatch in {model}: {detail}")]
    ShapeMismatch { model: String, detail: String },

    /// The two models (or a model and an alignment) disagree on topic count.
    #[error("dimension mismatch: {left} topics vs {right} topics")]
    DimensionMismatch { left: usize, right: usize },

    /// A scoring parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl StabilityError {
    pub(crate) fn shape(model: &str, detail: impl Into<String>) -> Self {
        StabilityError::ShapeMismatch {
            model: model.to_string(),
            detail: detail.into(),
        }
    }
}
