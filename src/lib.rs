// topic-stability: align two trained topic models and score how stable
// their topics are.
//
// This is the library root. Data flows model -> similarity -> alignment ->
// scoring; trainer and output are the glue around that core.

pub mod alignment;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod scoring;
pub mod similarity;
pub mod trainer;

pub use alignment::{Alignment, AssignmentStrategy, TopicAligner};
pub use error::{Result, StabilityError};
pub use model::TopicModel;
pub use scoring::{evaluate, ScoringOptions, StabilityReport};
pub use similarity::{AlignmentBasis, SimilarityMatrix, SimilarityMeasure};
