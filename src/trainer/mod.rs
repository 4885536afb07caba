// Model training collaborator: trait plus the external sampler runner.

pub mod sampler;
pub mod traits;

pub use sampler::ExternalSampler;
pub use traits::{TopicModelTrainer, TrainingInputs, TrainingParams};
