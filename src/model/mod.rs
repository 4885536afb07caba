// Topic models: validated in-memory representation and on-disk loading.

pub mod loader;
pub mod topic_model;

pub use loader::{load_model, ModelFiles};
pub use topic_model::{TopicModel, DEFAULT_TOLERANCE};
