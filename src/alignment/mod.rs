// Topic alignment: optimal one-to-one matching between two models' topics.

pub mod aligner;
pub mod assignment;

pub use aligner::{Alignment, TopicAligner};
pub use assignment::AssignmentStrategy;
