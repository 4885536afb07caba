// Stability scoring: the four agreement metrics and the combined report.

pub mod report;
pub mod stability;

pub use report::{evaluate, ScoringOptions, StabilityReport};
pub use stability::{
    doc_stability, phi_stability, theta_stability, topwords_stability, MetricDetail,
    StabilityScorer,
};
