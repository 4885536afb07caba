use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::alignment::AssignmentStrategy;
use crate::model::DEFAULT_TOLERANCE;
use crate::scoring::stability::DEFAULT_TOP_N;
use crate::scoring::ScoringOptions;
use crate::similarity::{AlignmentBasis, SimilarityMeasure};
use crate::trainer::sampler::DEFAULT_SAMPLER;

/// Central configuration loaded from environment variables.
///
/// Every setting has a default; the .env file is loaded at startup via
/// dotenvy. Command-line flags override these values.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Top words compared per topic (TOPIC_STABILITY_TOP_N)
    pub top_n: usize,
    /// Allowed |row_sum - 1| for theta/phi rows (TOPIC_STABILITY_TOLERANCE)
    pub tolerance: f64,
    /// Row similarity measure (TOPIC_STABILITY_MEASURE)
    pub measure: SimilarityMeasure,
    /// What topics are matched on (TOPIC_STABILITY_BASIS)
    pub basis: AlignmentBasis,
    /// Assignment algorithm (TOPIC_STABILITY_STRATEGY)
    pub strategy: AssignmentStrategy,
    /// Path to the compiled sampler binary (TOPIC_STABILITY_SAMPLER)
    pub sampler: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            tolerance: DEFAULT_TOLERANCE,
            measure: SimilarityMeasure::default(),
            basis: AlignmentBasis::default(),
            strategy: AssignmentStrategy::default(),
            sampler: PathBuf::from(DEFAULT_SAMPLER),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Separated from `load` so tests don't have to mutate the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let top_n = parse_var(&lookup, "TOPIC_STABILITY_TOP_N")?.unwrap_or(defaults.top_n);
        if top_n == 0 {
            anyhow::bail!("TOPIC_STABILITY_TOP_N must be at least 1");
        }

        let tolerance =
            parse_var(&lookup, "TOPIC_STABILITY_TOLERANCE")?.unwrap_or(defaults.tolerance);
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            anyhow::bail!("TOPIC_STABILITY_TOLERANCE must be a non-negative number, got {tolerance}");
        }

        Ok(Self {
            top_n,
            tolerance,
            measure: parse_var(&lookup, "TOPIC_STABILITY_MEASURE")?.unwrap_or(defaults.measure),
            basis: parse_var(&lookup, "TOPIC_STABILITY_BASIS")?.unwrap_or(defaults.basis),
            strategy: parse_var(&lookup, "TOPIC_STABILITY_STRATEGY")?
                .unwrap_or(defaults.strategy),
            sampler: lookup("TOPIC_STABILITY_SAMPLER")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.sampler),
        })
    }

    /// Scoring options derived from this configuration.
    pub fn scoring_options(&self) -> ScoringOptions {
        ScoringOptions {
            top_n: self.top_n,
            measure: self.measure,
            basis: self.basis,
            strategy: self.strategy,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid value for {key}: '{raw}'")),
        _ => Ok(None),
    }
}
