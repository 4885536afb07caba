// External sampler: runs the compiled training binary as a subprocess.
//
// The binary takes short getopt-style flags and writes theta.dat and phi.dat
// into its output directory. Nothing about the sampler's internals is
// assumed beyond that contract.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use super::traits::{TopicModelTrainer, TrainingInputs, TrainingParams};
use crate::model::ModelFiles;

/// Default sampler binary location.
pub const DEFAULT_SAMPLER: &str = "./train";

/// Runs the external sampler binary.
#[derive(Debug, Clone)]
pub struct ExternalSampler {
    pub binary: PathBuf,
    /// Show a spinner while the sampler runs.
    pub show_progress: bool,
}

impl ExternalSampler {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            show_progress: false,
        }
    }

    /// Command-line arguments for one training run.
    pub fn args(
        &self,
        inputs: &TrainingInputs,
        params: &TrainingParams,
        output_dir: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        let mut push = |flag: &str, value: OsString| {
            args.push(flag.into());
            args.push(value);
        };

        push("-f", inputs.corpus.clone().into_os_string());
        push("-v", inputs.vocab.clone().into_os_string());
        if let Some(clusters) = &inputs.word_clusters {
            push("-c", clusters.clone().into_os_string());
        }
        if let Some(samples) = &inputs.initial_samples {
            push("-z", samples.clone().into_os_string());
        }
        push("-t", params.num_topics.to_string().into());
        push("-w", params.num_words.to_string().into());
        push("-a", params.alpha.to_string().into());
        push("-b", params.beta.to_string().into());
        push("-e", params.eta.to_string().into());
        push("-n", params.epochs.to_string().into());
        push("-r", params.seed.to_string().into());
        push("-o", output_dir.as_os_str().to_os_string());

        args
    }
}

impl Default for ExternalSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLER)
    }
}

impl TopicModelTrainer for ExternalSampler {
    fn train(
        &self,
        inputs: &TrainingInputs,
        params: &TrainingParams,
        output_dir: &Path,
    ) -> Result<ModelFiles> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

        let args = self.args(inputs, params, output_dir);
        debug!(binary = %self.binary.display(), ?args, "Running sampler");
        info!(
            topics = params.num_topics,
            epochs = params.epochs,
            seed = params.seed,
            output = %output_dir.display(),
            "Training topic model"
        );

        let spinner = if self.show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("  {spinner} {msg} [{elapsed}]")
                    .expect("valid template"),
            );
            pb.set_message(format!("Training (seed {})", params.seed));
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .with_context(|| format!("Failed to run sampler {}", self.binary.display()));

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "Sampler {} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            );
        }

        let files = ModelFiles::in_dir(output_dir);
        if !files.exist() {
            anyhow::bail!(
                "Sampler finished but {} or {} is missing",
                files.theta.display(),
                files.phi.display()
            );
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_include_all_hyperparameters() {
        let sampler = ExternalSampler::default();
        let inputs = TrainingInputs::new("data/corpus.bow", "data/corpus.vocab");
        let params = TrainingParams::default();
        let args: Vec<String> = sampler
            .args(&inputs, &params, Path::new("out/model1"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "-f", "data/corpus.bow", "-v", "data/corpus.vocab", "-t", "10", "-w", "5000",
                "-a", "1", "-b", "0.01", "-e", "1000", "-n", "5", "-r", "42", "-o", "out/model1",
            ]
        );
    }

    #[test]
    fn test_args_pass_optional_inputs() {
        let sampler = ExternalSampler::default();
        let mut inputs = TrainingInputs::new("c.bow", "c.vocab");
        inputs.word_clusters = Some("clusters.txt".into());
        inputs.initial_samples = Some("z.txt".into());
        let args: Vec<String> = sampler
            .args(&inputs, &TrainingParams::default(), Path::new("out"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        let pos = args.iter().position(|a| a == "-c").unwrap();
        assert_eq!(args[pos + 1], "clusters.txt");
        let pos = args.iter().position(|a| a == "-z").unwrap();
        assert_eq!(args[pos + 1], "z.txt");
    }

    #[test]
    fn test_missing_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sampler = ExternalSampler::new(dir.path().join("no-such-sampler"));
        let inputs = TrainingInputs::new("c.bow", "c.vocab");
        let err = sampler
            .train(&inputs, &TrainingParams::default(), &dir.path().join("out"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to run sampler"), "got: {err}");
    }
}
