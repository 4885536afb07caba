use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use topic_stability::alignment::AssignmentStrategy;
use topic_stability::config::Config;
use topic_stability::model::{load_model, ModelFiles, TopicModel};
use topic_stability::output::terminal;
use topic_stability::scoring::{evaluate, ScoringOptions};
use topic_stability::similarity::{AlignmentBasis, SimilarityMeasure};
use topic_stability::trainer::{ExternalSampler, TopicModelTrainer, TrainingInputs, TrainingParams};

/// topic-stability: do two topic model runs find the same topics?
///
/// Aligns the topics of two trained models over the same corpus and reports
/// document-level, distribution-level, and top-word stability.
#[derive(Parser)]
#[command(name = "topic-stability", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// The shared corpus both models were trained on.
#[derive(Args)]
struct CorpusArgs {
    /// Tokenized corpus, one document per line
    #[arg(long)]
    corpus: PathBuf,

    /// Vocabulary, one word per line
    #[arg(long)]
    vocab: PathBuf,

    /// Number of topics in each model
    #[arg(long, default_value = "10")]
    num_topics: usize,
}

/// Overrides for the scoring configuration.
#[derive(Args)]
struct ScoringArgs {
    /// Top words compared per topic
    #[arg(long)]
    top_n: Option<usize>,

    /// Row similarity measure: cosine or total-variation
    #[arg(long)]
    measure: Option<SimilarityMeasure>,

    /// Match topics on topic-words or document-clusters
    #[arg(long)]
    basis: Option<AlignmentBasis>,

    /// Assignment algorithm: exact or greedy
    #[arg(long)]
    strategy: Option<AssignmentStrategy>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl ScoringArgs {
    fn options(&self, config: &Config) -> ScoringOptions {
        let mut options = config.scoring_options();
        if let Some(top_n) = self.top_n {
            options.top_n = top_n;
        }
        if let Some(measure) = self.measure {
            options.measure = measure;
        }
        if let Some(basis) = self.basis {
            options.basis = basis;
        }
        if let Some(strategy) = self.strategy {
            options.strategy = strategy;
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Align two trained models and report their stability
    Compare {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Output directory of the first model (theta.dat, phi.dat)
        #[arg(long)]
        model_a: PathBuf,

        /// Output directory of the second model (theta.dat, phi.dat)
        #[arg(long)]
        model_b: PathBuf,

        #[command(flatten)]
        scoring: ScoringArgs,
    },

    /// Show the top words of each topic in one model
    TopWords {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Output directory of the model (theta.dat, phi.dat)
        #[arg(long)]
        model: PathBuf,

        /// Words per topic (default: 10)
        #[arg(short, long, default_value = "10")]
        n: usize,
    },

    /// Train two models with different seeds, then compare them
    Experiment {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Directory for both runs' outputs (model1/, model2/)
        #[arg(long, default_value = "output")]
        output: PathBuf,

        /// Vocabulary size passed to the sampler
        #[arg(long, default_value = "5000")]
        num_words: usize,

        #[arg(long, default_value = "1")]
        alpha: f64,

        #[arg(long, default_value = "0.01")]
        beta: f64,

        #[arg(long, default_value = "1000")]
        eta: f64,

        #[arg(long, default_value = "5")]
        epochs: u32,

        /// Seed for the first run
        #[arg(long, default_value = "42")]
        seed_a: u64,

        /// Seed for the second run
        #[arg(long, default_value = "24")]
        seed_b: u64,

        /// Word-cluster file from preprocessing, passed to the sampler
        #[arg(long)]
        word_clusters: Option<PathBuf>,

        /// Initial topic samples from preprocessing, passed to the sampler
        #[arg(long)]
        initial_samples: Option<PathBuf>,

        #[command(flatten)]
        scoring: ScoringArgs,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topic_stability=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Compare {
            corpus,
            model_a,
            model_b,
            scoring,
        } => {
            let a = load(&corpus, "model A", &model_a, &config)?;
            let b = load(&corpus, "model B", &model_b, &config)?;
            compare(&a, &b, &scoring, &config)?;
        }

        Commands::TopWords { corpus, model, n } => {
            let label = model.display().to_string();
            let model = load(&corpus, &label, &model, &config)?;
            terminal::display_top_words(&model, n);
            if let Some(perplexity) = model.perplexity() {
                println!("\n  Perplexity: {perplexity:.2}");
            }
        }

        Commands::Experiment {
            corpus,
            output,
            num_words,
            alpha,
            beta,
            eta,
            epochs,
            seed_a,
            seed_b,
            word_clusters,
            initial_samples,
            scoring,
        } => {
            let sampler = ExternalSampler {
                binary: config.sampler.clone(),
                show_progress: true,
            };
            let inputs = TrainingInputs {
                corpus: corpus.corpus.clone(),
                vocab: corpus.vocab.clone(),
                word_clusters,
                initial_samples,
            };

            let mut models = Vec::with_capacity(2);
            for (run, seed) in [("model1", seed_a), ("model2", seed_b)] {
                let params = TrainingParams {
                    num_topics: corpus.num_topics,
                    num_words,
                    alpha,
                    beta,
                    eta,
                    epochs,
                    seed,
                };
                println!("Training {run} (seed {seed})...");
                let dir = output.join(run);
                sampler.train(&inputs, &params, &dir)?;

                let model = load(&corpus, run, &dir, &config)?;
                terminal::display_top_words(&model, 10);
                models.push(model);
            }

            compare(&models[0], &models[1], &scoring, &config)?;
        }
    }

    Ok(())
}

fn load(corpus: &CorpusArgs, label: &str, dir: &Path, config: &Config) -> Result<TopicModel> {
    load_model(
        label,
        corpus.num_topics,
        &corpus.corpus,
        &corpus.vocab,
        &ModelFiles::in_dir(dir),
        config.tolerance,
    )
}

fn compare(a: &TopicModel, b: &TopicModel, scoring: &ScoringArgs, config: &Config) -> Result<()> {
    let options = scoring.options(config);
    info!(?options, "Comparing topic models");

    let report = evaluate(a, b, &options)?;

    if scoring.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    terminal::display_alignment(a, b, &report.alignment, options.top_n);
    terminal::display_report(&report);
    println!("\n{}", "Done.".bold());
    Ok(())
}
