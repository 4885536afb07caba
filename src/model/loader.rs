// Loading trained model outputs from disk.
//
// The sampler writes two dense text matrices per run (theta.dat, phi.dat):
// one row per line, whitespace-separated floats. The corpus (.bow) has one
// document per line as whitespace-separated tokens, and the vocabulary file
// has one word per line, where line order is the word id.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::topic_model::TopicModel;

/// File name of the document-topic matrix inside a model output directory.
pub const THETA_FILE: &str = "theta.dat";
/// File name of the topic-word matrix inside a model output directory.
pub const PHI_FILE: &str = "phi.dat";

/// Paths of one model run's output matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub theta: PathBuf,
    pub phi: PathBuf,
}

impl ModelFiles {
    /// The conventional `theta.dat` / `phi.dat` pair inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            theta: dir.join(THETA_FILE),
            phi: dir.join(PHI_FILE),
        }
    }

    pub fn exist(&self) -> bool {
        self.theta.is_file() && self.phi.is_file()
    }
}

/// Parse a vocabulary: one word per line.
///
/// Line position defines the word id, so words must be distinct and a blank
/// line is an error. Blank lines after the last word are ignored.
pub fn parse_vocab(text: &str) -> Result<Vec<String>> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut vocab = Vec::new();

    let lines: Vec<&str> = text.lines().collect();
    let used = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(0, |last| last + 1);

    for (line_no, line) in lines[..used].iter().enumerate() {
        let word = line.trim();
        if word.is_empty() {
            anyhow::bail!("blank vocabulary line {} (word id {})", line_no + 1, vocab.len());
        }
        if let Some(first) = seen.insert(word, line_no + 1) {
            anyhow::bail!(
                "duplicate vocabulary word '{word}' on line {} (first seen on line {first})",
                line_no + 1
            );
        }
        vocab.push(word.to_string());
    }

    Ok(vocab)
}

/// Parse a corpus into token-id sequences, one document per line.
///
/// Every line is a document (an empty line is an empty document) so that
/// document order stays parallel with theta rows.
pub fn parse_docs(text: &str, vocab: &[String]) -> Result<Vec<Vec<usize>>> {
    let word_ids: HashMap<&str, usize> = vocab
        .iter()
        .enumerate()
        .map(|(id, word)| (word.as_str(), id))
        .collect();

    text.lines()
        .enumerate()
        .map(|(line_no, line)| {
            line.split_whitespace()
                .map(|token| {
                    word_ids.get(token).copied().with_context(|| {
                        format!("unknown token '{token}' in document {}", line_no + 1)
                    })
                })
                .collect::<Result<Vec<usize>>>()
        })
        .collect()
}

/// Parse a dense matrix: one row per line, whitespace-separated floats.
/// Blank lines are skipped.
pub fn parse_matrix(text: &str) -> Result<Vec<Vec<f64>>> {
    let mut rows = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .enumerate()
            .map(|(col, field)| {
                field.parse::<f64>().with_context(|| {
                    format!(
                        "invalid number '{field}' at line {}, column {}",
                        line_no + 1,
                        col + 1
                    )
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    Ok(rows)
}

pub fn read_vocab(path: &Path) -> Result<Vec<String>> {
    let text = read_text(path)?;
    parse_vocab(&text).with_context(|| format!("Failed to parse vocabulary {}", path.display()))
}

pub fn read_docs(path: &Path, vocab: &[String]) -> Result<Vec<Vec<usize>>> {
    let text = read_text(path)?;
    parse_docs(&text, vocab).with_context(|| format!("Failed to parse corpus {}", path.display()))
}

pub fn read_matrix(path: &Path) -> Result<Vec<Vec<f64>>> {
    let text = read_text(path)?;
    parse_matrix(&text).with_context(|| format!("Failed to parse matrix {}", path.display()))
}

/// Load one trained model from its output matrices plus the shared corpus
/// and vocabulary.
pub fn load_model(
    label: &str,
    num_topics: usize,
    corpus: &Path,
    vocab_path: &Path,
    files: &ModelFiles,
    tolerance: f64,
) -> Result<TopicModel> {
    let vocab = read_vocab(vocab_path)?;
    let docs = read_docs(corpus, &vocab)?;
    let theta = read_matrix(&files.theta)?;
    let phi = read_matrix(&files.phi)?;

    debug!(
        model = label,
        docs = docs.len(),
        vocab = vocab.len(),
        theta_rows = theta.len(),
        phi_rows = phi.len(),
        "Read model files"
    );

    let model = TopicModel::with_tolerance(label, num_topics, theta, phi, docs, vocab, tolerance)
        .with_context(|| {
            format!(
                "Model {label} ({}, {}) does not match its corpus",
                files.theta.display(),
                files.phi.display()
            )
        })?;

    info!(
        model = label,
        topics = model.num_topics(),
        docs = model.num_docs(),
        vocab = model.vocab_size(),
        "Loaded topic model"
    );

    Ok(model)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matrix_skips_blank_lines() {
        let m = parse_matrix("0.5 0.5\n\n1 0\n").unwrap();
        assert_eq!(m, vec![vec![0.5, 0.5], vec![1.0, 0.0]]);
    }

    #[test]
    fn test_parse_matrix_reports_position() {
        let err = parse_matrix("0.5 0.5\n0.1 x\n").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("line 2, column 2"), "got: {msg}");
    }

    #[test]
    fn test_parse_vocab_rejects_duplicates() {
        let err = parse_vocab("apple\nbanana\napple\n").unwrap_err();
        assert!(err.to_string().contains("duplicate"), "got: {err}");
    }

    #[test]
    fn test_parse_vocab_rejects_blank_line() {
        let err = parse_vocab("apple\n\nbanana\n").unwrap_err();
        assert!(err.to_string().contains("blank vocabulary line 2"), "got: {err}");
    }

    #[test]
    fn test_parse_vocab_allows_trailing_blank_lines() {
        let vocab = parse_vocab("apple\nbanana\n\n\n").unwrap();
        assert_eq!(vocab, vec!["apple", "banana"]);
    }

    #[test]
    fn test_parse_docs_maps_ids() {
        let vocab = parse_vocab("apple\nbanana\ncherry\n").unwrap();
        let docs = parse_docs("cherry apple\n\nbanana banana\n", &vocab).unwrap();
        assert_eq!(docs, vec![vec![2, 0], vec![], vec![1, 1]]);
    }

    #[test]
    fn test_parse_docs_unknown_token() {
        let vocab = parse_vocab("apple\n").unwrap();
        let err = parse_docs("apple pear\n", &vocab).unwrap_err();
        assert!(err.to_string().contains("pear"), "got: {err}");
    }
}
