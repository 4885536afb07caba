// Composition tests: the full path from files on disk to a report.
//
// These tests exercise the data flow between modules:
//   loader -> TopicModel -> similarity -> alignment -> scoring -> JSON
// using temporary directories for the model output files.

use std::fs;
use std::path::Path;

use topic_stability::config::Config;
use topic_stability::model::{load_model, ModelFiles, DEFAULT_TOLERANCE};
use topic_stability::scoring::evaluate;

const VOCAB: &str = "market\nprice\nstock\ngame\nteam\nscore\n";
const CORPUS: &str = "market price stock\ngame team score\nprice stock stock\nteam score game\n";

// Model A: topic 0 = finance, topic 1 = sports
const THETA_A: &str = "0.9 0.1\n0.1 0.9\n0.8 0.2\n0.2 0.8\n";
const PHI_A: &str = "0.4 0.3 0.2 0.05 0.03 0.02\n0.02 0.03 0.05 0.3 0.3 0.3\n";

// Model B: same topics with the indices swapped and slightly different mass
const THETA_B: &str = "0.15 0.85\n0.88 0.12\n0.25 0.75\n0.7 0.3\n";
const PHI_B: &str = "0.03 0.02 0.05 0.3 0.35 0.25\n0.35 0.35 0.2 0.04 0.03 0.03\n";

fn write_model(dir: &Path, theta: &str, phi: &str) -> ModelFiles {
    fs::create_dir_all(dir).unwrap();
    let files = ModelFiles::in_dir(dir);
    fs::write(&files.theta, theta).unwrap();
    fs::write(&files.phi, phi).unwrap();
    files
}

#[test]
fn loads_aligns_and_scores_swapped_models() {
    let tmp = tempfile::tempdir().unwrap();
    let corpus = tmp.path().join("corpus.bow");
    let vocab = tmp.path().join("corpus.vocab");
    fs::write(&corpus, CORPUS).unwrap();
    fs::write(&vocab, VOCAB).unwrap();

    let files_a = write_model(&tmp.path().join("model1"), THETA_A, PHI_A);
    let files_b = write_model(&tmp.path().join("model2"), THETA_B, PHI_B);
    assert!(files_a.exist() && files_b.exist());

    let a = load_model("model1", 2, &corpus, &vocab, &files_a, DEFAULT_TOLERANCE).unwrap();
    let b = load_model("model2", 2, &corpus, &vocab, &files_b, DEFAULT_TOLERANCE).unwrap();
    assert_eq!(a.num_docs(), 4);
    assert_eq!(a.docs()[0], vec![0, 1, 2]);

    let options = Config::default().scoring_options();
    let report = evaluate(&a, &b, &options).unwrap();

    assert_eq!(report.alignment.forward(), &[1, 0]);
    assert!(report.phi_stability > 0.95, "phi {}", report.phi_stability);
    assert!(report.theta_stability > 0.9, "theta {}", report.theta_stability);
    assert_eq!(report.doc_stability, 1.0);
    // Top-10 clamps to the 6-word vocabulary, so every topic shares all words
    assert_eq!(report.topwords_stability, 1.0);

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["alignment"]["forward"], serde_json::json!([1, 0]));
    assert_eq!(json["options"]["measure"], "cosine");
    assert_eq!(json["model_a"], "model1");
}

#[test]
fn top_three_words_follow_phi() {
    let tmp = tempfile::tempdir().unwrap();
    let corpus = tmp.path().join("corpus.bow");
    let vocab = tmp.path().join("corpus.vocab");
    fs::write(&corpus, CORPUS).unwrap();
    fs::write(&vocab, VOCAB).unwrap();
    let files = write_model(&tmp.path().join("model1"), THETA_A, PHI_A);

    let model = load_model("model1", 2, &corpus, &vocab, &files, DEFAULT_TOLERANCE).unwrap();
    let top = model.top_words(3);
    assert_eq!(top[0], vec!["market", "price", "stock"]);
    // 0.3 three-way tie in topic 1 breaks by vocabulary order
    assert_eq!(top[1], vec!["game", "team", "score"]);
}

#[test]
fn wrong_topic_count_is_reported_with_file_context() {
    let tmp = tempfile::tempdir().unwrap();
    let corpus = tmp.path().join("corpus.bow");
    let vocab = tmp.path().join("corpus.vocab");
    fs::write(&corpus, CORPUS).unwrap();
    fs::write(&vocab, VOCAB).unwrap();
    let files = write_model(&tmp.path().join("model1"), THETA_A, PHI_A);

    let err = load_model("model1", 3, &corpus, &vocab, &files, DEFAULT_TOLERANCE).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("theta.dat"), "got: {msg}");
    assert!(msg.contains("shape mismatch"), "got: {msg}");
}

#[test]
fn missing_matrix_file_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let corpus = tmp.path().join("corpus.bow");
    let vocab = tmp.path().join("corpus.vocab");
    fs::write(&corpus, CORPUS).unwrap();
    fs::write(&vocab, VOCAB).unwrap();

    let files = ModelFiles::in_dir(&tmp.path().join("nowhere"));
    assert!(!files.exist());
    let err = load_model("ghost", 2, &corpus, &vocab, &files, DEFAULT_TOLERANCE).unwrap_err();
    assert!(err.to_string().contains("Failed to read"), "got: {err}");
}
