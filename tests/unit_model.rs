// Unit tests for TopicModel construction and derived queries.
//
// Tests the shape and probability-row validation at construction, the
// deterministic tie-breaking of top words and dominant topics, and
// re-expressing a model in another model's topic order.

use topic_stability::alignment::Alignment;
use topic_stability::error::StabilityError;
use topic_stability::model::{TopicModel, DEFAULT_TOLERANCE};

fn vocab(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn assert_shape_mismatch(result: Result<TopicModel, StabilityError>, needle: &str) {
    match result {
        Err(StabilityError::ShapeMismatch { detail, .. }) => {
            assert!(detail.contains(needle), "expected '{needle}' in '{detail}'")
        }
        other => panic!("expected ShapeMismatch, got {other:?}"),
    }
}

// ============================================================
// Construction: shape validation
// ============================================================

#[test]
fn theta_rows_must_match_documents() {
    let result = TopicModel::new(
        "m",
        1,
        vec![vec![1.0]],
        vec![vec![1.0]],
        vec![vec![0], vec![0]],
        vocab(&["a"]),
    );
    assert_shape_mismatch(result, "theta has 1 rows");
}

#[test]
fn phi_columns_must_match_vocabulary() {
    let result = TopicModel::new(
        "m",
        1,
        vec![],
        vec![vec![0.5, 0.5]],
        vec![],
        vocab(&["a", "b", "c"]),
    );
    assert_shape_mismatch(result, "phi row 0 has 2 columns");
}

#[test]
fn theta_columns_must_match_topic_count() {
    let result = TopicModel::new(
        "m",
        2,
        vec![vec![1.0]],
        vec![vec![1.0], vec![1.0]],
        vec![vec![]],
        vocab(&["a"]),
    );
    assert_shape_mismatch(result, "theta row 0 has 1 columns");
}

#[test]
fn phi_rows_must_match_topic_count() {
    let result = TopicModel::new("m", 3, vec![], vec![vec![1.0]], vec![], vocab(&["a"]));
    assert_shape_mismatch(result, "expected 3 topics");
}

#[test]
fn zero_topics_rejected() {
    let result = TopicModel::new("m", 0, vec![], vec![], vec![], vocab(&["a"]));
    assert_shape_mismatch(result, "must be positive");
}

#[test]
fn error_names_the_model() {
    let err = TopicModel::new("run-42", 3, vec![], vec![vec![1.0]], vec![], vocab(&["a"]))
        .unwrap_err();
    assert!(err.to_string().contains("run-42"), "got: {err}");
}

// ============================================================
// Construction: probability rows
// ============================================================

#[test]
fn row_sum_within_tolerance_accepted() {
    let model = TopicModel::new(
        "m",
        1,
        vec![],
        vec![vec![0.5, 0.4995]],
        vec![],
        vocab(&["a", "b"]),
    );
    assert!(model.is_ok(), "deviation 5e-4 is within {DEFAULT_TOLERANCE}");
}

#[test]
fn row_sum_beyond_tolerance_rejected() {
    let result = TopicModel::new(
        "m",
        1,
        vec![],
        vec![vec![0.5, 0.498]],
        vec![],
        vocab(&["a", "b"]),
    );
    assert_shape_mismatch(result, "phi row 0 sums to");
}

#[test]
fn theta_row_sum_checked_too() {
    let result = TopicModel::new(
        "m",
        2,
        vec![vec![0.6, 0.6]],
        vec![vec![1.0], vec![1.0]],
        vec![vec![]],
        vocab(&["a"]),
    );
    assert_shape_mismatch(result, "theta row 0 sums to");
}

#[test]
fn custom_tolerance_is_respected() {
    let loose = TopicModel::with_tolerance(
        "m",
        1,
        vec![],
        vec![vec![0.5, 0.45]],
        vec![],
        vocab(&["a", "b"]),
        0.1,
    );
    assert!(loose.is_ok());
}

// ============================================================
// Derived queries
// ============================================================

#[test]
fn top_words_are_deterministic_under_ties() {
    let model = TopicModel::new(
        "m",
        1,
        vec![],
        vec![vec![0.25, 0.25, 0.25, 0.25]],
        vec![],
        vocab(&["d", "c", "b", "a"]),
    )
    .unwrap();
    assert_eq!(model.top_words(3), vec![vec!["d", "c", "b"]]);
    assert_eq!(model.top_word_ids(3), vec![vec![0, 1, 2]]);
}

#[test]
fn top_words_clamped_to_vocab_size() {
    let model = TopicModel::new("m", 1, vec![], vec![vec![0.3, 0.7]], vec![], vocab(&["a", "b"]))
        .unwrap();
    assert_eq!(model.top_words(10), vec![vec!["b", "a"]]);
}

#[test]
fn doc_labels_follow_theta() {
    let model = TopicModel::new(
        "m",
        3,
        vec![vec![0.2, 0.5, 0.3], vec![0.4, 0.2, 0.4], vec![0.0, 0.0, 1.0]],
        vec![vec![1.0], vec![1.0], vec![1.0]],
        vec![vec![0], vec![], vec![0, 0]],
        vocab(&["a"]),
    )
    .unwrap();
    assert_eq!(model.doc_labels(), vec![1, 0, 2]);
}

#[test]
fn permuted_moves_theta_columns_and_phi_rows() {
    let model = TopicModel::new(
        "m",
        2,
        vec![vec![0.9, 0.1]],
        vec![vec![0.8, 0.2], vec![0.3, 0.7]],
        vec![vec![0, 1]],
        vocab(&["a", "b"]),
    )
    .unwrap();
    let swap = Alignment::from_permutation(vec![1, 0]).unwrap();
    let moved = model.permuted(&swap).unwrap();

    assert_eq!(moved.theta()[0], vec![0.1, 0.9]);
    assert_eq!(moved.phi()[0], vec![0.3, 0.7]);
    assert_eq!(moved.phi()[1], vec![0.8, 0.2]);
    assert_eq!(moved.dominant_topic(0), Some(1));

    // Permuting back restores the original
    let back = moved.permuted(&swap).unwrap();
    assert_eq!(back.theta(), model.theta());
    assert_eq!(back.phi(), model.phi());
}

#[test]
fn permuted_rejects_wrong_size_alignment() {
    let model = TopicModel::new("m", 1, vec![], vec![vec![1.0]], vec![], vocab(&["a"])).unwrap();
    let err = model.permuted(&Alignment::identity(2)).unwrap_err();
    assert_eq!(err, StabilityError::DimensionMismatch { left: 1, right: 2 });
}
