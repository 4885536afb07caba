// Colored terminal output for topics, alignments, and stability reports.

use colored::Colorize;

use super::{score_bar, truncate_chars};
use crate::alignment::Alignment;
use crate::model::TopicModel;
use crate::scoring::StabilityReport;

/// Print each topic's top `n` words, one topic per line.
pub fn display_top_words(model: &TopicModel, n: usize) {
    println!(
        "\n{}",
        format!(
            "=== Top {} words for {} ({} topics) ===",
            n,
            model.label(),
            model.num_topics()
        )
        .bold()
    );
    println!();

    for (k, words) in model.top_words(n).iter().enumerate() {
        println!("  {:>3}. {}", k, words.join(" "));
    }
}

/// Print matched topic pairs side by side with their top words.
pub fn display_alignment(a: &TopicModel, b: &TopicModel, alignment: &Alignment, n: usize) {
    let top_a = a.top_words(n);
    let top_b = b.top_words(n);

    println!(
        "\n{}",
        format!("=== Topic alignment ({} pairs) ===", alignment.len()).bold()
    );
    println!();
    println!(
        "  {:>4} {:>4}  {:>6}  {}",
        "A".dimmed(),
        "B".dimmed(),
        "Sim".dimmed(),
        "Top words (A / B)".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for (i, j) in alignment.pairs() {
        let sim = alignment
            .matched_similarity(i)
            .map(|s| format!("{s:.3}"))
            .unwrap_or_else(|| "-".to_string());
        let moved = if i == j {
            format!("{j:>4}").normal()
        } else {
            format!("{j:>4}").yellow()
        };
        println!(
            "  {:>4} {}  {:>6}  {}",
            i,
            moved,
            sim,
            truncate_chars(&top_a[i].join(" "), 60)
        );
        println!(
            "  {:>4} {:>4}  {:>6}  {}",
            "",
            "",
            "",
            truncate_chars(&top_b[j].join(" "), 60).dimmed()
        );
    }
}

/// Print the four stability scores as bars.
pub fn display_report(report: &StabilityReport) {
    println!(
        "\n{}",
        format!(
            "=== Stability: {} vs {} ({} topics, {} documents) ===",
            report.model_a, report.model_b, report.num_topics, report.num_docs
        )
        .bold()
    );
    println!(
        "  {}",
        format!(
            "measure: {}  basis: {}  strategy: {}  top-N: {}",
            report.options.measure,
            report.options.basis,
            report.options.strategy,
            report.options.top_n
        )
        .dimmed()
    );
    println!();

    let rows = [
        ("Doc-topic (theta)", report.theta_stability),
        ("Doc label", report.doc_stability),
        ("Topic-word (phi)", report.phi_stability),
        ("Top words", report.topwords_stability),
    ];

    for (name, value) in rows {
        println!("  {:<20} {} {:.3}", name, colorize_bar(value), value);
    }

    if !report.alignment.is_identity() {
        let moved = report.alignment.pairs().filter(|(i, j)| i != j).count();
        println!(
            "\n  {} {} of {} topics changed index after alignment",
            "~".yellow(),
            moved,
            report.num_topics
        );
    }
}

/// Color a score bar by how stable the value is.
fn colorize_bar(value: f64) -> colored::ColoredString {
    let bar = score_bar(value, 20);
    if value >= 0.8 {
        bar.bright_green()
    } else if value >= 0.5 {
        bar.bright_yellow()
    } else {
        bar.bright_red()
    }
}
