// Output formatting: terminal display of topics and stability reports.

pub mod terminal;

/// Shorten a joined top-word list to `max_chars` characters for the
/// alignment table, marking the cut with "...".
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Render a value in [0, 1] as a fixed-width bar like `[=====     ]`.
///
/// Values outside the range are clamped.
pub fn score_bar(value: f64, width: usize) -> String {
    let filled = (value.clamp(0.0, 1.0) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "=".repeat(filled), " ".repeat(empty))
}
