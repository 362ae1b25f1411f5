// Colored terminal output for detection results.
//
// The corpus report gets a horizontal bar per stored document, one row per
// document index, so the closest matches stand out at a glance.

use colored::{ColoredString, Colorize};

use crate::similarity::detection::{CorpusReport, PairReport};

const BAR_WIDTH: usize = 30;
const PREVIEW_CHARS: usize = 48;

/// Display the result of checking a text against the stored corpus.
pub fn display_corpus_report(report: &CorpusReport) {
    if report.matches.is_empty() {
        println!("No documents stored yet. Run `verbatim add` first.");
        return;
    }

    println!(
        "\n{}",
        format!(
            "=== Similarity against {} stored documents ===",
            report.matches.len()
        )
        .bold()
    );
    println!();

    println!(
        "  {:>5}  {:<width$}  {:>6}  {}",
        "Doc".dimmed(),
        "Score bar".dimmed(),
        "Score".dimmed(),
        "Preview".dimmed(),
        width = BAR_WIDTH + 2,
    );
    println!("  {}", "-".repeat(100).dimmed());

    for (i, m) in report.matches.iter().enumerate() {
        println!(
            "  {:>5}  {}  {:>6.3}  {}",
            i,
            score_bar(m.score),
            m.score,
            super::preview(&m.text, PREVIEW_CHARS).dimmed(),
        );
    }

    if let Some(best) = report.best_match() {
        println!(
            "\n  Closest match: {} ({:.1}%)",
            super::preview(&best.text, PREVIEW_CHARS),
            best.score * 100.0
        );
    }

    println!("\n{}", "Top shared terms:".bold());
    if report.top_common_terms.is_empty() {
        println!("  (none)");
    }
    for term in &report.top_common_terms {
        println!("  {:<24} {:.4}", term.term, term.score);
    }
}

/// Display the result of comparing two texts directly.
pub fn display_pair_report(report: &PairReport) {
    let percent = report.similarity_percent();
    println!(
        "\n{} {}",
        "Similarity:".bold(),
        colorize_score(report.similarity, format!("{percent:.1}%"))
    );
    println!("  {}", score_bar(report.similarity));

    println!("\n{}", "Top shared terms:".bold());
    if report.top_common_terms.is_empty() {
        println!("  (none)");
    }
    for term in &report.top_common_terms {
        println!(
            "  {:<24} {:.4}  (first {:.4}, second {:.4})",
            term.term, term.score, term.weight_a, term.weight_b
        );
    }
}

fn score_bar(score: f64) -> String {
    let filled = (score.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    let empty = BAR_WIDTH.saturating_sub(filled);
    format!(
        "[{}{}]",
        colorize_score(score, "=".repeat(filled)),
        " ".repeat(empty)
    )
}

/// Red for likely copies, yellow for partial overlap, green otherwise.
fn colorize_score(score: f64, text: String) -> ColoredString {
    match score {
        s if s >= 0.8 => text.red().bold(),
        s if s >= 0.5 => text.yellow(),
        _ => text.green(),
    }
}
