// Colored terminal output for `analyze`.
//
// Mirrors the HTML page: ranked topic table first, then a preview of the
// labeled comments.

use colored::Colorize;

use crate::comments::record::OUTLIER_TOPIC;
use crate::pipeline::TopicReport;

/// Comments listed before the "... and N more" line.
const COMMENT_PREVIEW_ROWS: usize = 25;

/// Display a topic report in the terminal.
pub fn display_report(report: &TopicReport) {
    println!(
        "\n{}",
        format!(
            "=== Comment Topics ({} comments, engine: {}) ===",
            report.rows.len(),
            report.engine
        )
        .bold()
    );
    if report.cached {
        println!("  {}", "(fit reused from cache)".dimmed());
    }

    if let Some(warning) = report.warning {
        println!("  {} {}", "!".yellow().bold(), warning);
    }

    display_topics(report);
    display_comments(report);
}

fn display_topics(report: &TopicReport) {
    println!();
    if report.summary.is_empty() {
        println!("  {}", "No topics found.".dimmed());
        return;
    }

    println!(
        "  {:>5}  {:>6}  {}",
        "Topic".dimmed(),
        "Count".dimmed(),
        "Representation".dimmed(),
    );
    println!("  {}", "-".repeat(70).dimmed());

    for info in report.summary.iter() {
        let words = super::truncate_chars(&info.representation.join(", "), 56);
        let topic = format!("{:>5}", info.topic);
        let topic = if info.topic == OUTLIER_TOPIC {
            topic.dimmed()
        } else {
            topic.cyan()
        };
        println!("  {}  {:>6}  {}", topic, info.count, words);

        for doc in &info.representative_docs {
            println!("  {:>5}  {:>6}  {}", "", "", super::truncate_chars(doc, 80).dimmed());
        }
    }
}

fn display_comments(report: &TopicReport) {
    if report.rows.is_empty() {
        return;
    }

    println!("\n{}", "Comments:".bold());
    for row in report.rows.rows.iter().take(COMMENT_PREVIEW_ROWS) {
        println!(
            "  [{:>3}] {}  {}",
            row.topic,
            super::truncate_chars(&row.comment_text, 80),
            format!("({})", super::truncate_chars(&row.topic_label, 40)).dimmed(),
        );
    }

    let remaining = report.rows.len().saturating_sub(COMMENT_PREVIEW_ROWS);
    if remaining > 0 {
        println!("  {}", format!("... and {remaining} more").dimmed());
    }
    println!();
}
