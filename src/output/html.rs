// HTML page for GET / and `analyze --html`.
//
// Built by string concatenation, one section per table. Every piece of
// comment text, keyword, and column value passes through html_escape before
// it reaches the page.

use html_escape::encode_text;

use crate::error::Error;
use crate::pipeline::TopicReport;
use crate::topics::summary::TopicInfo;

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;margin-bottom:2em;width:100%}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left;vertical-align:top}\
th{background:#f3f3f3}\
.muted{color:#777}\
.warning{background:#fff4d6;border:1px solid #e0c060;padding:8px;margin-bottom:1em}\
.error{background:#fde2e2;border:1px solid #d08080;padding:8px}";

/// Max characters of a representative document shown in the summary table.
const DOC_PREVIEW_CHARS: usize = 200;

/// Render the full results page.
pub fn render_page(report: &TopicReport) -> String {
    let mut html = page_open("Comment Topics");

    html.push_str("<h1>Comment Topics</h1>\n");
    html.push_str(&format!(
        "<p class=\"muted\">{} comments, {} topics, engine: {}{}, generated {}</p>\n",
        report.rows.len(),
        report.summary.len(),
        encode_text(&report.engine),
        if report.cached { " (cached fit)" } else { "" },
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    ));

    if let Some(warning) = report.warning {
        html.push_str(&format!(
            "<div class=\"warning\">{}</div>\n",
            encode_text(&warning.to_string())
        ));
    }

    html.push_str("<h2>Topics</h2>\n");
    render_summary(&mut html, &report.summary.topics);

    html.push_str("<h2>Comments</h2>\n");
    render_comments(&mut html, report);

    html.push_str("</body>\n</html>\n");
    html
}

fn render_summary(html: &mut String, topics: &[TopicInfo]) {
    if topics.is_empty() {
        html.push_str("<p class=\"muted\">No topics.</p>\n");
        return;
    }

    html.push_str(
        "<table class=\"topics\">\n<tr><th>Topic</th><th>Count</th><th>Name</th>\
         <th>Representation</th><th>Representative Docs</th></tr>\n",
    );
    for info in topics {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>",
            info.topic,
            info.count,
            encode_text(&info.name),
            encode_text(&info.representation.join(", ")),
        ));
        if !info.representative_docs.is_empty() {
            html.push_str("<ul>");
            for doc in &info.representative_docs {
                let preview = super::truncate_chars(doc, DOC_PREVIEW_CHARS);
                html.push_str(&format!("<li>{}</li>", encode_text(&preview)));
            }
            html.push_str("</ul>");
        }
        html.push_str("</td></tr>\n");
    }
    html.push_str("</table>\n");
}

fn render_comments(html: &mut String, report: &TopicReport) {
    if report.rows.is_empty() {
        html.push_str("<p class=\"muted\">No comments.</p>\n");
        return;
    }

    let extra: Vec<&str> = report.rows.passthrough_columns().collect();

    html.push_str("<table class=\"comments\">\n<tr><th>Comment</th><th>Topic</th><th>Label</th>");
    for column in &extra {
        html.push_str(&format!("<th>{}</th>", encode_text(column)));
    }
    html.push_str("</tr>\n");

    for row in &report.rows.rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td>",
            encode_text(&row.comment_text),
            row.topic,
            encode_text(&row.topic_label),
        ));
        for column in &extra {
            let value = row.extra.get(*column).map(String::as_str).unwrap_or("");
            html.push_str(&format!("<td>{}</td>", encode_text(value)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
}

/// Render the page shown when a request fails.
pub fn render_error_page(err: &Error) -> String {
    let mut html = page_open("Comment Topics: error");
    html.push_str("<h1>Comment Topics</h1>\n");
    html.push_str(&format!(
        "<div class=\"error\"><strong>{}</strong><p>{}</p></div>\n",
        err.kind(),
        encode_text(&err.to_string()),
    ));
    html.push_str("</body>\n</html>\n");
    html
}

fn page_open(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n",
        encode_text(title)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::record::{CommentRecord, CommentTable};
    use crate::error::EmptyInputWarning;
    use crate::topics::summary::TopicSummary;
    use chrono::Utc;

    fn report(rows: CommentTable, summary: TopicSummary) -> TopicReport {
        TopicReport {
            rows,
            summary,
            engine: "keywords".into(),
            generated_at: Utc::now(),
            warning: None,
            cached: false,
        }
    }

    #[test]
    fn test_comment_text_is_escaped() {
        let mut row = CommentRecord::new("<script>alert(1)</script>");
        row.topic_label = "Unknown".into();
        let page = render_page(&report(
            CommentTable::new(vec!["comment_text".into()], vec![row]),
            TopicSummary::default(),
        ));

        assert!(!page.contains("<script>alert"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_summary_rows_render_in_given_order() {
        let topic = |id: i64, count: usize, word: &str| TopicInfo {
            topic: id,
            count,
            name: format!("{id}_{word}"),
            representation: vec![word.to_string()],
            representative_docs: vec![format!("about {word}")],
        };
        let summary = TopicSummary::new(vec![topic(3, 9, "pizza"), topic(0, 2, "guitar")]);
        let page = render_page(&report(CommentTable::default(), summary));

        let pizza = page.find("3_pizza").unwrap();
        let guitar = page.find("0_guitar").unwrap();
        assert!(pizza < guitar);
        assert!(page.contains("about pizza"));
    }

    #[test]
    fn test_passthrough_columns_are_shown() {
        let row = CommentRecord::new("nice").with_extra("author", "Ann & Bo");
        let table = CommentTable::new(vec!["comment_text".into(), "author".into()], vec![row]);
        let page = render_page(&report(table, TopicSummary::default()));

        assert!(page.contains("<th>author</th>"));
        assert!(page.contains("Ann &amp; Bo"));
    }

    #[test]
    fn test_warning_is_shown() {
        let mut r = report(CommentTable::default(), TopicSummary::default());
        r.warning = Some(EmptyInputWarning::NoRows);
        let page = render_page(&r);
        assert!(page.contains("class=\"warning\""));
        assert!(page.contains("No topics."));
    }

    #[test]
    fn test_error_page_names_kind() {
        let page = render_error_page(&Error::data_load("missing.xlsx", "file not found"));
        assert!(page.contains("data_load_error"));
        assert!(page.contains("missing.xlsx"));
    }
}
