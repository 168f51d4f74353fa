// Comment rows: one required text field plus whatever other columns the
// spreadsheet carried, passed through untouched.

use std::collections::HashMap;

use serde::Serialize;

/// Name of the required input column.
pub const COMMENT_COLUMN: &str = "comment_text";

/// Topic id for outliers and rows that were never assigned.
pub const OUTLIER_TOPIC: i64 = -1;

/// Label used when a row's topic has no entry in the summary.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// A single comment and everything derived from it during one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub comment_text: String,
    /// Filled by `normalize_all`
    pub normalized_text: String,
    /// Filled by `assign_labels`; -1 until then
    pub topic: i64,
    pub topic_label: String,
    /// Other spreadsheet columns, keyed by header
    pub extra: HashMap<String, String>,
}

impl CommentRecord {
    pub fn new(comment_text: impl Into<String>) -> Self {
        Self {
            comment_text: comment_text.into(),
            normalized_text: String::new(),
            topic: OUTLIER_TOPIC,
            topic_label: UNKNOWN_LABEL.to_string(),
            extra: HashMap::new(),
        }
    }

    pub fn with_extra(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(column.into(), value.into());
        self
    }
}

/// The loaded spreadsheet: header order plus rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommentTable {
    /// Every header in file order, including `comment_text` when present
    pub columns: Vec<String>,
    pub rows: Vec<CommentRecord>,
}

impl CommentTable {
    pub fn new(columns: Vec<String>, rows: Vec<CommentRecord>) -> Self {
        Self { columns, rows }
    }

    /// Build a table with only the comment column.
    pub fn from_comments<I, S>(comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: vec![COMMENT_COLUMN.to_string()],
            rows: comments.into_iter().map(CommentRecord::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_comment_column(&self) -> bool {
        self.columns.iter().any(|c| c == COMMENT_COLUMN)
    }

    /// Headers other than `comment_text`, in file order.
    pub fn passthrough_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| *c != COMMENT_COLUMN)
    }

    pub fn normalized_texts(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.normalized_text.clone()).collect()
    }
}
