// Error taxonomy for the comment topic pipeline.
//
// Two fatal kinds abort a request: the input spreadsheet could not be loaded,
// or a language/model resource is missing. Engine failures are a third fatal
// kind. Empty or column-less input is NOT an error; it travels alongside the
// result as an EmptyInputWarning so the page still renders.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal pipeline errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The input file is missing, unreadable, or has the wrong shape.
    #[error("failed to load comment data from {}: {reason}", path.display())]
    DataLoad { path: PathBuf, reason: String },

    /// A stopword list, tokenizer, or model file needed at startup is absent.
    #[error("required resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// The topic-modeling engine failed while fitting.
    #[error("topic model failed: {0}")]
    Model(String),
}

impl Error {
    pub fn data_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DataLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Stable identifier shown on error pages and in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DataLoad { .. } => "data_load_error",
            Self::ResourceUnavailable(_) => "resource_unavailable",
            Self::Model(_) => "model_error",
        }
    }
}

/// Why topic fitting was skipped. Logged and shown on the page, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyInputWarning {
    #[error("comment table is empty; skipped topic modeling")]
    NoRows,
    #[error("comment table has no comment_text column; skipped topic modeling")]
    MissingCommentColumn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_distinct_per_variant() {
        let kinds = [
            Error::data_load("x.xlsx", "missing").kind(),
            Error::ResourceUnavailable("stopwords".into()).kind(),
            Error::Model("boom".into()).kind(),
        ];
        assert_eq!(kinds, ["data_load_error", "resource_unavailable", "model_error"]);
    }

    #[test]
    fn test_data_load_message_names_path() {
        let err = Error::data_load("data/comments.xlsx", "file not found");
        let msg = err.to_string();
        assert!(msg.contains("data/comments.xlsx"), "got: {msg}");
        assert!(msg.contains("file not found"), "got: {msg}");
    }
}
