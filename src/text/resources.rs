// Language resources: built once at process startup and shared read-only.
//
// The bundle owns the stopword set and the compiled character filter the
// normalizer needs. Construction is the only place a missing resource can
// surface, so it fails with ResourceUnavailable instead of leaving the
// normalizer half-initialized.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use regex_lite::Regex;
use stop_words::{get, LANGUAGE};
use tracing::info;

use crate::error::{Error, Result};

/// Everything outside ASCII letters and digits.
const NON_ALPHANUMERIC: &str = r"[^a-zA-Z0-9]";

/// Immutable stopword set plus the compiled character filter.
#[derive(Debug)]
pub struct LanguageResources {
    stopwords: HashSet<String>,
    non_alphanumeric: Regex,
}

impl LanguageResources {
    /// Built-in English stopword list: NLTK's, via the `stop-words` crate.
    pub fn english() -> Result<Self> {
        let words: Vec<String> = get(LANGUAGE::English);
        if words.is_empty() {
            return Err(Error::ResourceUnavailable(
                "built-in English stopword list is empty".to_string(),
            ));
        }
        let resources = Self::from_words(words)?;
        info!(stopwords = resources.len(), "Loaded English stopwords");
        Ok(resources)
    }

    /// Stopwords read from a file, one per line. Blank lines and lines starting
    /// with `#` are skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::ResourceUnavailable(format!("stopword file {}: {e}", path.display()))
        })?;

        let words: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();

        if words.is_empty() {
            return Err(Error::ResourceUnavailable(format!(
                "stopword file {} contains no words",
                path.display()
            )));
        }

        let resources = Self::from_words(words)?;
        info!(
            stopwords = resources.len(),
            path = %path.display(),
            "Loaded stopwords from file"
        );
        Ok(resources)
    }

    /// Custom file when configured, built-in English list otherwise.
    pub fn load(stopwords_path: Option<&Path>) -> Result<Self> {
        match stopwords_path {
            Some(path) => Self::from_file(path),
            None => Self::english(),
        }
    }

    /// Build a bundle from an arbitrary word list. Words are lowercased so
    /// lookups match normalized tokens.
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let non_alphanumeric = Regex::new(NON_ALPHANUMERIC).map_err(|e| {
            Error::ResourceUnavailable(format!("character filter failed to compile: {e}"))
        })?;

        Ok(Self {
            stopwords: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
            non_alphanumeric,
        })
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.stopwords.iter().map(String::as_str)
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }

    pub(crate) fn non_alphanumeric(&self) -> &Regex {
        &self.non_alphanumeric
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_contains_common_words() {
        let res = LanguageResources::english().unwrap();
        for word in ["the", "is", "and", "a"] {
            assert!(res.is_stopword(word), "expected {word} to be a stopword");
        }
        assert!(!res.is_stopword("pizza"));
    }

    #[test]
    fn test_english_is_the_short_nltk_list() {
        let res = LanguageResources::english().unwrap();
        assert!(
            (150..=200).contains(&res.len()),
            "expected ~179 NLTK stopwords, got {}",
            res.len()
        );
        for word in ["great", "like", "good", "best", "new", "thanks"] {
            assert!(!res.is_stopword(word), "{word} should carry topic signal");
        }
    }

    #[test]
    fn test_from_words_lowercases() {
        let res = LanguageResources::from_words(["The", "IS"]).unwrap();
        assert!(res.is_stopword("the"));
        assert!(res.is_stopword("is"));
        assert_eq!(res.len(), 2);
    }

    #[test]
    fn test_missing_file_is_resource_unavailable() {
        let path = std::env::temp_dir().join("comment-topics-no-such-stopwords.txt");
        let err = LanguageResources::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::ResourceUnavailable(_)), "got {err:?}");
    }

    #[test]
    fn test_from_file_skips_comments_and_blanks() {
        let path = std::env::temp_dir().join("comment-topics-stopwords-test.txt");
        std::fs::write(&path, "# custom list\nthe\n\n  Video \n").unwrap();

        let res = LanguageResources::from_file(&path).unwrap();
        assert_eq!(res.len(), 2);
        assert!(res.is_stopword("video"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_file_is_resource_unavailable() {
        let path = std::env::temp_dir().join("comment-topics-stopwords-empty.txt");
        std::fs::write(&path, "# nothing here\n").unwrap();

        let err = LanguageResources::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::ResourceUnavailable(_)));

        std::fs::remove_file(&path).unwrap();
    }
}
