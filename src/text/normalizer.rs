// Comment normalizer: lowercase, ASCII-alphanumeric filter, word
// segmentation, stopword removal, single-space join.

use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use super::resources::LanguageResources;

/// Cleans a single comment into the text the topic engine sees.
///
/// Holds a shared handle to the startup resource bundle; cloning is cheap.
#[derive(Debug, Clone)]
pub struct Normalizer {
    resources: Arc<LanguageResources>,
}

impl Normalizer {
    pub fn new(resources: Arc<LanguageResources>) -> Self {
        Self { resources }
    }

    pub fn resources(&self) -> &LanguageResources {
        &self.resources
    }

    /// Normalize one comment.
    ///
    /// Output contains only `[a-z0-9]` tokens separated by single spaces, none
    /// of which is a stopword. Empty, all-punctuation, and all-stopword input
    /// yield an empty string.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let filtered = self
            .resources
            .non_alphanumeric()
            .replace_all(&lowered, " ");

        filtered
            .unicode_words()
            .filter(|token| !self.resources.is_stopword(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Normalize any displayable value by coercing it to a string first.
    pub fn normalize_value<T: ToString + ?Sized>(&self, value: &T) -> String {
        self.normalize(&value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        let res = LanguageResources::from_words(["the", "is", "a", "this", "i", "it"]).unwrap();
        Normalizer::new(Arc::new(res))
    }

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        let n = normalizer();
        assert_eq!(n.normalize("Great VIDEO!!"), "great video");
    }

    #[test]
    fn test_removes_stopwords() {
        let n = normalizer();
        assert_eq!(n.normalize("This is the best"), "best");
    }

    #[test]
    fn test_collapses_whitespace() {
        let n = normalizer();
        assert_eq!(n.normalize("  wow...   such\t\ncontent  "), "wow such content");
    }

    #[test]
    fn test_keeps_digits() {
        let n = normalizer();
        assert_eq!(n.normalize("Top 10 songs of 2024"), "top 10 songs of 2024");
    }

    #[test]
    fn test_non_ascii_letters_become_separators() {
        // Accented letters fall outside a-z and split the word
        let n = normalizer();
        assert_eq!(n.normalize("café olé"), "caf ol");
    }

    #[test]
    fn test_apostrophes_split_contractions() {
        let n = normalizer();
        assert_eq!(n.normalize("It's fine"), "s fine");
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        let n = normalizer();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("?!... ,,, :)"), "");
        assert_eq!(n.normalize("this is the"), "");
    }

    #[test]
    fn test_normalize_value_coerces() {
        let n = normalizer();
        assert_eq!(n.normalize_value(&42), "42");
        assert_eq!(n.normalize_value(&3.5), "3 5");
        assert_eq!(n.normalize_value(&true), "true");
    }
}
