// Unit tests for comment normalization.
//
// Checks the normalizer's output invariants against the built-in English
// stopword list, plus exact outputs against small custom lists.

use std::sync::Arc;

use comment_topics::text::normalizer::Normalizer;
use comment_topics::text::resources::LanguageResources;

fn english() -> Normalizer {
    Normalizer::new(Arc::new(LanguageResources::english().unwrap()))
}

fn custom(words: &[&str]) -> Normalizer {
    Normalizer::new(Arc::new(LanguageResources::from_words(words.iter().copied()).unwrap()))
}

const SAMPLES: &[&str] = &[
    "Great video!! Loved the part at 3:15",
    "THIS is the WORST thing I've ever seen...",
    "¿Qué? café, naïve, résumé",
    "emoji 🔥🔥 time 👍",
    "   ",
    "",
    "!!!???",
    "the and of a",
    "line one\nline two\ttabbed",
    "C++ > Java, 100% agree",
];

// ============================================================
// Output invariants
// ============================================================

#[test]
fn output_is_lowercase_ascii_alphanumeric_tokens() {
    let n = english();
    for sample in SAMPLES {
        let out = n.normalize(sample);
        for token in out.split(' ').filter(|t| !t.is_empty()) {
            assert!(
                token.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()),
                "token {token:?} from {sample:?} has unexpected characters"
            );
        }
    }
}

#[test]
fn output_has_single_spaces_and_no_padding() {
    let n = english();
    for sample in SAMPLES {
        let out = n.normalize(sample);
        assert!(!out.contains("  "), "double space in {out:?}");
        assert_eq!(out.trim(), out, "padding in {out:?}");
    }
}

#[test]
fn output_contains_no_stopwords() {
    let n = english();
    for sample in SAMPLES {
        let out = n.normalize(sample);
        for token in out.split_whitespace() {
            assert!(
                !n.resources().is_stopword(token),
                "stopword {token:?} survived in {out:?}"
            );
        }
    }
}

#[test]
fn normalization_is_idempotent() {
    let n = english();
    for sample in SAMPLES {
        let once = n.normalize(sample);
        assert_eq!(n.normalize(&once), once, "not idempotent for {sample:?}");
    }
}

#[test]
fn empty_punctuation_and_stopword_only_input_yield_empty() {
    let n = english();
    assert_eq!(n.normalize(""), "");
    assert_eq!(n.normalize("   "), "");
    assert_eq!(n.normalize("!!!???"), "");
    assert_eq!(n.normalize("the and of a"), "");
}

// ============================================================
// Exact outputs with a known stopword list
// ============================================================

#[test]
fn punctuation_splits_tokens() {
    let n = custom(&["the", "is"]);
    assert_eq!(n.normalize("The video is great!!"), "video great");
    assert_eq!(n.normalize("state-of-art"), "state of art");
    assert_eq!(n.normalize("3:15"), "3 15");
}

#[test]
fn non_ascii_letters_are_dropped_not_transliterated() {
    let n = custom(&["x"]);
    assert_eq!(n.normalize("café"), "caf");
    assert_eq!(n.normalize("🔥fire🔥"), "fire");
}

#[test]
fn stopword_matching_is_case_insensitive() {
    let n = custom(&["WORST"]);
    assert_eq!(n.normalize("worst Worst WORST ever"), "ever");
}

#[test]
fn normalize_value_coerces_numbers() {
    let n = custom(&["x"]);
    assert_eq!(n.normalize_value(&42), "42");
    assert_eq!(n.normalize_value(&3.5), "3 5");
    assert_eq!(n.normalize_value("Hi!"), "hi");
}

// ============================================================
// Built-in English list keeps opinion words
// ============================================================

#[test]
fn english_list_keeps_sentiment_words() {
    let n = english();
    assert_eq!(n.normalize("great video!!"), "great video");
    assert_eq!(n.normalize("bad video"), "bad video");
    assert_eq!(n.normalize("great great video"), "great great video");
    assert_eq!(n.normalize("I like this song"), "like song");
    assert_eq!(n.normalize("The video is great and new"), "video great new");
}

#[test]
fn english_list_is_small() {
    let resources = LanguageResources::english().unwrap();
    assert!(resources.len() < 250, "got {} stopwords", resources.len());
    for word in ["the", "is", "and"] {
        assert!(resources.is_stopword(word));
    }
    for word in ["great", "like"] {
        assert!(!resources.is_stopword(word));
    }
}
