// Keyword co-occurrence topic model: the default engine.
//
// Uses the `keyword_extraction` crate to rank the corpus vocabulary by TF-IDF,
// groups the top keywords by how often they appear in the same comment, then
// assigns every comment to the keyword group it matches most strongly.
//
// Each comment is a separate document for IDF, so words used in every comment
// get downweighted and words distinctive to a subset get boosted. Comments
// that contain none of the grouped keywords are outliers.

use std::collections::HashSet;

use anyhow::Result;
use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};
use tracing::{info, warn};

use super::summary::{summarize, SummaryParams};
use super::traits::{TopicFit, TopicModel};

/// TF-IDF keyword clustering. Runs locally with no model files.
#[derive(Debug, Clone)]
pub struct KeywordTopicModel {
    /// How many top keywords to rank before grouping
    pub top_n_keywords: usize,
    /// Upper bound on keyword groups (topics before outlier filtering)
    pub max_topics: usize,
    /// Keywords per group, seed included
    pub keywords_per_topic: usize,
    /// Words never used as keywords. Empty by default since documents
    /// arrive already normalized.
    pub stop_words: Vec<String>,
    pub summary: SummaryParams,
}

impl Default for KeywordTopicModel {
    fn default() -> Self {
        Self {
            top_n_keywords: 60,
            max_topics: 10,
            keywords_per_topic: 6,
            stop_words: Vec::new(),
            summary: SummaryParams::default(),
        }
    }
}

impl KeywordTopicModel {
    pub fn with_min_topic_size(mut self, min_topic_size: usize) -> Self {
        self.summary.min_topic_size = min_topic_size;
        self
    }

    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }
}

impl TopicModel for KeywordTopicModel {
    fn name(&self) -> &'static str {
        "keywords"
    }

    fn fit_transform(&self, documents: &[String]) -> Result<TopicFit> {
        if documents.is_empty() {
            anyhow::bail!("No documents to model; cannot fit topics on an empty corpus");
        }

        if documents.iter().all(|d| d.trim().is_empty()) {
            warn!(
                documents = documents.len(),
                "Every document is empty after normalization; all are outliers"
            );
            return Ok(summarize(documents, &vec![None; documents.len()], self.summary));
        }

        let params = TfIdfParams::UnprocessedDocuments(documents, &self.stop_words, None);
        let tfidf = TfIdf::new(params);
        let ranked: Vec<(String, f32)> = tfidf.get_ranked_word_scores(self.top_n_keywords);

        if ranked.is_empty() {
            warn!(
                documents = documents.len(),
                "TF-IDF produced no keywords; all documents are outliers"
            );
            return Ok(summarize(documents, &vec![None; documents.len()], self.summary));
        }

        info!(
            keywords = ranked.len(),
            top_keyword = &ranked[0].0,
            top_score = ranked[0].1,
            "Ranked TF-IDF keywords"
        );

        let doc_tokens: Vec<HashSet<&str>> = documents
            .iter()
            .map(|d| d.split_whitespace().collect())
            .collect();

        let groups = group_keywords(
            &ranked,
            &doc_tokens,
            self.max_topics,
            self.keywords_per_topic,
        );
        let assignments = assign_documents(&ranked, &groups, &doc_tokens);

        Ok(summarize(documents, &assignments, self.summary))
    }
}

/// Group keywords by co-occurrence in documents.
///
/// Greedy: take the highest-ranked ungrouped keyword as a seed and pull in its
/// most frequently co-occurring ungrouped neighbours. Returns keyword indices
/// into `ranked`, one Vec per group.
fn group_keywords(
    ranked: &[(String, f32)],
    doc_tokens: &[HashSet<&str>],
    max_groups: usize,
    per_group: usize,
) -> Vec<Vec<usize>> {
    let n = ranked.len();

    // For each document, the keyword indices it contains
    let doc_keywords: Vec<Vec<usize>> = doc_tokens
        .iter()
        .map(|tokens| {
            ranked
                .iter()
                .enumerate()
                .filter(|(_, (kw, _))| tokens.contains(kw.as_str()))
                .map(|(i, _)| i)
                .collect()
        })
        .collect();

    let mut cooccurrence = vec![vec![0u32; n]; n];
    for dk in &doc_keywords {
        for &i in dk {
            for &j in dk {
                if i != j {
                    cooccurrence[i][j] += 1;
                }
            }
        }
    }

    let mut assigned = vec![false; n];
    let mut groups = Vec::new();

    for seed in 0..n {
        if groups.len() >= max_groups {
            break;
        }
        if assigned[seed] {
            continue;
        }

        assigned[seed] = true;
        let mut members = vec![seed];

        let mut candidates: Vec<(usize, u32)> = (0..n)
            .filter(|&i| !assigned[i] && cooccurrence[seed][i] > 0)
            .map(|i| (i, cooccurrence[seed][i]))
            .collect();
        // Stable sort keeps rank order among equal counts
        candidates.sort_by(|a, b| b.1.cmp(&a.1));

        for (idx, _count) in candidates
            .into_iter()
            .take(per_group.saturating_sub(1))
        {
            assigned[idx] = true;
            members.push(idx);
        }

        groups.push(members);
    }

    groups
}

/// Assign each document to the group whose keywords give it the highest
/// summed TF-IDF score. Earlier groups win ties; no match means outlier.
fn assign_documents(
    ranked: &[(String, f32)],
    groups: &[Vec<usize>],
    doc_tokens: &[HashSet<&str>],
) -> Vec<Option<usize>> {
    doc_tokens
        .iter()
        .map(|tokens| {
            let mut best: Option<(usize, f32)> = None;
            for (g, members) in groups.iter().enumerate() {
                let score: f32 = members
                    .iter()
                    .filter(|&&k| tokens.contains(ranked[k].0.as_str()))
                    .map(|&k| ranked[k].1)
                    .sum();
                if score > 0.0 && best.map_or(true, |(_, s)| score > s) {
                    best = Some((g, score));
                }
            }
            best.map(|(g, _)| g)
        })
        .collect()
}
