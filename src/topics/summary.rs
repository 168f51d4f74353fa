// Topic summary table and the shared summarizer every engine feeds into.
//
// Engines only decide which documents belong together. Turning those raw
// groups into numbered topics with keywords, names, and example documents is
// done here, once, so both engines produce the same summary shape:
//
//   1. Groups smaller than min_topic_size become outliers (-1).
//   2. Remaining groups are numbered 0..k by size, largest first.
//   3. Each topic's representation is its top terms by class-based TF-IDF:
//        w(t, c) = tf(t, c) * ln(1 + A / f(t))
//      where A is the mean token count per class and f(t) is the term's
//      frequency across all classes.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::info;

use super::traits::TopicFit;
use crate::comments::record::OUTLIER_TOPIC;

/// One row of the topic summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicInfo {
    pub topic: i64,
    pub count: usize,
    pub name: String,
    /// Representative keywords, strongest first
    pub representation: Vec<String>,
    /// A few example documents from this topic
    pub representative_docs: Vec<String>,
}

impl TopicInfo {
    /// Human-readable label built from the representation, or None when the
    /// topic has no keywords.
    pub fn label(&self) -> Option<String> {
        if self.representation.is_empty() {
            None
        } else {
            Some(self.representation.join(", "))
        }
    }
}

/// Per-topic summary for one model fit. Topic ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopicSummary {
    pub topics: Vec<TopicInfo>,
}

impl TopicSummary {
    pub fn new(topics: Vec<TopicInfo>) -> Self {
        Self { topics }
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn get(&self, topic: i64) -> Option<&TopicInfo> {
        self.topics.iter().find(|t| t.topic == topic)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicInfo> {
        self.topics.iter()
    }

    /// topic id -> label, for every topic that has keywords.
    pub fn label_map(&self) -> HashMap<i64, String> {
        self.topics
            .iter()
            .filter_map(|t| t.label().map(|label| (t.topic, label)))
            .collect()
    }
}

/// Sort by count descending; equal counts keep ascending topic id order.
pub fn rank_summary(summary: &TopicSummary) -> TopicSummary {
    let mut topics = summary.topics.clone();
    topics.sort_by(|a, b| b.count.cmp(&a.count).then(a.topic.cmp(&b.topic)));
    TopicSummary { topics }
}

/// Tuning for `summarize`.
#[derive(Debug, Clone, Copy)]
pub struct SummaryParams {
    /// Groups with fewer documents than this become outliers
    pub min_topic_size: usize,
    /// Keywords kept per topic
    pub top_n_words: usize,
    /// Example documents kept per topic
    pub representative_docs: usize,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            min_topic_size: 2,
            top_n_words: 10,
            representative_docs: 3,
        }
    }
}

/// Turn raw engine groups into a finished fit.
///
/// `groups[i]` is the engine's group index for `documents[i]`, or None if the
/// engine left that document unassigned.
pub fn summarize(documents: &[String], groups: &[Option<usize>], params: SummaryParams) -> TopicFit {
    debug_assert_eq!(documents.len(), groups.len());

    let topics = renumber(groups, params.min_topic_size);

    // Document indices per final topic id, ordered by id (-1 first)
    let mut members: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (idx, &topic) in topics.iter().enumerate() {
        members.entry(topic).or_default().push(idx);
    }

    let weights = class_tfidf(documents, &members);

    let mut summary = Vec::with_capacity(members.len());
    for (&topic, docs) in &members {
        let class_weights = weights.get(&topic);

        let mut ranked: Vec<(&str, f64)> = class_weights
            .map(|w| {
                w.iter()
                    .filter(|(_, score)| **score > 0.0)
                    .map(|(term, score)| (term.as_str(), *score))
                    .collect()
            })
            .unwrap_or_default();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(b.0))
        });
        ranked.truncate(params.top_n_words);

        let representation: Vec<String> = ranked.iter().map(|(t, _)| t.to_string()).collect();
        let representative_docs =
            pick_representative_docs(documents, docs, &ranked, params.representative_docs);

        summary.push(TopicInfo {
            topic,
            count: docs.len(),
            name: topic_name(topic, &representation),
            representation,
            representative_docs,
        });
    }

    let outliers = members.get(&OUTLIER_TOPIC).map_or(0, Vec::len);
    info!(
        documents = documents.len(),
        topics = summary.iter().filter(|t| t.topic != OUTLIER_TOPIC).count(),
        outliers,
        "Summarized topic fit"
    );

    TopicFit {
        topics,
        summary: TopicSummary::new(summary),
        skipped: None,
    }
}

/// Map raw groups to final ids: small groups drop to -1, the rest are
/// numbered by size descending, first appearance breaking ties.
fn renumber(groups: &[Option<usize>], min_topic_size: usize) -> Vec<i64> {
    let mut sizes: HashMap<usize, usize> = HashMap::new();
    let mut first_seen: Vec<usize> = Vec::new();
    for group in groups.iter().flatten() {
        let size = sizes.entry(*group).or_insert(0);
        if *size == 0 {
            first_seen.push(*group);
        }
        *size += 1;
    }

    let mut kept: Vec<(usize, usize)> = first_seen
        .iter()
        .enumerate()
        .filter(|(_, g)| sizes[*g] >= min_topic_size.max(1))
        .map(|(order, g)| (*g, order))
        .collect();
    // Stable: equal sizes keep first-appearance order
    kept.sort_by(|a, b| sizes[&b.0].cmp(&sizes[&a.0]).then(a.1.cmp(&b.1)));

    let new_ids: HashMap<usize, i64> = kept
        .iter()
        .enumerate()
        .map(|(new_id, (group, _))| (*group, new_id as i64))
        .collect();

    groups
        .iter()
        .map(|g| g.and_then(|g| new_ids.get(&g).copied()).unwrap_or(OUTLIER_TOPIC))
        .collect()
}

/// Class-based TF-IDF weights for every term in every topic.
fn class_tfidf(
    documents: &[String],
    members: &BTreeMap<i64, Vec<usize>>,
) -> HashMap<i64, HashMap<String, f64>> {
    let mut class_tf: HashMap<i64, HashMap<String, f64>> = HashMap::new();
    let mut term_total: HashMap<String, f64> = HashMap::new();
    let mut token_total = 0.0;

    for (&topic, docs) in members {
        let tf = class_tf.entry(topic).or_default();
        for &idx in docs {
            for token in documents[idx].split_whitespace() {
                *tf.entry(token.to_string()).or_insert(0.0) += 1.0;
                *term_total.entry(token.to_string()).or_insert(0.0) += 1.0;
                token_total += 1.0;
            }
        }
    }

    if token_total == 0.0 || members.is_empty() {
        return HashMap::new();
    }

    let avg_tokens = token_total / members.len() as f64;

    class_tf
        .into_iter()
        .map(|(topic, tf)| {
            let weighted = tf
                .into_iter()
                .map(|(term, count)| {
                    let f = term_total.get(&term).copied().unwrap_or(1.0);
                    let w = count * (1.0 + avg_tokens / f).ln();
                    (term, w)
                })
                .collect();
            (topic, weighted)
        })
        .collect()
}

/// Up to `limit` distinct, non-empty documents ranked by how many of the
/// topic's keywords they carry (weighted). Input order breaks ties.
fn pick_representative_docs(
    documents: &[String],
    docs: &[usize],
    ranked_terms: &[(&str, f64)],
    limit: usize,
) -> Vec<String> {
    let term_weight: HashMap<&str, f64> = ranked_terms.iter().copied().collect();

    let mut scored: Vec<(usize, f64)> = docs
        .iter()
        .filter(|&&idx| !documents[idx].trim().is_empty())
        .map(|&idx| {
            let distinct: HashSet<&str> = documents[idx].split_whitespace().collect();
            let score = distinct
                .iter()
                .filter_map(|t| term_weight.get(t))
                .sum::<f64>();
            (idx, score)
        })
        .collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .map(|(idx, _)| documents[idx].clone())
        .filter(|doc| seen.insert(doc.clone()))
        .take(limit)
        .collect()
}

/// `"{id}_{w1}_{w2}_{w3}_{w4}"`, or just the id when there are no keywords.
fn topic_name(topic: i64, representation: &[String]) -> String {
    let mut name = topic.to_string();
    for word in representation.iter().take(4) {
        name.push('_');
        name.push_str(word);
    }
    name
}
