// Topic model trait: the seam where the clustering engine plugs in.
//
// The pipeline only needs "documents in, one topic id per document plus a
// per-topic summary out". The keyword engine is the default; the embedding
// engine swaps in through the same trait, and tests supply fixed fits.

use anyhow::Result;
use serde::Serialize;

use super::summary::TopicSummary;
use crate::error::EmptyInputWarning;

/// Output of one model fit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TopicFit {
    /// One topic id per input document, in input order. -1 marks outliers.
    pub topics: Vec<i64>,
    /// One row per distinct topic id actually produced
    pub summary: TopicSummary,
    /// Set when fitting was skipped because the input was unusable
    pub skipped: Option<EmptyInputWarning>,
}

impl TopicFit {
    /// Sentinel fit for unusable input: every document is an outlier and the
    /// summary is empty, so every label falls back to "Unknown".
    pub fn skipped(document_count: usize, reason: EmptyInputWarning) -> Self {
        Self {
            topics: vec![crate::comments::record::OUTLIER_TOPIC; document_count],
            summary: TopicSummary::default(),
            skipped: Some(reason),
        }
    }
}

/// A clustering engine that assigns each document to a topic.
pub trait TopicModel: Send + Sync {
    /// Short identifier used in logs, the page header, and cache keys.
    fn name(&self) -> &'static str;

    /// Fit from scratch on `documents` and return per-document assignments.
    /// Implementations must return exactly `documents.len()` topic ids.
    fn fit_transform(&self, documents: &[String]) -> Result<TopicFit>;
}
