// The comment topic pipeline: load -> normalize -> fit -> label -> rank.
//
// Each run starts from the file on disk and fits the model from scratch. The
// only state shared between runs is the read-only resource bundle, the
// engine, and the optional fit cache.

pub mod cache;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::comments::loader::{load_with, LoadOptions};
use crate::comments::record::{CommentRecord, CommentTable, UNKNOWN_LABEL};
use crate::config::{Config, Engine};
use crate::error::{EmptyInputWarning, Error, Result};
use crate::text::normalizer::Normalizer;
use crate::text::resources::LanguageResources;
use crate::topics::download::embedding_model_dir;
use crate::topics::embeddings::EmbeddingTopicModel;
use crate::topics::keywords::KeywordTopicModel;
use crate::topics::summary::TopicSummary;
use crate::topics::traits::{TopicFit, TopicModel};

pub use crate::topics::summary::rank_summary;
use cache::{content_hash, FitCache};

/// Fill every row's `normalized_text`. Row count and order are unchanged.
pub fn normalize_all(normalizer: &Normalizer, rows: &mut [CommentRecord]) {
    for row in rows.iter_mut() {
        row.normalized_text = normalizer.normalize(&row.comment_text);
    }
    debug!(rows = rows.len(), "Normalized comments");
}

/// Fit the topic model on the table's normalized texts.
///
/// An empty table or one without a `comment_text` column skips the model and
/// returns the sentinel fit (all outliers, empty summary) carrying an
/// EmptyInputWarning. Only engine failures are errors.
pub fn fit_topics(table: &CommentTable, model: &dyn TopicModel) -> Result<TopicFit> {
    if table.is_empty() {
        let reason = EmptyInputWarning::NoRows;
        warn!(warning = %reason, "Skipping topic fit");
        return Ok(TopicFit::skipped(0, reason));
    }
    if !table.has_comment_column() {
        // Tolerated rather than raised; a missing column may hide a bad export
        let reason = EmptyInputWarning::MissingCommentColumn;
        warn!(warning = %reason, rows = table.len(), "Skipping topic fit");
        return Ok(TopicFit::skipped(table.len(), reason));
    }

    let documents = table.normalized_texts();
    let fit = model
        .fit_transform(&documents)
        .map_err(|e| Error::Model(format!("{e:#}")))?;

    if fit.topics.len() != documents.len() {
        return Err(Error::Model(format!(
            "engine '{}' returned {} topic ids for {} documents",
            model.name(),
            fit.topics.len(),
            documents.len()
        )));
    }

    info!(
        engine = model.name(),
        documents = documents.len(),
        topics = fit.summary.len(),
        "Fitted topic model"
    );
    Ok(fit)
}

/// Write topic ids and labels onto the rows.
///
/// Labels come from the summary's representation; ids with no summary entry
/// (or an empty representation) get "Unknown". Rows beyond `topic_ids` keep
/// their current values.
pub fn assign_labels(rows: &mut [CommentRecord], topic_ids: &[i64], summary: &TopicSummary) {
    let labels = summary.label_map();
    for (row, &topic) in rows.iter_mut().zip(topic_ids) {
        row.topic = topic;
        row.topic_label = labels
            .get(&topic)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
    }
}

/// Everything the page needs from one run.
#[derive(Debug, Clone, Serialize)]
pub struct TopicReport {
    pub rows: CommentTable,
    /// Ranked by count descending
    pub summary: TopicSummary,
    pub engine: String,
    pub generated_at: DateTime<Utc>,
    pub warning: Option<EmptyInputWarning>,
    /// True when the fit came from the cache
    pub cached: bool,
}

/// Configured pipeline, built once at startup.
pub struct TopicPipeline {
    data_path: PathBuf,
    load_options: LoadOptions,
    normalizer: Normalizer,
    model: Arc<dyn TopicModel>,
    cache: Option<FitCache>,
}

impl TopicPipeline {
    pub fn new(data_path: impl Into<PathBuf>, normalizer: Normalizer, model: Arc<dyn TopicModel>) -> Self {
        Self {
            data_path: data_path.into(),
            load_options: LoadOptions::default(),
            normalizer,
            model,
            cache: None,
        }
    }

    /// Build resources and the configured engine. Fails with
    /// ResourceUnavailable when stopwords or model files are missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let resources = Arc::new(LanguageResources::load(config.stopwords_path.as_deref())?);

        let model: Arc<dyn TopicModel> = match config.engine {
            Engine::Keywords => Arc::new(
                KeywordTopicModel::default()
                    .with_min_topic_size(config.min_topic_size)
                    .with_stop_words(resources.words()),
            ),
            Engine::Embeddings => Arc::new(
                EmbeddingTopicModel::load(&embedding_model_dir(&config.model_dir))?
                    .with_min_topic_size(config.min_topic_size),
            ),
        };

        let normalizer = Normalizer::new(resources);
        let mut pipeline = Self::new(config.data_path.clone(), normalizer, model).with_load_options(
            LoadOptions {
                require_comment_column: config.strict_schema,
            },
        );
        if config.cache_fits {
            pipeline = pipeline.with_cache(FitCache::default());
        }

        info!(
            engine = pipeline.model.name(),
            data_path = %pipeline.data_path.display(),
            cache = pipeline.cache.is_some(),
            "Topic pipeline ready"
        );
        Ok(pipeline)
    }

    pub fn with_load_options(mut self, options: LoadOptions) -> Self {
        self.load_options = options;
        self
    }

    pub fn with_cache(mut self, cache: FitCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn engine_name(&self) -> &'static str {
        self.model.name()
    }

    /// Load the configured file and run the full pipeline on it.
    pub fn run(&self) -> Result<TopicReport> {
        self.run_path(&self.data_path)
    }

    /// Load `path` and run the full pipeline on it.
    pub fn run_path(&self, path: &Path) -> Result<TopicReport> {
        let Some(cache) = &self.cache else {
            return self.analyze(load_with(path, self.load_options)?);
        };

        // The key must describe the bytes that were parsed; hash on both sides
        // of the load and skip the cache if the file changed in between.
        let before = content_hash(path)?;
        let table = load_with(path, self.load_options)?;
        let after = content_hash(path)?;

        let key = if before == after {
            Some(after)
        } else {
            warn!(path = %path.display(), "Input changed while loading; fit will not be cached");
            None
        };
        self.analyze_cached(table, cache, key)
    }

    /// Like `analyze`, but reuses or stores the fit under `key` when given.
    fn analyze_cached(
        &self,
        mut table: CommentTable,
        cache: &FitCache,
        key: Option<String>,
    ) -> Result<TopicReport> {
        normalize_all(&self.normalizer, &mut table.rows);

        let Some(key) = key else {
            let fit = fit_topics(&table, self.model.as_ref())?;
            return Ok(self.finish(table, fit, false));
        };

        if let Some(fit) = cache.get(&key, self.model.name()) {
            if fit.topics.len() == table.len() {
                debug!(key = %key, "Fit cache hit");
                return Ok(self.finish(table, fit, true));
            }
            warn!(key = %key, "Cached fit does not match row count; refitting");
        }

        let fit = fit_topics(&table, self.model.as_ref())?;
        // Skipped fits are cheap to recompute and carry no model output
        if fit.skipped.is_none() {
            cache.insert(key, self.model.name(), fit.clone());
        }
        Ok(self.finish(table, fit, false))
    }

    /// Run normalize -> fit -> label -> rank on an already-loaded table.
    pub fn analyze(&self, mut table: CommentTable) -> Result<TopicReport> {
        normalize_all(&self.normalizer, &mut table.rows);
        let fit = fit_topics(&table, self.model.as_ref())?;
        Ok(self.finish(table, fit, false))
    }

    fn finish(&self, mut table: CommentTable, fit: TopicFit, cached: bool) -> TopicReport {
        assign_labels(&mut table.rows, &fit.topics, &fit.summary);
        TopicReport {
            rows: table,
            summary: rank_summary(&fit.summary),
            engine: self.model.name().to_string(),
            generated_at: Utc::now(),
            warning: fit.skipped,
            cached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::summary::TopicInfo;

    fn topic(id: i64, count: usize, words: &[&str]) -> TopicInfo {
        TopicInfo {
            topic: id,
            count,
            name: id.to_string(),
            representation: words.iter().map(|w| w.to_string()).collect(),
            representative_docs: vec![],
        }
    }

    /// Engine that puts every document in topic 0.
    struct OneTopic;

    impl TopicModel for OneTopic {
        fn name(&self) -> &'static str {
            "one-topic"
        }

        fn fit_transform(&self, documents: &[String]) -> anyhow::Result<TopicFit> {
            Ok(TopicFit {
                topics: vec![0; documents.len()],
                summary: TopicSummary::new(vec![topic(0, documents.len(), &["all"])]),
                skipped: None,
            })
        }
    }

    /// Engine that returns the wrong number of ids.
    struct ShortEngine;

    impl TopicModel for ShortEngine {
        fn name(&self) -> &'static str {
            "short"
        }

        fn fit_transform(&self, _documents: &[String]) -> anyhow::Result<TopicFit> {
            Ok(TopicFit::default())
        }
    }

    #[test]
    fn test_assign_labels_uses_representation_or_unknown() {
        let mut rows = vec![
            CommentRecord::new("a"),
            CommentRecord::new("b"),
            CommentRecord::new("c"),
        ];
        let summary = TopicSummary::new(vec![topic(0, 1, &["great", "video"]), topic(1, 1, &[])]);

        assign_labels(&mut rows, &[0, 1, 5], &summary);

        assert_eq!(rows[0].topic_label, "great, video");
        assert_eq!(rows[1].topic_label, UNKNOWN_LABEL);
        assert_eq!(rows[2].topic, 5);
        assert_eq!(rows[2].topic_label, UNKNOWN_LABEL);
    }

    #[test]
    fn test_fit_topics_empty_table_is_skipped() {
        let fit = fit_topics(&CommentTable::default(), &OneTopic).unwrap();
        assert_eq!(fit.skipped, Some(EmptyInputWarning::NoRows));
        assert!(fit.summary.is_empty());
        assert!(fit.topics.is_empty());
    }

    #[test]
    fn test_fit_topics_missing_column_is_skipped() {
        let table = CommentTable::new(vec!["text".into()], vec![CommentRecord::new("")]);
        let fit = fit_topics(&table, &OneTopic).unwrap();
        assert_eq!(fit.skipped, Some(EmptyInputWarning::MissingCommentColumn));
        assert_eq!(fit.topics, vec![-1]);
    }

    #[test]
    fn test_fit_topics_rejects_misaligned_engine_output() {
        let table = CommentTable::from_comments(["x", "y"]);
        let err = fit_topics(&table, &ShortEngine).unwrap_err();
        assert!(matches!(err, Error::Model(_)), "got {err:?}");
    }

    fn pipeline_with(model: Arc<dyn TopicModel>) -> TopicPipeline {
        let res = LanguageResources::from_words(["the"]).unwrap();
        TopicPipeline::new("unused.csv", Normalizer::new(Arc::new(res)), model)
    }

    #[test]
    fn test_analyze_cached_without_key_never_stores() {
        let pipeline = pipeline_with(Arc::new(OneTopic));
        let cache = FitCache::default();
        let table = CommentTable::from_comments(["a", "b"]);

        let report = pipeline.analyze_cached(table, &cache, None).unwrap();

        assert!(!report.cached);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_analyze_cached_reuses_fit_for_same_key() {
        let pipeline = pipeline_with(Arc::new(OneTopic));
        let cache = FitCache::default();

        let first = pipeline
            .analyze_cached(CommentTable::from_comments(["a", "b"]), &cache, Some("k".into()))
            .unwrap();
        let second = pipeline
            .analyze_cached(CommentTable::from_comments(["a", "b"]), &cache, Some("k".into()))
            .unwrap();

        assert!(!first.cached);
        assert!(second.cached);
    }

    #[test]
    fn test_analyze_cached_refits_when_rows_do_not_match() {
        let pipeline = pipeline_with(Arc::new(OneTopic));
        let cache = FitCache::default();
        cache.insert(
            "k".into(),
            "one-topic",
            TopicFit {
                topics: vec![0],
                ..TopicFit::default()
            },
        );

        let report = pipeline
            .analyze_cached(CommentTable::from_comments(["a", "b", "c"]), &cache, Some("k".into()))
            .unwrap();

        assert!(!report.cached);
        assert_eq!(report.rows.len(), 3);
        assert!(report.rows.rows.iter().all(|r| r.topic_label == "all"));
    }

    #[test]
    fn test_from_config_missing_stopword_file_is_resource_unavailable() {
        let config = Config {
            stopwords_path: Some(std::env::temp_dir().join("comment-topics-no-stopwords-here.txt")),
            ..Config::default()
        };
        let err = TopicPipeline::from_config(&config).err().unwrap();
        assert!(matches!(err, Error::ResourceUnavailable(_)), "got {err:?}");
    }

    #[test]
    fn test_from_config_keyword_engine_with_custom_stopwords() {
        let path = std::env::temp_dir().join("comment-topics-pipeline-stopwords.txt");
        std::fs::write(&path, "pizza\n").unwrap();
        let config = Config {
            stopwords_path: Some(path.clone()),
            ..Config::default()
        };
        let pipeline = TopicPipeline::from_config(&config).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(pipeline.engine_name(), "keywords");
        assert_eq!(pipeline.normalizer.normalize("Pizza night"), "night");
    }

    #[test]
    fn test_normalize_all_preserves_order() {
        let res = LanguageResources::from_words(["the"]).unwrap();
        let normalizer = Normalizer::new(Arc::new(res));
        let mut rows = vec![CommentRecord::new("The Cat!"), CommentRecord::new("the")];
        normalize_all(&normalizer, &mut rows);
        assert_eq!(rows[0].normalized_text, "cat");
        assert_eq!(rows[1].normalized_text, "");
    }
}
