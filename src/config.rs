use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::topics::download::{default_model_dir, embedding_files_present};

/// Which topic engine to fit with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// TF-IDF keyword grouping (default), needs no model files
    Keywords,
    /// Sentence embeddings via local ONNX model, needs `download-model`
    Embeddings,
}

impl Engine {
    /// Parse an engine name. Unset or unrecognized values fall back to Keywords.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(|n| n.trim().to_ascii_lowercase()).as_deref() {
            Some("embeddings") | Some("embedding") => Engine::Embeddings,
            _ => Engine::Keywords,
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// variable has a default, so an empty environment serves
/// `data/comments_data_latest.xlsx` with the keyword engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Spreadsheet loaded on every request
    pub data_path: PathBuf,
    pub engine: Engine,
    /// Base directory for model files
    pub model_dir: PathBuf,
    /// Custom stopword list (one word per line); built-in English when unset
    pub stopwords_path: Option<PathBuf>,
    /// Groups smaller than this become outliers
    pub min_topic_size: usize,
    /// Reuse fits for unchanged input files
    pub cache_fits: bool,
    /// Reject files without a `comment_text` column at load time
    pub strict_schema: bool,
}

pub const DEFAULT_DATA_PATH: &str = "data/comments_data_latest.xlsx";
pub const DEFAULT_MIN_TOPIC_SIZE: usize = 2;

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            engine: Engine::Keywords,
            model_dir: default_model_dir(),
            stopwords_path: None,
            min_topic_size: DEFAULT_MIN_TOPIC_SIZE,
            cache_fits: false,
            strict_schema: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let min_topic_size = match env::var("COMMENT_TOPICS_MIN_TOPIC_SIZE") {
            Ok(raw) => raw.trim().parse::<usize>().map_err(|_| {
                anyhow::anyhow!(
                    "COMMENT_TOPICS_MIN_TOPIC_SIZE must be a positive integer, got '{raw}'"
                )
            })?,
            Err(_) => defaults.min_topic_size,
        };
        if min_topic_size == 0 {
            anyhow::bail!("COMMENT_TOPICS_MIN_TOPIC_SIZE must be at least 1");
        }

        Ok(Self {
            data_path: env::var("COMMENT_TOPICS_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            engine: Engine::from_name(env::var("COMMENT_TOPICS_ENGINE").ok().as_deref()),
            model_dir: env::var("COMMENT_TOPICS_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            stopwords_path: env::var("COMMENT_TOPICS_STOPWORDS")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            min_topic_size,
            cache_fits: env_flag("COMMENT_TOPICS_CACHE", defaults.cache_fits),
            strict_schema: env_flag("COMMENT_TOPICS_STRICT_SCHEMA", defaults.strict_schema),
        })
    }

    /// Validate that the chosen engine has what it needs.
    /// For Embeddings: model files must exist (or user should run download-model).
    pub fn require_engine(&self) -> Result<()> {
        match self.engine {
            Engine::Keywords => Ok(()),
            Engine::Embeddings => {
                if !embedding_files_present(&self.model_dir) {
                    anyhow::bail!(
                        "Embedding model files not found in {}\n\
                         Run `comment-topics download-model` to download them.\n\
                         Or set COMMENT_TOPICS_ENGINE=keywords to use the keyword engine instead.",
                        self.model_dir.display()
                    );
                }
                Ok(())
            }
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|v| parse_flag(&v, default))
        .unwrap_or(default)
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
