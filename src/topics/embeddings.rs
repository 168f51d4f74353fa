// Sentence-embedding topic model using all-MiniLM-L6-v2.
//
// Keyword matching fails when two comments say the same thing in different
// words. This engine embeds each comment into a 384-dimensional vector and
// groups comments whose vectors point the same way, so "loved the song" and
// "great track" can land together with zero shared tokens.
//
// The model runs locally via ONNX. Mean pooling is applied to token
// embeddings (matching the model's training). Grouping is a single-pass
// leader clustering: each unassigned comment seeds a group and absorbs every
// later unassigned comment within the cosine threshold.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::summary::{summarize, SummaryParams};
use super::traits::{TopicFit, TopicModel};
use crate::error::Error;

/// Embedding dimension for all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Sentence embedder backed by a local ONNX model.
///
/// Arc<Mutex<Session>> because ort sessions need exclusive access to run,
/// and the embedder is shared across request workers.
pub struct SentenceEmbedder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl SentenceEmbedder {
    /// Load the model and tokenizer from `model_dir`.
    ///
    /// Expects `model.onnx` and `tokenizer.json`. Missing files are reported
    /// as ResourceUnavailable with a hint to run `download-model`.
    pub fn load(model_dir: &Path) -> std::result::Result<Self, Error> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        for path in [&model_path, &tokenizer_path] {
            if !path.exists() {
                return Err(Error::ResourceUnavailable(format!(
                    "embedding model file not found: {}\nRun `comment-topics download-model` to download it.",
                    path.display()
                )));
            }
        }

        let session = open_session(&model_path)
            .map_err(|e| Error::ResourceUnavailable(format!("{e:#}")))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            Error::ResourceUnavailable(format!("Failed to load embedding tokenizer: {e}"))
        })?;

        debug!("Loaded sentence embedding model from {}", model_dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }

    /// Embed a batch of texts into 384-dimensional vectors.
    ///
    /// Each text is tokenized, run through the model, and mean-pooled
    /// (averaged across tokens, weighted by attention mask). Blocking; callers
    /// on an async runtime should be on a blocking worker.
    pub fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings: Vec<_> = texts
            .iter()
            .map(|t| {
                self.tokenizer
                    .encode(t.as_str(), true)
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let batch_size = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        if max_len == 0 {
            return Ok(vec![vec![0.0; EMBEDDING_DIM]; batch_size]);
        }

        // Padded input tensors:
        //   input_ids: token IDs (pad with 0)
        //   attention_mask: 1 for real tokens, 0 for padding
        //   token_type_ids: all zeros for single-sentence input
        let mut input_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let mut attention_mask_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let mut token_type_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);

        for enc in &encodings {
            let ids = enc.get_ids();
            let mask = enc.get_attention_mask();
            let seq_len = ids.len();
            let pad_len = max_len - seq_len;

            input_ids_flat.extend(ids.iter().map(|&id| id as i64));
            attention_mask_flat.extend(mask.iter().map(|&m| m as i64));
            token_type_ids_flat.extend(std::iter::repeat_n(0i64, seq_len));

            input_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
            attention_mask_flat.extend(std::iter::repeat_n(0i64, pad_len));
            token_type_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
        }

        let shape = [batch_size as i64, max_len as i64];

        let input_ids_tensor = Tensor::from_array((shape, input_ids_flat))
            .context("Failed to create input_ids tensor")?;
        let attention_mask_tensor = Tensor::from_array((shape, attention_mask_flat.clone()))
            .context("Failed to create attention_mask tensor")?;
        let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids_flat))
            .context("Failed to create token_type_ids tensor")?;

        // Output is last_hidden_state: [batch, seq_len, 384]
        let hidden_states = {
            let mut session = self
                .session
                .lock()
                .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

            let outputs = session
                .run(ort::inputs! {
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor
                })
                .context("Embedding ONNX inference failed")?;

            let (_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .context("Failed to extract embedding output tensor")?;

            data.to_vec()
        };

        let mut embeddings = Vec::with_capacity(batch_size);
        for i in 0..batch_size {
            let mut sum = vec![0.0_f64; EMBEDDING_DIM];
            let mut mask_sum = 0.0_f64;

            for j in 0..max_len {
                let mask_val = attention_mask_flat[i * max_len + j] as f64;
                if mask_val > 0.0 {
                    mask_sum += mask_val;
                    let offset = (i * max_len + j) * EMBEDDING_DIM;
                    for (k, slot) in sum.iter_mut().enumerate() {
                        *slot += hidden_states[offset + k] as f64 * mask_val;
                    }
                }
            }

            if mask_sum > 0.0 {
                for val in &mut sum {
                    *val /= mask_sum;
                }
            }

            embeddings.push(sum);
        }

        debug!(batch_size, dim = EMBEDDING_DIM, "Computed sentence embeddings");
        Ok(embeddings)
    }
}

fn open_session(model_path: &Path) -> Result<Session> {
    let session = Session::builder()
        .context("Failed to create ONNX session builder")?
        .commit_from_file(model_path)
        .with_context(|| format!("Failed to load embedding model from {}", model_path.display()))?;
    Ok(session)
}

/// Cosine similarity in [0, 1]; opposite or degenerate vectors score 0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    let denom = mag_a * mag_b;
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(0.0, 1.0)
    }
}

/// Single-pass leader clustering over embeddings.
///
/// Walks vectors in order; each unassigned vector seeds a group and takes
/// every later unassigned vector whose cosine similarity to the seed is at
/// least `threshold`.
pub fn leader_cluster(embeddings: &[Vec<f64>], threshold: f64) -> Vec<Option<usize>> {
    let mut groups: Vec<Option<usize>> = vec![None; embeddings.len()];
    let mut next_group = 0;

    for seed in 0..embeddings.len() {
        if groups[seed].is_some() {
            continue;
        }
        groups[seed] = Some(next_group);

        for other in (seed + 1)..embeddings.len() {
            if groups[other].is_none()
                && cosine_similarity(&embeddings[seed], &embeddings[other]) >= threshold
            {
                groups[other] = Some(next_group);
            }
        }
        next_group += 1;
    }

    groups
}

/// Topic model that clusters sentence embeddings.
pub struct EmbeddingTopicModel {
    embedder: SentenceEmbedder,
    /// Minimum cosine similarity to a group's seed
    pub threshold: f64,
    pub summary: SummaryParams,
}

impl EmbeddingTopicModel {
    pub fn new(embedder: SentenceEmbedder) -> Self {
        Self {
            embedder,
            threshold: 0.55,
            summary: SummaryParams::default(),
        }
    }

    /// Load the embedder from `model_dir` (the all-MiniLM-L6-v2 subdirectory).
    pub fn load(model_dir: &Path) -> std::result::Result<Self, Error> {
        Ok(Self::new(SentenceEmbedder::load(model_dir)?))
    }

    pub fn with_min_topic_size(mut self, min_topic_size: usize) -> Self {
        self.summary.min_topic_size = min_topic_size;
        self
    }
}

impl TopicModel for EmbeddingTopicModel {
    fn name(&self) -> &'static str {
        "embeddings"
    }

    fn fit_transform(&self, documents: &[String]) -> Result<TopicFit> {
        if documents.is_empty() {
            anyhow::bail!("No documents to model; cannot fit topics on an empty corpus");
        }

        let embeddings = self.embedder.embed(documents)?;
        let groups = leader_cluster(&embeddings, self.threshold);

        info!(
            documents = documents.len(),
            raw_groups = groups.iter().flatten().max().map_or(0, |g| g + 1),
            threshold = self.threshold,
            "Clustered sentence embeddings"
        );

        Ok(summarize(documents, &groups, self.summary))
    }
}
