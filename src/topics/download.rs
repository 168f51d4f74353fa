// Embedding model download.
//
// Fetches all-MiniLM-L6-v2 (ONNX export + tokenizer) from HuggingFace into a
// platform data directory (~/.local/share/comment-topics/models/ on Linux) so
// it persists across runs. Only the embedding engine needs it; the default
// keyword engine runs without any model files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// HuggingFace repo for the sentence embedding model.
const EMBEDDING_HF_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

/// Remote paths within the repo, and their local names.
const EMBEDDING_MODEL_FILE: (&str, &str) = ("onnx/model.onnx", "model.onnx");
const EMBEDDING_TOKENIZER_FILE: (&str, &str) = ("tokenizer.json", "tokenizer.json");

/// Default directory for model files.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("comment-topics")
        .join("models")
}

/// Subdirectory of `base` holding the sentence embedding model.
pub fn embedding_model_dir(base: &Path) -> PathBuf {
    base.join("all-MiniLM-L6-v2")
}

/// Whether both embedding model files exist under `base`.
pub fn embedding_files_present(base: &Path) -> bool {
    let dir = embedding_model_dir(base);
    dir.join(EMBEDDING_MODEL_FILE.1).exists() && dir.join(EMBEDDING_TOKENIZER_FILE.1).exists()
}

/// Download the embedding model into `base`, skipping files already present.
pub async fn download_model(base: &Path) -> Result<()> {
    let dir = embedding_model_dir(base);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    println!("\nSentence embedding model (all-MiniLM-L6-v2):");

    for ((remote, local), large) in [
        (EMBEDDING_TOKENIZER_FILE, false),
        (EMBEDDING_MODEL_FILE, true),
    ] {
        let dest = dir.join(local);
        if dest.exists() {
            info!(file = local, "Model file already exists, skipping");
            println!("  {local} (already exists)");
            continue;
        }

        if large {
            println!("  Downloading {local} (~90 MB)...");
        } else {
            println!("  Downloading {local}...");
        }
        download_file(&format!("{EMBEDDING_HF_URL}/{remote}"), &dest, large).await?;
    }

    Ok(())
}

/// Download a single file from a URL to a local path.
/// If `show_progress` is true, display a progress bar.
async fn download_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let pb = if show_progress {
        Some(progress_bar(response.content_length())?)
    } else {
        None
    };

    let bytes = response
        .bytes()
        .await
        .context("Failed to read response body")?;

    if let Some(ref pb) = pb {
        pb.set_position(bytes.len() as u64);
    }

    std::fs::write(dest, &bytes).with_context(|| format!("Failed to write {}", dest.display()))?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!("Downloaded {} to {}", url, dest.display());
    Ok(())
}

fn progress_bar(total_size: Option<u64>) -> Result<ProgressBar> {
    let pb = match total_size {
        Some(size) => {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .context("invalid progress template")?
                    .progress_chars("=> "),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("    {spinner} {bytes}")
                    .context("invalid progress template")?,
            );
            pb
        }
    };
    Ok(pb)
}
