// Fit cache keyed on the input file's content hash.
//
// Off by default: each request then re-fits from scratch. When enabled, an
// unchanged spreadsheet reuses the previous fit for the same engine, while
// normalization and labeling still run on the freshly loaded rows.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::{Error, Result};
use crate::topics::traits::TopicFit;

/// Default number of fits kept.
const DEFAULT_CAPACITY: usize = 8;

/// SHA-256 of the file's bytes, hex encoded.
pub fn content_hash(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::data_load(path, format!("unable to read for hashing: {e}")))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

struct Entry {
    hash: String,
    engine: &'static str,
    fit: TopicFit,
}

/// Small bounded cache; the oldest entry is evicted when full.
pub struct FitCache {
    capacity: usize,
    entries: Mutex<VecDeque<Entry>>,
}

impl Default for FitCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl FitCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn get(&self, hash: &str, engine: &str) -> Option<TopicFit> {
        let entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Fit cache lock poisoned; treating as miss");
                return None;
            }
        };
        entries
            .iter()
            .find(|e| e.hash == hash && e.engine == engine)
            .map(|e| e.fit.clone())
    }

    pub fn insert(&self, hash: String, engine: &'static str, fit: TopicFit) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Fit cache lock poisoned; dropping insert");
                return;
            }
        };
        entries.retain(|e| !(e.hash == hash && e.engine == engine));
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(Entry { hash, engine, fit });
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
