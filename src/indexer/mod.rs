// Indexer module
// Full rebuild of the part store from a catalog: embed every description,
// then clear the collection and insert the new records in one step


use chrono::{SecondsFormat, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::catalog::{CatalogEntry, load_catalog};
use crate::database::{PartRecord, PartStore};
use crate::embeddings::Embedder;
use crate::{PartsError, Result};

const DEFAULT_BATCH_SIZE: usize = 16;

/// Statistics about one rebuild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingStats {
    pub parts_indexed: usize,
    pub batches: usize,
    pub embedding_dimension: usize,
    pub duration: Duration,
}

pub struct Indexer {
    store: Arc<dyn PartStore>,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

impl Indexer {
    #[inline]
    pub fn new(store: Arc<dyn PartStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[inline]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Load `path` and rebuild the store from it
    #[inline]
    pub async fn rebuild_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<IndexingStats> {
        let entries = load_catalog(path)?;
        self.rebuild(entries).await
    }

    /// Replace the store contents with `entries`.
    ///
    /// Embeddings are computed before anything is written, so an embedding
    /// failure leaves the previous collection in place.
    #[inline]
    pub async fn rebuild(&self, entries: Vec<CatalogEntry>) -> Result<IndexingStats> {
        let start = Instant::now();
        let indexed_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false);
        info!("Rebuilding part store from {} catalog entries", entries.len());

        let bar = progress_bar(entries.len() as u64);
        let mut records = Vec::with_capacity(entries.len());
        let mut batches = 0;
        let mut dimension = None;

        for batch in entries.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|e| e.description.clone()).collect();
            let vectors = self.embed_batch(texts).await?;

            if vectors.len() != batch.len() {
                return Err(PartsError::Embedding(format!(
                    "Expected {} embeddings, received {}",
                    batch.len(),
                    vectors.len()
                )));
            }

            for (entry, vector) in batch.iter().zip(vectors) {
                let expected = *dimension.get_or_insert(vector.len());
                if vector.len() != expected || expected == 0 {
                    return Err(PartsError::Embedding(format!(
                        "Embedding for {} has dimension {}, expected {}",
                        entry.part_number,
                        vector.len(),
                        expected
                    )));
                }

                records.push(PartRecord {
                    vector,
                    metadata: entry.clone().into_metadata(&indexed_at),
                });
            }

            batches += 1;
            bar.inc(batch.len() as u64);
            debug!("Embedded batch {} ({} parts)", batches, batch.len());
        }

        bar.finish_and_clear();

        let parts_indexed = records.len();
        self.store.replace_all(records).await?;

        let stats = IndexingStats {
            parts_indexed,
            batches,
            embedding_dimension: dimension.unwrap_or(0),
            duration: start.elapsed(),
        };
        info!(
            "Indexed {} parts in {:.2}s",
            stats.parts_indexed,
            stats.duration.as_secs_f64()
        );
        Ok(stats)
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let embedder = Arc::clone(&self.embedder);
        tokio::task::spawn_blocking(move || embedder.embed_batch(&texts))
            .await
            .map_err(|e| PartsError::Embedding(format!("Embedding task failed: {}", e)))?
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    if !console::user_attended_stderr() {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} Embedding parts")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len).with_style(style)
}
