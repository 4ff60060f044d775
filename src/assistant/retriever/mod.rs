
use std::sync::Arc;
use tracing::{debug, info};

use crate::database::{PartMetadata, PartStore};
use crate::embeddings::Embedder;
use crate::{PartsError, Result};

pub const DEFAULT_MAX_RESULTS: usize = 3;

/// A candidate part and, for semantic hits, its distance to the query
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedPart {
    pub part: PartMetadata,
    pub distance: Option<f32>,
}

impl RetrievedPart {
    #[inline]
    pub fn exact(part: PartMetadata) -> Self {
        Self {
            part,
            distance: None,
        }
    }

    #[inline]
    pub fn similar(part: PartMetadata, distance: f32) -> Self {
        Self {
            part,
            distance: Some(distance),
        }
    }
}

/// Candidates for one query, most relevant first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Retrieval {
    pub parts: Vec<RetrievedPart>,
    /// Part number resolved by equality lookup, `None` for semantic results
    pub exact_match: Option<String>,
}

impl Retrieval {
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.exact_match.is_some()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Two-tier lookup: part number equality first, nearest neighbours otherwise
#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn PartStore>,
    embedder: Arc<dyn Embedder>,
    max_results: usize,
}

impl Retriever {
    #[inline]
    pub fn new(store: Arc<dyn PartStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    #[inline]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// Resolve `query` to candidate parts.
    ///
    /// An unknown `part_number` falls through to semantic search over the
    /// full query text rather than ending the lookup.
    #[inline]
    pub async fn retrieve(&self, query: &str, part_number: Option<&str>) -> Result<Retrieval> {
        if let Some(part_number) = part_number {
            if let Some(part) = self.store.find_by_part_number(part_number).await? {
                info!("Exact match found for {}", part_number);
                return Ok(Retrieval {
                    parts: vec![RetrievedPart::exact(part)],
                    exact_match: Some(part_number.to_string()),
                });
            }
            info!(
                "No exact match for {}, falling back to semantic search",
                part_number
            );
        }

        let query_vector = self.embed_query(query).await?;
        let results = self
            .store
            .search_similar(&query_vector, self.max_results)
            .await?;

        debug!("Semantic search returned {} candidates", results.len());

        Ok(Retrieval {
            parts: results
                .into_iter()
                .take(self.max_results)
                .map(|result| RetrievedPart::similar(result.metadata, result.distance))
                .collect(),
            exact_match: None,
        })
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let embedder = Arc::clone(&self.embedder);
        let query = query.to_string();

        tokio::task::spawn_blocking(move || embedder.embed(&query))
            .await
            .map_err(|e| PartsError::Embedding(format!("Embedding task failed: {}", e)))?
    }
}
