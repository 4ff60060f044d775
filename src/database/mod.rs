// Database module
// LanceDB holds the part records together with their embeddings

pub mod lancedb;

pub use self::lancedb::vector_store::{SearchResult, VectorStore};
pub use self::lancedb::{PartMetadata, PartRecord};

use async_trait::async_trait;

use crate::Result;

/// Storage operations the assistant and the indexer depend on
#[async_trait]
pub trait PartStore: Send + Sync {
    /// Equality lookup on the part number, zero or one record
    async fn find_by_part_number(&self, part_number: &str) -> Result<Option<PartMetadata>>;

    /// Nearest neighbours of `query_vector`, closest first
    async fn search_similar(&self, query_vector: &[f32], limit: usize)
    -> Result<Vec<SearchResult>>;

    /// Drop every record, then insert `records`
    async fn replace_all(&self, records: Vec<PartRecord>) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    async fn count(&self) -> Result<u64>;
}
