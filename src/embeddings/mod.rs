// Embeddings module
// Text to vector conversion shared by the indexer and the query path

pub mod ollama;

pub use ollama::OllamaClient;

use crate::Result;

/// Maps free text to a fixed-length vector.
///
/// Indexing and serving must use the same model, otherwise distances between
/// stored and query vectors are meaningless.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}
