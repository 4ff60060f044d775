// LanceDB vector database module
// Stores one row per part: metadata, description and embedding


pub mod vector_store;

use serde::{Deserialize, Serialize};

/// Part record stored in LanceDB
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartRecord {
    /// Embedding of `metadata.description`
    pub vector: Vec<f32>,
    pub metadata: PartMetadata,
}

/// Everything stored for a part except its vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartMetadata {
    /// Canonical uppercase identifier, e.g. `PS11446081`
    pub part_number: String,
    /// Appliance category (`refrigerator`, `dishwasher`)
    pub category: String,
    pub title: String,
    /// Free text that was embedded and is shown to the generator
    pub description: String,
    /// Product page, empty when the catalog has none
    pub url: String,
    /// RFC 3339 timestamp of the rebuild that wrote this row
    pub indexed_at: String,
}

impl PartRecord {
    #[inline]
    pub fn part_number(&self) -> &str {
        &self.metadata.part_number
    }
}
