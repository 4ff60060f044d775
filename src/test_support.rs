// In-memory collaborators for unit tests

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::completion::{ChatMessage, CompletionClient, CompletionOutcome};
use crate::database::{PartMetadata, PartRecord, PartStore, SearchResult};
use crate::embeddings::Embedder;
use crate::{PartsError, Result};

pub const FAKE_DIMENSION: usize = 8;

pub fn metadata(part_number: &str, category: &str, title: &str, description: &str) -> PartMetadata {
    PartMetadata {
        part_number: part_number.to_string(),
        category: category.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        url: String::new(),
        indexed_at: "2025-01-01T00:00:00+00:00".to_string(),
    }
}

/// Bag-of-words vector: each word bumps one bucket picked by its bytes
pub fn fake_vector(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0_f32; FAKE_DIMENSION];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let bucket = word
            .to_lowercase()
            .bytes()
            .fold(0_usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
            % FAKE_DIMENSION;
        vector[bucket] += 1.0;
    }
    vector
}

pub fn record(part: PartMetadata) -> PartRecord {
    PartRecord {
        vector: fake_vector(&part.description),
        metadata: part,
    }
}

#[derive(Default)]
pub struct FakeStore {
    records: Mutex<Vec<PartRecord>>,
    failure: Option<String>,
    pub lookups: AtomicUsize,
    pub searches: AtomicUsize,
}

impl FakeStore {
    pub fn with_parts(parts: Vec<PartMetadata>) -> Self {
        Self {
            records: Mutex::new(parts.into_iter().map(record).collect()),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Vec<PartRecord> {
        self.records.lock().expect("should lock records").clone()
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(PartsError::Database(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PartStore for FakeStore {
    async fn find_by_part_number(&self, part_number: &str) -> Result<Option<PartMetadata>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .records
            .lock()
            .expect("should lock records")
            .iter()
            .find(|r| r.metadata.part_number == part_number)
            .map(|r| r.metadata.clone()))
    }

    async fn search_similar(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let mut results: Vec<SearchResult> = self
            .records
            .lock()
            .expect("should lock records")
            .iter()
            .map(|r| {
                let distance: f32 = r
                    .vector
                    .iter()
                    .zip(query_vector)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                SearchResult {
                    metadata: r.metadata.clone(),
                    distance,
                }
            })
            .collect();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(limit);
        Ok(results)
    }

    async fn replace_all(&self, records: Vec<PartRecord>) -> Result<()> {
        self.check()?;
        *self.records.lock().expect("should lock records") = records;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.check()?;
        self.records.lock().expect("should lock records").clear();
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        self.check()?;
        Ok(self.records.lock().expect("should lock records").len() as u64)
    }
}

#[derive(Default)]
pub struct FakeEmbedder {
    failure: Option<String>,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for FakeEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(PartsError::Embedding(message.clone())),
            None => Ok(fake_vector(text)),
        }
    }
}

pub struct FakeCompletion {
    outcome: CompletionOutcome,
    received: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeCompletion {
    pub fn replying(outcome: CompletionOutcome) -> Self {
        Self {
            outcome,
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn completed(reply: &str) -> Self {
        Self::replying(CompletionOutcome::Completed(reply.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.received.lock().expect("should lock messages").len()
    }

    pub fn last_messages(&self) -> Option<Vec<ChatMessage>> {
        self.received
            .lock()
            .expect("should lock messages")
            .last()
            .cloned()
    }
}

impl CompletionClient for FakeCompletion {
    fn complete(&self, messages: &[ChatMessage]) -> CompletionOutcome {
        self.received
            .lock()
            .expect("should lock messages")
            .push(messages.to_vec());
        self.outcome.clone()
    }
}
