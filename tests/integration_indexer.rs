#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

/// Catalog -> indexer -> LanceDB -> retriever, with a deterministic embedder
use std::sync::Arc;

use parts_assistant::assistant::Retriever;
use parts_assistant::catalog::sample::generate_sample_catalog;
use parts_assistant::catalog::{load_catalog, write_catalog};
use parts_assistant::config::{Config, OllamaConfig};
use parts_assistant::database::{PartStore, VectorStore};
use parts_assistant::embeddings::Embedder;
use parts_assistant::indexer::Indexer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;

const DIMENSION: usize = 16;

struct HashingEmbedder;

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> parts_assistant::Result<Vec<f32>> {
        let mut vector = vec![0.0; DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(7_usize, |acc, b| acc.wrapping_mul(31).wrapping_add(usize::from(b)))
                % DIMENSION;
            vector[bucket] += 1.0;
        }
        Ok(vector)
    }
}

fn create_test_config() -> (Config, TempDir) {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config {
        base_dir: temp_dir.path().to_path_buf(),
        ollama: OllamaConfig {
            embedding_dimension: DIMENSION as u32,
            ..OllamaConfig::default()
        },
        ..Config::default()
    };
    (config, temp_dir)
}

async fn store_for(config: &Config) -> Arc<dyn PartStore> {
    Arc::new(
        VectorStore::new(config)
            .await
            .expect("should open vector store"),
    )
}

#[tokio::test]
async fn sample_catalog_round_trips_through_the_store() {
    let (config, temp_dir) = create_test_config();
    let catalog_path = temp_dir.path().join("sample.csv");
    let entries = generate_sample_catalog(50, &mut StdRng::seed_from_u64(9))
        .expect("should generate sample");
    write_catalog(&catalog_path, &entries).expect("should write catalog");

    let store = store_for(&config).await;
    let stats = Indexer::new(Arc::clone(&store), Arc::new(HashingEmbedder))
        .with_batch_size(8)
        .rebuild_from_csv(&catalog_path)
        .await
        .expect("should index catalog");

    assert_eq!(stats.parts_indexed, 50);
    assert_eq!(stats.batches, 7);
    assert_eq!(stats.embedding_dimension, DIMENSION);
    assert_eq!(store.count().await.expect("should count"), 50);

    for entry in load_catalog(&catalog_path).expect("should reload catalog") {
        let found = store
            .find_by_part_number(&entry.part_number)
            .await
            .expect("lookup should succeed")
            .expect("every catalog part should be stored");
        assert_eq!(found.title, entry.title);
        assert_eq!(found.category, entry.category);
    }
}

#[tokio::test]
async fn reindexing_replaces_the_collection() {
    let (config, _temp_dir) = create_test_config();
    let store = store_for(&config).await;
    let indexer = Indexer::new(Arc::clone(&store), Arc::new(HashingEmbedder));

    let first = generate_sample_catalog(20, &mut StdRng::seed_from_u64(1))
        .expect("should generate sample");
    let second = generate_sample_catalog(6, &mut StdRng::seed_from_u64(2))
        .expect("should generate sample");

    indexer.rebuild(first.clone()).await.expect("first rebuild");
    indexer.rebuild(second.clone()).await.expect("second rebuild");

    assert_eq!(store.count().await.expect("should count"), 6);

    let stale = first
        .iter()
        .find(|entry| second.iter().all(|s| s.part_number != entry.part_number))
        .expect("catalogs should differ");
    assert!(
        store
            .find_by_part_number(&stale.part_number)
            .await
            .expect("lookup should succeed")
            .is_none()
    );
}

#[tokio::test]
async fn retriever_uses_exact_then_semantic_lookup() {
    let (config, temp_dir) = create_test_config();
    let catalog_path = temp_dir.path().join("parts.csv");
    std::fs::write(
        &catalog_path,
        "category,part_number,title,description\n\
         refrigerator,PS11446081,Refrigerator Water Filter,Water filter removes contaminants.\n\
         refrigerator,PS10000002,Refrigerator Ice Maker Assembly,Ice maker assembly makes ice.\n\
         dishwasher,PS20000001,Dishwasher Upper Rack,Upper rack holds cups.\n\
         dishwasher,PS20000002,Dishwasher Drain Pump,Drain pump removes water.\n",
    )
    .expect("should write catalog");

    let store = store_for(&config).await;
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder);
    Indexer::new(Arc::clone(&store), Arc::clone(&embedder))
        .rebuild_from_csv(&catalog_path)
        .await
        .expect("should index catalog");

    let retriever = Retriever::new(store, embedder);

    let exact = retriever
        .retrieve("PS20000002 please", Some("PS20000002"))
        .await
        .expect("should retrieve");
    assert!(exact.is_exact());
    assert_eq!(exact.parts.len(), 1);
    assert_eq!(exact.parts[0].part.title, "Dishwasher Drain Pump");

    let fallback = retriever
        .retrieve("Ice maker assembly makes ice.", Some("PS99999999"))
        .await
        .expect("should retrieve");
    assert!(!fallback.is_exact());
    assert_eq!(fallback.parts.len(), 3);
    assert_eq!(fallback.parts[0].part.part_number, "PS10000002");
}
