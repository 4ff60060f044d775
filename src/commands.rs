use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::assistant::{Assistant, QueryClassifier, Retriever};
use crate::catalog::sample::generate_sample_catalog;
use crate::catalog::write_catalog;
use crate::completion::OpenAiClient;
use crate::config::Config;
use crate::database::{PartStore, VectorStore};
use crate::embeddings::OllamaClient;
use crate::indexer::Indexer;
use crate::server::{self, AppState};

/// Collaborators shared by every request, built once at start-up
pub struct Services {
    pub assistant: Assistant,
    pub store: Arc<dyn PartStore>,
}

/// Wire the assistant from configuration
#[inline]
pub async fn build_services(config: &Config) -> Result<Services> {
    let store: Arc<dyn PartStore> = Arc::new(
        VectorStore::new(config)
            .await
            .context("Failed to initialize LanceDB vector store")?,
    );

    // The request pipeline never retries
    let embedder = Arc::new(
        OllamaClient::new(&config.ollama)
            .context("Failed to initialize Ollama client")?
            .with_retry_attempts(1),
    );

    let completion = Arc::new(
        OpenAiClient::new(&config.completion)
            .context("Failed to initialize completion client")?,
    );

    let classifier = QueryClassifier::from_scope(&config.scope)?;
    let retriever =
        Retriever::new(Arc::clone(&store), embedder).with_max_results(config.scope.max_results);

    Ok(Services {
        assistant: Assistant::new(classifier, retriever, completion),
        store,
    })
}

/// Run the HTTP service until interrupted
#[inline]
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let services = build_services(&config).await?;
    match services.store.count().await {
        Ok(0) => warn!("Part store is empty; run `parts-assistant index <csv>` first"),
        Ok(count) => info!("Serving {} indexed parts", count),
        Err(e) => warn!("Could not count indexed parts: {}", e),
    }

    server::serve(
        &config.server,
        AppState {
            assistant: services.assistant,
            store: services.store,
        },
    )
    .await
}

/// Run one query through the pipeline and print the reply
#[inline]
pub async fn ask(query: &str) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let services = build_services(&config).await?;

    let reply = services.assistant.answer(query).await;
    println!("{}", reply);

    Ok(())
}

/// Rebuild the part store from a catalog CSV
#[inline]
pub async fn index_catalog(path: &Path) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    let embedder = OllamaClient::new(&config.ollama).context("Failed to initialize Ollama client")?;
    embedder
        .health_check()
        .context("Embedding service is not ready")?;

    let store = Arc::new(
        VectorStore::new(&config)
            .await
            .context("Failed to initialize LanceDB vector store")?,
    );

    let batch_size = usize::try_from(config.ollama.batch_size).unwrap_or(usize::MAX);
    let stats = Indexer::new(store, Arc::new(embedder))
        .with_batch_size(batch_size)
        .rebuild_from_csv(path)
        .await
        .with_context(|| format!("Failed to index {}", path.display()))?;

    println!("✅ Indexed {} parts from {}", stats.parts_indexed, path.display());
    println!("   Embedding dimension: {}", stats.embedding_dimension);
    println!("   Batches: {}", stats.batches);
    println!("   Duration: {:.2}s", stats.duration.as_secs_f64());

    Ok(())
}

/// Write a sample catalog with `count` parts
#[inline]
pub fn generate_sample(output: &Path, count: usize) -> Result<()> {
    let entries = generate_sample_catalog(count, &mut rand::thread_rng())?;
    write_catalog(output, &entries)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let refrigerator = entries
        .iter()
        .filter(|e| e.category == "refrigerator")
        .count();
    println!("✅ Saved {} parts to {}", entries.len(), output.display());
    println!("   Refrigerator: {}", refrigerator);
    println!("   Dishwasher: {}", entries.len() - refrigerator);

    Ok(())
}

/// Report collaborator health and configuration
#[inline]
pub async fn show_status() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("📊 Parts Assistant Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("🤖 Ollama Status:");
    match OllamaClient::new(&config.ollama) {
        Ok(client) => match client.ping() {
            Ok(()) => {
                println!(
                    "   ✅ Ollama: Connected ({}:{})",
                    config.ollama.host, config.ollama.port
                );
                match client.validate_model() {
                    Ok(()) => println!("   📋 Model: {}", client.model()),
                    Err(e) => println!("   ⚠️  Model: {} - {}", client.model(), e),
                }
                println!("   🔢 Batch Size: {}", config.ollama.batch_size);
            }
            Err(e) => {
                println!(
                    "   ❌ Ollama: Unreachable at {}:{} - {:#}",
                    config.ollama.host, config.ollama.port, e
                );
            }
        },
        Err(e) => {
            println!("   ❌ Ollama: Invalid client configuration - {}", e);
        }
    }

    println!("🔍 Vector Database Status:");
    match VectorStore::new(&config).await {
        Ok(store) => match store.count_records().await {
            Ok(count) => {
                println!("   ✅ LanceDB: Connected");
                println!("   📦 Indexed parts: {}", count);
            }
            Err(e) => println!("   ⚠️  LanceDB: Connected but unreadable - {}", e),
        },
        Err(e) => {
            println!("   ❌ LanceDB: Failed to connect - {}", e);
        }
    }

    println!("💬 Completion Service:");
    println!("   🌐 Endpoint: {}", config.completion.endpoint);
    println!("   📋 Model: {}", config.completion.model);
    println!("   ⏱️  Timeout: {}s", config.completion.timeout_seconds);
    if config.completion.has_api_key() {
        println!("   🔑 API key: configured");
    } else {
        println!("   ⚠️  API key: missing (set DEEPSEEK_API_KEY)");
    }

    println!("🌐 HTTP Server:");
    println!("   📍 Bind: {}", config.server.bind_address());
    println!("   🔓 CORS origins: {}", config.server.allowed_origins.join(", "));

    Ok(())
}
