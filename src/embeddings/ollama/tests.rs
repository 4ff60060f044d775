use super::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> OllamaConfig {
    let address = server.address();
    OllamaConfig {
        host: address.ip().to_string(),
        port: address.port(),
        model: "test-model".to_string(),
        batch_size: 2,
        ..OllamaConfig::default()
    }
}

#[test]
fn client_configuration() {
    let config = OllamaConfig {
        protocol: "http".to_string(),
        host: "test-host".to_string(),
        port: 1234,
        model: "test-model".to_string(),
        batch_size: 128,
        embedding_dimension: 384,
    };
    let client = OllamaClient::new(&config).expect("Failed to create client");

    assert_eq!(client.model(), "test-model");
    assert_eq!(client.batch_size, 128);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
    assert_eq!(client.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
}

#[test]
fn client_builder_methods() {
    let config = OllamaConfig::default();
    let client = OllamaClient::new(&config)
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60))
        .with_retry_attempts(5);

    assert_eq!(client.retry_attempts, 5);

    let client = client.with_retry_attempts(0);
    assert_eq!(client.retry_attempts, 1);
}

#[tokio::test]
async fn single_embedding_uses_embed_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "input": ["water filter"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "embeddings": [[0.1, 0.2, 0.3]] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&config_for(&server)).expect("should create client");
    let embedding = tokio::task::spawn_blocking(move || client.generate_embedding("water filter"))
        .await
        .expect("task should join")
        .expect("embedding should succeed");

    assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn batch_embeddings_are_split_by_batch_size() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({ "input": ["a", "b"] })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "embeddings": [[1.0], [2.0]] })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({ "input": ["c"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embeddings": [[3.0]] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&config_for(&server)).expect("should create client");
    let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let embeddings = tokio::task::spawn_blocking(move || client.embed_batch(&texts))
        .await
        .expect("task should join")
        .expect("batch should succeed");

    assert_eq!(embeddings, vec![vec![1.0], vec![2.0], vec![3.0]]);
}

#[tokio::test]
async fn count_mismatch_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embeddings": [] })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&config_for(&server)).expect("should create client");
    let result = tokio::task::spawn_blocking(move || client.embed("anything"))
        .await
        .expect("task should join");

    assert!(matches!(result, Err(PartsError::Embedding(_))));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&config_for(&server)).expect("should create client");
    let result = tokio::task::spawn_blocking(move || client.generate_embedding("anything"))
        .await
        .expect("task should join");

    assert!(result.is_err());
}

#[tokio::test]
async fn single_attempt_client_does_not_retry_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&config_for(&server))
        .expect("should create client")
        .with_retry_attempts(1);
    let result = tokio::task::spawn_blocking(move || client.generate_embedding("anything"))
        .await
        .expect("task should join");

    assert!(result.is_err());
}

#[tokio::test]
async fn health_check_requires_configured_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "0.5.7" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                { "name": "test-model", "size": 45000000, "digest": "abc" },
                { "name": "other-model" }
            ]
        })))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let healthy = OllamaClient::new(&config).expect("should create client");
    let missing = OllamaClient::new(&OllamaConfig {
        model: "absent-model".to_string(),
        ..config
    })
    .expect("should create client");

    let (healthy, missing) = tokio::task::spawn_blocking(move || {
        (healthy.health_check(), missing.health_check())
    })
    .await
    .expect("task should join");

    assert!(healthy.is_ok());
    assert!(missing.is_err());
}

#[tokio::test]
async fn ping_reports_reachable_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "0.5.7" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&config_for(&server)).expect("should create client");
    let result = tokio::task::spawn_blocking(move || client.ping())
        .await
        .expect("task should join");

    assert!(result.is_ok());
}

#[tokio::test]
async fn health_check_fails_when_server_is_unreachable() {
    let config = OllamaConfig {
        host: "127.0.0.1".to_string(),
        port: 9,
        ..OllamaConfig::default()
    };
    let client = OllamaClient::new(&config)
        .expect("should create client")
        .with_retry_attempts(1)
        .with_timeout(Duration::from_secs(2));

    let (ping, health) = tokio::task::spawn_blocking(move || (client.ping(), client.health_check()))
        .await
        .expect("task should join");

    assert!(ping.is_err());
    let message = format!("{:#}", health.expect_err("unreachable server should be unhealthy"));
    assert!(message.contains("unreachable"), "got {}", message);
}
