use super::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, api_key: &str) -> CompletionConfig {
    CompletionConfig {
        endpoint: format!("{}/chat/completions", server.uri()),
        model: "deepseek-chat".to_string(),
        api_key: api_key.to_string(),
        timeout_seconds: 5,
    }
}

fn messages() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("answer from context"),
        ChatMessage::user("CONTEXT:\nNo relevant parts found.\n\nUSER QUESTION:\nice maker"),
    ]
}

async fn complete(client: OpenAiClient) -> CompletionOutcome {
    tokio::task::spawn_blocking(move || client.complete(&messages()))
        .await
        .expect("task should join")
}

#[test]
fn client_uses_configured_timeout() {
    let config = CompletionConfig {
        timeout_seconds: 90,
        ..CompletionConfig::default()
    };
    let client = OpenAiClient::new(&config).expect("should create client");
    assert_eq!(client.timeout(), Duration::from_secs(90));

    let client = client.with_timeout(Duration::from_millis(250));
    assert_eq!(client.timeout(), Duration::from_millis(250));
}

#[test]
fn invalid_endpoint_is_rejected() {
    let config = CompletionConfig {
        endpoint: "not a url".to_string(),
        ..CompletionConfig::default()
    };
    assert!(OpenAiClient::new(&config).is_err());
}

#[tokio::test]
async fn successful_completion_sends_bearer_and_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "deepseek-chat",
            "messages": [
                { "role": "system", "content": "answer from context" },
                { "role": "user" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "No matching part found." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config_for(&server, "sk-test")).expect("should create client");

    assert_eq!(
        complete(client).await,
        CompletionOutcome::Completed("No matching part found.".to_string())
    );
}

#[tokio::test]
async fn error_body_is_read_despite_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Authentication Fails", "type": "authentication_error" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config_for(&server, "")).expect("should create client");

    assert_eq!(
        complete(client).await,
        CompletionOutcome::ServiceError("Authentication Fails".to_string())
    );
}

#[tokio::test]
async fn unrecognised_body_is_unexpected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "queued" })))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config_for(&server, "sk-test")).expect("should create client");

    assert_eq!(
        complete(client).await,
        CompletionOutcome::Unexpected(r#"{"status":"queued"}"#.to_string())
    );
}

#[tokio::test]
async fn slow_service_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "choices": [{ "message": { "content": "late" } }] }))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config_for(&server, "sk-test"))
        .expect("should create client")
        .with_timeout(Duration::from_millis(200));

    assert!(matches!(
        complete(client).await,
        CompletionOutcome::Transport(_)
    ));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_failure() {
    let config = CompletionConfig {
        endpoint: "http://127.0.0.1:9/chat/completions".to_string(),
        timeout_seconds: 2,
        ..CompletionConfig::default()
    };
    let client = OpenAiClient::new(&config).expect("should create client");

    assert!(matches!(
        complete(client).await,
        CompletionOutcome::Transport(_)
    ));
}
