use super::*;
use crate::config::OllamaConfig;

#[test]
fn client_configuration() {
    let config = OllamaConfig {
        protocol: "http".to_string(),
        host: "test-host".to_string(),
        port: 1234,
        embedding_model: "test-embed".to_string(),
        generation_model: "test-gen".to_string(),
        batch_size: 128,
        ..OllamaConfig::default()
    };
    let client = OllamaClient::new(&config).expect("Failed to create client");

    assert_eq!(client.embedding_model, "test-embed");
    assert_eq!(client.generation_model, "test-gen");
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

    // Note: timeout is part of the agent configuration
    assert_eq!(client.retry_attempts, 5);
}

#[test]
fn embedding_result_structure() {
    let result = EmbeddingResult {
        text: "test text".to_string(),
        embedding: vec![0.1, 0.2, 0.3, 0.4, 0.5],
    };

    assert_eq!(result.text, "test text");
    assert_eq!(result.embedding.len(), 5);
}

#[test]
fn empty_batch_returns_no_results() {
    let config = OllamaConfig::default();
    let client = OllamaClient::new(&config).expect("Failed to create client");

    let results = client
        .generate_embeddings_batch(&[])
        .expect("empty batch should not hit the network");
    assert!(results.is_empty());
}
