/// HTTP embedding client for OpenAI-compatible `/v1/embeddings` endpoints.
///
/// Retries 429 and 5xx responses with exponential backoff. Any other non-2xx
/// status is returned immediately. The returned vector is checked against the
/// configured dimension before it leaves this module.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{EmbeddingError, VectorProvider};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/embeddings";
pub const DEFAULT_MODEL: &str = "text-embedding-ada-002";
const MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(1000);

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
    backoff: Duration,
}

impl HttpEmbedder {
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: String,
        dimension: usize,
        request_timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            dimension,
            backoff: DEFAULT_BACKOFF,
        })
    }

    /// Base delay before the first retry; doubles on each subsequent one.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }

    async fn request(&self, api_key: &str, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let request_body = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.backoff * (1 << (attempt - 1));
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .bearer_auth(api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, body);
                last_error = Some(EmbeddingError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let parsed: EmbeddingResponse = serde_json::from_str(&body)?;
            let embedding = parsed
                .data
                .into_iter()
                .next()
                .map(|d| d.embedding)
                .ok_or(EmbeddingError::EmptyResponse)?;

            if embedding.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }

            debug!(
                "Embedding call succeeded: {} chars -> {} dims",
                text.len(),
                embedding.len()
            );
            return Ok(embedding);
        }

        Err(last_error.unwrap_or(EmbeddingError::EmptyResponse))
    }
}

#[async_trait]
impl VectorProvider for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let api_key = match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(EmbeddingError::NotConfigured),
        };
        self.request(api_key, text).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn embedder(url: String, dimension: usize) -> HttpEmbedder {
        HttpEmbedder::new(
            url,
            Some("test-key".to_string()),
            DEFAULT_MODEL.to_string(),
            dimension,
            Duration::from_secs(5),
        )
        .unwrap()
        .with_backoff(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_embed_success() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/embeddings")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[0.1,0.2,0.3]}],"model":"m"}"#)
            .create_async()
            .await;

        let client = embedder(format!("{}/v1/embeddings", server.url()), 3);
        let v = client.embed("hello").await.unwrap();
        assert_eq!(v, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_dimension_mismatch() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/embeddings")
            .with_status(200)
            .with_body(r#"{"data":[{"embedding":[0.1,0.2]}]}"#)
            .create_async()
            .await;

        let client = embedder(format!("{}/v1/embeddings", server.url()), 3);
        let err = client.embed("hello").await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_embed_retries_server_errors() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/embeddings")
            .with_status(503)
            .with_body("overloaded")
            .expect(3)
            .create_async()
            .await;

        let client = embedder(format!("{}/v1/embeddings", server.url()), 3);
        let err = client.embed("hello").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Api { status: 503, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_embed_client_error_not_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/embeddings")
            .with_status(400)
            .with_body(r#"{"error":{"message":"input too long"}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = embedder(format!("{}/v1/embeddings", server.url()), 3);
        let err = client.embed("hello").await.unwrap_err();
        match err {
            EmbeddingError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "input too long");
            }
            other => panic!("Expected Api error, got: {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_embed_empty_data() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/embeddings")
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let client = embedder(format!("{}/v1/embeddings", server.url()), 3);
        assert!(matches!(
            client.embed("hello").await,
            Err(EmbeddingError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_not_configured() {
        let client = HttpEmbedder::new(
            DEFAULT_API_URL.to_string(),
            None,
            DEFAULT_MODEL.to_string(),
            1536,
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(!client.is_configured());
        assert!(matches!(
            client.embed("hello").await,
            Err(EmbeddingError::NotConfigured)
        ));
    }
}
