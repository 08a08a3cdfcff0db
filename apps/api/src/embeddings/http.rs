//! HTTP embeddings client for OpenAI-compatible `/v1/embeddings` endpoints
//! (OpenAI, text-embeddings-inference, vLLM, Ollama's compatibility layer).
//!
//! Retries 429, 5xx and transport errors with exponential backoff. Other
//! failures are returned immediately so the caller can decide.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{EmbeddingError, EmbeddingProvider, EmbeddingVector};

const EMBEDDINGS_PATH: &str = "/v1/embeddings";
const BASE_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
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
pub struct HttpEmbeddingClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_retries: u32,
    base_backoff: Duration,
}

impl HttpEmbeddingClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: String,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: embeddings_endpoint(base_url),
            api_key,
            model,
            max_retries: max_retries.max(1),
            base_backoff: BASE_BACKOFF,
        })
    }

    #[cfg(test)]
    fn with_base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }

    async fn call_once(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

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
        parse_embedding_response(&body, &self.model)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn encode(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.base_backoff, attempt);
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match self.call_once(text).await {
                Ok(vector) => {
                    debug!(
                        "Embedding call succeeded: model={}, dimension={}",
                        vector.model,
                        vector.dimension()
                    );
                    return Ok(vector);
                }
                Err(e) if e.is_retriable() => {
                    warn!("Embedding provider error: {e}");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(EmbeddingError::EmptyResponse))
    }
}

/// Exponential backoff (1s, 2s, 4s ... with the default base), capped at `MAX_BACKOFF`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(MAX_BACKOFF)
}

fn embeddings_endpoint(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with(EMBEDDINGS_PATH) {
        base.to_string()
    } else if let Some(stripped) = base.strip_suffix("/v1") {
        format!("{stripped}{EMBEDDINGS_PATH}")
    } else {
        format!("{base}{EMBEDDINGS_PATH}")
    }
}

/// Takes the vector at index 0. The response's own `model` field wins over the
/// requested name so a server-side model swap shows up as a model mismatch.
fn parse_embedding_response(
    body: &str,
    requested_model: &str,
) -> Result<EmbeddingVector, EmbeddingError> {
    let response: EmbeddingResponse = serde_json::from_str(body)?;
    let data = response
        .data
        .into_iter()
        .min_by_key(|d| d.index)
        .ok_or(EmbeddingError::EmptyResponse)?;
    let model = response
        .model
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| requested_model.to_string());
    Ok(EmbeddingVector::new(model, data.embedding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::State,
        http::{header::AUTHORIZATION, HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-process embeddings server: answers `fail_first` calls with
    /// `failure_status`, then succeeds. Records what the client sent.
    #[derive(Clone)]
    struct StubServer {
        calls: Arc<AtomicUsize>,
        fail_first: usize,
        failure_status: StatusCode,
        auth: Arc<Mutex<Option<String>>>,
        requested_model: Arc<Mutex<Option<String>>>,
    }

    impl StubServer {
        fn new(fail_first: usize, failure_status: StatusCode) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                fail_first,
                failure_status,
                auth: Arc::new(Mutex::new(None)),
                requested_model: Arc::new(Mutex::new(None)),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    async fn stub_embeddings(
        State(stub): State<StubServer>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Response {
        let call = stub.calls.fetch_add(1, Ordering::SeqCst);
        *stub.auth.lock().unwrap() = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        *stub.requested_model.lock().unwrap() = body["model"].as_str().map(str::to_string);

        if call < stub.fail_first {
            let error = json!({ "error": { "message": "model is loading" } });
            return (stub.failure_status, Json(error)).into_response();
        }
        Json(json!({
            "object": "list",
            "data": [{ "object": "embedding", "index": 0, "embedding": [0.6, 0.8] }],
            "model": "served-model"
        }))
        .into_response()
    }

    async fn spawn_stub(stub: StubServer) -> String {
        let app = Router::new()
            .route("/v1/embeddings", post(stub_embeddings))
            .with_state(stub);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn client(base_url: &str, api_key: Option<&str>, max_retries: u32) -> HttpEmbeddingClient {
        HttpEmbeddingClient::new(
            base_url,
            api_key.map(str::to_string),
            "requested-model".to_string(),
            Duration::from_secs(5),
            max_retries,
        )
        .unwrap()
        .with_base_backoff(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_encode_retries_server_error_then_succeeds() {
        let stub = StubServer::new(1, StatusCode::SERVICE_UNAVAILABLE);
        let url = spawn_stub(stub.clone()).await;

        let vector = client(&url, Some("sk-test"), 3)
            .encode("senior rust engineer")
            .await
            .unwrap();

        assert_eq!(stub.calls(), 2);
        assert_eq!(vector.values, vec![0.6, 0.8]);
        assert_eq!(vector.model, "served-model");
        assert_eq!(
            stub.requested_model.lock().unwrap().as_deref(),
            Some("requested-model")
        );
    }

    #[tokio::test]
    async fn test_encode_retries_rate_limit() {
        let stub = StubServer::new(2, StatusCode::TOO_MANY_REQUESTS);
        let url = spawn_stub(stub.clone()).await;

        assert!(client(&url, None, 3).encode("text").await.is_ok());
        assert_eq!(stub.calls(), 3);
    }

    #[tokio::test]
    async fn test_encode_gives_up_after_max_retries() {
        let stub = StubServer::new(usize::MAX, StatusCode::BAD_GATEWAY);
        let url = spawn_stub(stub.clone()).await;

        let err = client(&url, None, 3).encode("text").await.unwrap_err();

        assert_eq!(stub.calls(), 3);
        assert!(matches!(err, EmbeddingError::Api { status: 502, .. }));
        assert!(err.is_retriable());
    }

    #[tokio::test]
    async fn test_encode_client_error_returns_immediately() {
        let stub = StubServer::new(usize::MAX, StatusCode::BAD_REQUEST);
        let url = spawn_stub(stub.clone()).await;

        let err = client(&url, None, 3).encode("text").await.unwrap_err();

        assert_eq!(stub.calls(), 1);
        match &err {
            EmbeddingError::Api { status, message } => {
                assert_eq!(*status, 400);
                assert_eq!(message, "model is loading");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert!(!err.is_retriable());
    }

    #[tokio::test]
    async fn test_encode_sends_bearer_token_only_when_configured() {
        let stub = StubServer::new(0, StatusCode::OK);
        let url = spawn_stub(stub.clone()).await;

        client(&url, Some("sk-test"), 1).encode("text").await.unwrap();
        assert_eq!(stub.auth.lock().unwrap().as_deref(), Some("Bearer sk-test"));

        client(&url, None, 1).encode("text").await.unwrap();
        assert_eq!(stub.auth.lock().unwrap().as_deref(), None);
    }

    #[tokio::test]
    async fn test_encode_transport_error_is_retriable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}"), None, 2)
            .encode("text")
            .await
            .unwrap_err();

        assert!(matches!(err, EmbeddingError::Http(_)));
        assert!(err.is_retriable());
    }

    #[test]
    fn test_backoff_doubles_from_base() {
        assert_eq!(backoff_delay(BASE_BACKOFF, 1), Duration::from_secs(1));
        assert_eq!(backoff_delay(BASE_BACKOFF, 2), Duration::from_secs(2));
        assert_eq!(backoff_delay(BASE_BACKOFF, 3), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_is_capped_for_large_attempt_counts() {
        assert_eq!(backoff_delay(BASE_BACKOFF, 6), MAX_BACKOFF);
        assert_eq!(backoff_delay(BASE_BACKOFF, 64), MAX_BACKOFF);
        assert_eq!(backoff_delay(BASE_BACKOFF, u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn test_endpoint_from_bare_host() {
        assert_eq!(
            embeddings_endpoint("http://localhost:8081"),
            "http://localhost:8081/v1/embeddings"
        );
    }

    #[test]
    fn test_endpoint_with_trailing_slash_and_version() {
        assert_eq!(
            embeddings_endpoint("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/embeddings"
        );
    }

    #[test]
    fn test_endpoint_already_complete() {
        assert_eq!(
            embeddings_endpoint("http://tei:80/v1/embeddings"),
            "http://tei:80/v1/embeddings"
        );
    }

    #[test]
    fn test_parse_response_uses_reported_model() {
        let body = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.5,-0.25]}],"model":"all-MiniLM-L6-v2"}"#;
        let v = parse_embedding_response(body, "requested").unwrap();
        assert_eq!(v.model, "all-MiniLM-L6-v2");
        assert_eq!(v.values, vec![0.5, -0.25]);
    }

    #[test]
    fn test_parse_response_falls_back_to_requested_model() {
        let body = r#"{"data":[{"embedding":[1.0]}]}"#;
        let v = parse_embedding_response(body, "requested").unwrap();
        assert_eq!(v.model, "requested");
    }

    #[test]
    fn test_parse_response_picks_lowest_index() {
        let body = r#"{"data":[{"index":1,"embedding":[2.0]},{"index":0,"embedding":[1.0]}]}"#;
        let v = parse_embedding_response(body, "m").unwrap();
        assert_eq!(v.values, vec![1.0]);
    }

    #[test]
    fn test_parse_empty_data_is_error() {
        let body = r#"{"data":[],"model":"m"}"#;
        assert!(matches!(
            parse_embedding_response(body, "m"),
            Err(EmbeddingError::EmptyResponse)
        ));
    }

    #[test]
    fn test_parse_garbage_is_parse_error() {
        assert!(matches!(
            parse_embedding_response("not json", "m"),
            Err(EmbeddingError::Parse(_))
        ));
    }
}
