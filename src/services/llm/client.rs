//! LLM Client - chat completion calls against an OpenAI-compatible API
//!
//! The HTTP exchange sits behind [`ChatTransport`] so the request/response
//! contract can be exercised without a network.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::models::*;
use crate::config::LlmConfig;

const SYSTEM_PROMPT: &str = "You are a database performance expert.";

/// Sends one chat completion request and returns the raw HTTP outcome
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post_chat(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<TransportResponse, CompletionError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    http_client: Client,
    timeout_secs: u64,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> Result<Self, CompletionError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CompletionError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client, timeout_secs })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post_chat(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<TransportResponse, CompletionError> {
        let response = self
            .http_client
            .post(endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    CompletionError::Transport(format!("Connection failed: {}", e))
                } else {
                    CompletionError::Transport(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout(self.timeout_secs)
            } else {
                CompletionError::Transport(format!("Failed to read response body: {}", e))
            }
        })?;

        Ok(TransportResponse { status, body })
    }
}

/// Chat completion client
pub struct CompletionClient<T: ChatTransport = HttpTransport> {
    transport: T,
    endpoint: String,
    model: String,
    api_key_env: String,
    api_key: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
}

impl CompletionClient<HttpTransport> {
    /// Client over HTTP, reading the key from the configured env var
    pub fn from_config(config: &LlmConfig) -> Result<Self, CompletionError> {
        let transport = HttpTransport::new(config.timeout_secs)?;
        Ok(Self::with_transport(config, api_key_from_env(&config.api_key_env), transport))
    }
}

impl<T: ChatTransport> CompletionClient<T> {
    /// Create with custom transport (for testing)
    pub fn with_transport(config: &LlmConfig, api_key: Option<String>, transport: T) -> Self {
        Self {
            transport,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            api_key: api_key.filter(|k| !k.is_empty()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fail with `MissingCredential` unless a key is configured
    pub fn ensure_credential(&self) -> Result<&str, CompletionError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| CompletionError::MissingCredential(self.api_key_env.clone()))
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the request body for `prompt`
    pub fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Send `prompt` once and return the first choice's text
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let api_key = self.ensure_credential()?;
        let request = self.build_request(prompt);

        tracing::debug!(
            "Calling LLM API: {} with model {} ({} prompt chars)",
            self.endpoint,
            self.model,
            prompt.chars().count()
        );

        let response = self.transport.post_chat(&self.endpoint, api_key, &request).await?;

        if !response.is_success() {
            return Err(CompletionError::Upstream { status: response.status, body: response.body });
        }

        let chat_response: ChatCompletionResponse = serde_json::from_str(&response.body)
            .map_err(|e| CompletionError::Decode(e.to_string()))?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::Decode("Empty response from LLM".to_string()))?;

        choice
            .message
            .content
            .ok_or_else(|| CompletionError::Decode("LLM choice has no message content".to_string()))
    }
}

/// Read an API key from `var`; unset or empty counts as missing
pub fn api_key_from_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays one canned outcome and records what was sent
    struct StubTransport {
        outcome: Mutex<Option<Result<TransportResponse, CompletionError>>>,
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, String, ChatCompletionRequest)>>,
    }

    impl StubTransport {
        fn returning(outcome: Result<TransportResponse, CompletionError>) -> Self {
            Self {
                outcome: Mutex::new(Some(outcome)),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatTransport for StubTransport {
        async fn post_chat(
            &self,
            endpoint: &str,
            api_key: &str,
            request: &ChatCompletionRequest,
        ) -> Result<TransportResponse, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((endpoint.to_string(), api_key.to_string(), request.clone()));
            self.outcome.lock().unwrap().take().expect("stub called more than once")
        }
    }

    fn client(api_key: Option<&str>, transport: StubTransport) -> CompletionClient<StubTransport> {
        CompletionClient::with_transport(
            &LlmConfig::default(),
            api_key.map(str::to_string),
            transport,
        )
    }

    fn ok_body(content: &str) -> Result<TransportResponse, CompletionError> {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        });
        Ok(TransportResponse::new(200, body.to_string()))
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_call() {
        let client = client(None, StubTransport::returning(ok_body("unused")));
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, CompletionError::MissingCredential(ref var) if var == "OPENAI_API_KEY"));
        assert!(err.is_fatal());
        assert_eq!(client.transport().calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_credential_counts_as_missing() {
        let client = client(Some(""), StubTransport::returning(ok_body("unused")));
        assert!(!client.has_credential());
        assert!(client.complete("prompt").await.is_err());
        assert_eq!(client.transport().calls(), 0);
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let client = client(Some("sk-test"), StubTransport::returning(ok_body("1. add an index")));
        let reply = client.complete("analyze this").await.unwrap();
        assert_eq!(reply, "1. add an index");
        assert_eq!(client.transport().calls(), 1);
    }

    #[tokio::test]
    async fn test_request_shape() {
        let client = client(Some("sk-test"), StubTransport::returning(ok_body("ok")));
        client.complete("the prompt").await.unwrap();

        let seen = client.transport().seen.lock().unwrap();
        let (endpoint, key, request) = &seen[0];
        assert_eq!(endpoint, "https://api.openai.com/v1/chat/completions");
        assert_eq!(key, "sk-test");
        assert_eq!(request.model, "gpt-4");
        assert_eq!(
            request.messages,
            vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user("the prompt")]
        );

        let json = serde_json::to_value(request).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[tokio::test]
    async fn test_empty_choices_is_decode_error() {
        let client = client(
            Some("sk-test"),
            StubTransport::returning(Ok(TransportResponse::new(200, r#"{"choices": []}"#))),
        );
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, CompletionError::Decode(_)));
    }

    #[tokio::test]
    async fn test_null_content_is_decode_error() {
        let client = client(
            Some("sk-test"),
            StubTransport::returning(Ok(TransportResponse::new(
                200,
                r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
            ))),
        );
        assert!(matches!(client.complete("p").await, Err(CompletionError::Decode(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let client = client(
            Some("sk-test"),
            StubTransport::returning(Ok(TransportResponse::new(200, "<html>oops</html>"))),
        );
        assert!(matches!(client.complete("p").await, Err(CompletionError::Decode(_))));
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let client = client(
            Some("sk-test"),
            StubTransport::returning(Ok(TransportResponse::new(
                429,
                r#"{"error": {"message": "Rate limit reached"}}"#,
            ))),
        );
        match client.complete("p").await.unwrap_err() {
            CompletionError::Upstream { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit reached"));
            },
            other => panic!("expected Upstream, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let client = client(
            Some("sk-test"),
            StubTransport::returning(Err(CompletionError::Transport("dns failure".into()))),
        );
        let err = client.complete("p").await.unwrap_err();
        assert!(matches!(err, CompletionError::Transport(ref m) if m == "dns failure"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_api_key_from_env_unset() {
        assert_eq!(api_key_from_env("BUNDLE_ADVISOR_TEST_KEY_THAT_IS_NEVER_SET"), None);
    }

    #[test]
    fn test_optional_sampling_fields_serialized() {
        let config = LlmConfig { max_tokens: Some(512), temperature: Some(0.2), ..Default::default() };
        let client = CompletionClient::with_transport(
            &config,
            Some("k".into()),
            StubTransport::returning(ok_body("x")),
        );
        let json = serde_json::to_value(client.build_request("p")).unwrap();
        assert_eq!(json["max_tokens"], 512);
        assert_eq!(json["temperature"], 0.2);
    }
}
