use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde::Deserialize;
use tracing::warn;

use super::http_client::{HttpClient, HttpClientTrait};
use super::sse::SseDecoder;
use crate::config::ProviderConfig;
use crate::domain::{
    ChatChunk, ChatCompletion, ChatProvider, ChunkStream, ClientError, FinishReason, Message,
    TokenUsage,
};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "tngtech/deepseek-r1t2-chimera:free";

/// OpenAI-compatible chat completion provider
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request(&self, messages: &[Message], stream: bool) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": stream,
        })
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<ChatCompletion, ClientError> {
        let response: WireResponse = serde_json::from_value(json).map_err(|e| {
            ClientError::malformed_response(format!("Failed to parse response: {}", e))
        })?;

        let usage = response
            .usage
            .ok_or_else(|| ClientError::malformed_response("response carries no usage object"))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::malformed_response("no choices in response"))?;

        let mut completion = ChatCompletion::new(usage.into_domain());

        if let Some(reason) = choice.finish_reason {
            completion = completion.with_finish_reason(FinishReason::parse(&reason));
        }

        // Absent message content is tolerated; the terminal event then
        // carries no text.
        if let Some(content) = choice.message.and_then(|m| m.content) {
            completion = completion.with_text(content);
        }

        Ok(completion)
    }
}

impl OpenAiProvider<HttpClient> {
    /// Create a provider over a real HTTP transport from configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ClientError> {
        if config.api_key.is_empty() {
            return Err(ClientError::configuration("provider.api_key is not set"));
        }

        Ok(Self::with_base_url(
            HttpClient::new(),
            config.api_key.clone(),
            config.base_url.clone(),
        )
        .with_model(config.model.clone()))
    }
}

#[async_trait]
impl<C: HttpClientTrait> ChatProvider for OpenAiProvider<C> {
    async fn complete(&self, messages: &[Message]) -> Result<ChatCompletion, ClientError> {
        let url = self.chat_completions_url();
        let body = self.build_request(messages, false);
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }

    async fn complete_stream(&self, messages: &[Message]) -> Result<ChunkStream, ClientError> {
        let url = self.chat_completions_url();
        let body = self.build_request(messages, true);
        let byte_stream = self
            .client
            .post_json_stream(&url, self.headers(), &body)
            .await?;

        let mut decoder = SseDecoder::new();
        let chunks = byte_stream.flat_map(move |result| {
            let items: Vec<Result<ChatChunk, ClientError>> = match result {
                Ok(bytes) => decoder
                    .feed(&bytes)
                    .iter()
                    .filter_map(|payload| parse_chunk(payload))
                    .map(Ok)
                    .collect(),
                Err(error) => vec![Err(error)],
            };
            stream::iter(items)
        });

        Ok(Box::pin(chunks))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Parse one SSE data payload into a normalized chunk
///
/// The `[DONE]` marker and unparseable payloads yield no chunk; a payload
/// without choice entries still surfaces its usage.
fn parse_chunk(payload: &str) -> Option<ChatChunk> {
    if payload.trim() == "[DONE]" {
        return None;
    }

    let wire: WireStreamChunk = match serde_json::from_str(payload) {
        Ok(wire) => wire,
        Err(error) => {
            warn!(%error, "skipping unparseable stream chunk");
            return None;
        }
    };

    let mut chunk = ChatChunk::new();

    if let Some(usage) = wire.usage {
        chunk = chunk.with_usage(usage.into_domain());
    }

    if let Some(choice) = wire.choices.into_iter().next() {
        if let Some(reason) = choice.finish_reason {
            chunk = chunk.with_finish_reason(FinishReason::parse(&reason));
        }

        if let Some(content) = choice.delta.content {
            chunk = chunk.with_delta(content);
        }
    }

    Some(chunk)
}

// OpenAI API wire types

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    #[serde(default)]
    message: Option<WireMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
    #[serde(default)]
    prompt_tokens_details: Option<WirePromptTokensDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct WirePromptTokensDetails {
    #[serde(default)]
    cached_tokens: u32,
}

impl WireUsage {
    fn into_domain(self) -> TokenUsage {
        let cached_tokens = self
            .prompt_tokens_details
            .map(|details| details.cached_tokens)
            .unwrap_or(0);

        TokenUsage::new(self.prompt_tokens, self.completion_tokens, self.total_tokens)
            .with_cached_tokens(cached_tokens)
    }
}

#[derive(Debug, Deserialize)]
struct WireStreamChunk {
    #[serde(default)]
    choices: Vec<WireStreamChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireStreamChoice {
    #[serde(default)]
    delta: WireDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireDelta {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures::StreamExt;

    use super::super::http_client::mock::MockHttpClient;
    use super::*;
    use crate::domain::StreamEvent;

    const TEST_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

    fn provider(client: MockHttpClient) -> OpenAiProvider<MockHttpClient> {
        OpenAiProvider::new(client, "test-api-key")
    }

    #[tokio::test]
    async fn test_complete_parses_response() {
        let mock_response = serde_json::json!({
            "id": "chatcmpl-123",
            "model": "tngtech/deepseek-r1t2-chimera:free",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "Hello! How can I help you?"
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 8,
                "total_tokens": 18,
                "prompt_tokens_details": { "cached_tokens": 4 }
            }
        });

        let client = MockHttpClient::new().with_response(TEST_URL, mock_response);
        let completion = provider(client)
            .complete(&[Message::user("Hello!")])
            .await
            .unwrap();

        assert_eq!(completion.text.as_deref(), Some("Hello! How can I help you?"));
        assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
        assert_eq!(
            completion.usage,
            TokenUsage::new(10, 8, 18).with_cached_tokens(4)
        );
    }

    #[tokio::test]
    async fn test_complete_without_usage_is_malformed() {
        let mock_response = serde_json::json!({
            "choices": [{
                "message": { "role": "assistant", "content": "Hi" },
                "finish_reason": "stop"
            }]
        });

        let client = MockHttpClient::new().with_response(TEST_URL, mock_response);
        let error = provider(client)
            .complete(&[Message::user("Hello!")])
            .await
            .unwrap_err();

        assert!(matches!(error, ClientError::MalformedResponse { .. }));
        assert!(!error.is_retryable());
    }

    #[tokio::test]
    async fn test_complete_without_content_still_succeeds() {
        let mock_response = serde_json::json!({
            "choices": [{ "message": { "role": "assistant" }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 5, "completion_tokens": 0, "total_tokens": 5 }
        });

        let client = MockHttpClient::new().with_response(TEST_URL, mock_response);
        let completion = provider(client)
            .complete(&[Message::user("Hello!")])
            .await
            .unwrap();

        assert!(completion.text.is_none());
        assert_eq!(completion.usage, TokenUsage::new(5, 0, 5));
    }

    #[tokio::test]
    async fn test_missing_cached_token_detail_defaults_to_zero() {
        let mock_response = serde_json::json!({
            "choices": [{ "message": { "content": "Hi" }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7 }
        });

        let client = MockHttpClient::new().with_response(TEST_URL, mock_response);
        let completion = provider(client)
            .complete(&[Message::user("Hello!")])
            .await
            .unwrap();

        assert_eq!(completion.usage.cached_tokens, 0);
    }

    #[tokio::test]
    async fn test_stream_parses_chunks_and_skips_metadata() {
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"He\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"llo\"}}]}\n\n",
            "data: {\"choices\":[],\"usage\":{\"prompt_tokens\":5,\"completion_tokens\":2,\"total_tokens\":7}}\n\n",
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        );

        let client = MockHttpClient::new()
            .with_stream_response(TEST_URL, vec![Bytes::from_static(body.as_bytes())]);

        let chunks: Vec<ChatChunk> = provider(client)
            .complete_stream(&[Message::user("hi")])
            .await
            .unwrap()
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].delta.as_deref(), Some("He"));
        assert_eq!(chunks[1].delta.as_deref(), Some("llo"));
        assert_eq!(chunks[2].usage, Some(TokenUsage::new(5, 2, 7)));
        assert!(chunks[2].delta.is_none());
        assert_eq!(chunks[3].finish_reason, Some(FinishReason::Stop));
    }

    #[tokio::test]
    async fn test_stream_handles_chunk_split_across_reads() {
        let client = MockHttpClient::new().with_stream_response(
            TEST_URL,
            vec![
                Bytes::from_static(b"data: {\"choices\":[{\"del"),
                Bytes::from_static(b"ta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n\n"),
            ],
        );

        let chunks: Vec<ChatChunk> = provider(client)
            .complete_stream(&[Message::user("hi")])
            .await
            .unwrap()
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].delta.as_deref(), Some("Hi"));
    }

    #[tokio::test]
    async fn test_unparseable_payload_is_skipped() {
        let client = MockHttpClient::new().with_stream_response(
            TEST_URL,
            vec![Bytes::from_static(
                b"data: not json\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n",
            )],
        );

        let chunks: Vec<ChatChunk> = provider(client)
            .complete_stream(&[Message::user("hi")])
            .await
            .unwrap()
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].delta.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_custom_base_url_and_model() {
        let url = "http://localhost:8080/v1/chat/completions";
        let mock_response = serde_json::json!({
            "choices": [{ "message": { "content": "Custom" }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2 }
        });

        let client = MockHttpClient::new().with_response(url, mock_response);
        let provider = OpenAiProvider::with_base_url(client, "key", "http://localhost:8080/v1/")
            .with_model("gpt-4o-mini");

        assert_eq!(provider.model(), "gpt-4o-mini");
        let completion = provider.complete(&[Message::user("Test")]).await.unwrap();
        assert_eq!(completion.text.as_deref(), Some("Custom"));
    }

    // End-to-end through the client: worked example from the streaming
    // translation contract.
    #[tokio::test]
    async fn test_stream_through_chat_client() {
        use crate::domain::ChatClient;

        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"He\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"llo\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}],",
            "\"usage\":{\"prompt_tokens\":5,\"completion_tokens\":2,\"total_tokens\":7}}\n\n",
            "data: [DONE]\n\n",
        );

        let client = MockHttpClient::new()
            .with_stream_response(TEST_URL, vec![Bytes::from_static(body.as_bytes())]);
        let chat = ChatClient::new(provider(client));

        let events: Vec<StreamEvent> = chat
            .chat_completion(vec![Message::user("hi")], true)
            .collect()
            .await;

        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[2],
            StreamEvent::MessageComplete {
                finish_reason: Some(FinishReason::Stop),
                usage: Some(usage),
                text: None,
            } if *usage == TokenUsage::new(5, 2, 7)
        ));
    }
}
