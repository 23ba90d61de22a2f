//! Streaming chat completion client for OpenAI-compatible LLM endpoints
//!
//! Dispatches a conversation to a remote chat completion endpoint and
//! delivers the response as a lazy sequence of normalized events:
//! incremental text deltas, a terminal completion event with finish reason
//! and token usage, or a terminal error event. Rate-limit and connection
//! failures are retried with exponential backoff.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    ChatClient, ClientError, EventStream, FinishReason, Message, MessageRole, RetryPolicy,
    StreamEvent, TextDelta, TokenUsage,
};

use infrastructure::llm::{HttpClient, OpenAiProvider};

/// Create a chat client over a real HTTP transport from configuration
pub fn create_client(
    config: &AppConfig,
) -> Result<ChatClient<OpenAiProvider<HttpClient>>, ClientError> {
    let provider = OpenAiProvider::from_config(&config.provider)?;
    Ok(ChatClient::new(provider).with_retry_policy(config.retry.clone()))
}
