use std::fmt::Debug;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::{ChatChunk, ChatCompletion, Message};
use crate::domain::ClientError;

/// Stream of normalized chunks from a streaming completion
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatChunk, ClientError>> + Send>>;

/// Trait for chat completion providers
#[async_trait]
pub trait ChatProvider: Send + Sync + Debug {
    /// Send a non-streaming chat completion request
    async fn complete(&self, messages: &[Message]) -> Result<ChatCompletion, ClientError>;

    /// Send a streaming chat completion request
    async fn complete_stream(&self, messages: &[Message]) -> Result<ChunkStream, ClientError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
