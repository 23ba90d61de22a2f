//! Domain layer - Core types and client logic

pub mod chat;
pub mod error;

pub use chat::{
    ChatChunk, ChatClient, ChatCompletion, ChatProvider, ChunkStream, EventStream, FinishReason,
    Message, MessageRole, RetryPolicy, StreamEvent, TextDelta, TokenUsage,
};
pub use error::ClientError;
