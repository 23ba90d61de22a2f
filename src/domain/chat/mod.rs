//! Chat completion domain models and client

mod client;
mod event;
mod message;
mod provider;
mod response;
mod retry;
mod translator;
mod usage;

pub use client::{ChatClient, EventStream};
pub use event::{StreamEvent, TextDelta};
pub use message::{Message, MessageRole};
pub use provider::{ChatProvider, ChunkStream};
pub use response::{ChatChunk, ChatCompletion, FinishReason};
pub use retry::RetryPolicy;
pub use translator::{translate_completion, StreamTranslator};
pub use usage::TokenUsage;

#[cfg(test)]
pub use provider::mock::MockChatProvider;
