//! OpenAI-compatible provider and HTTP transport

mod http_client;
mod openai;
mod sse;

pub use http_client::{ByteStream, HttpClient, HttpClientTrait};
pub use openai::OpenAiProvider;
pub use sse::SseDecoder;

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
