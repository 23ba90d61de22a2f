//! Translation of raw provider responses into normalized stream events

use super::{ChatChunk, ChatCompletion, FinishReason, StreamEvent, TextDelta, TokenUsage};

/// Accumulates per-chunk metadata across one streaming attempt
///
/// Usage and finish reason are latest-wins; the terminal event carries
/// whatever was latched when the chunk stream ended.
#[derive(Debug, Default)]
pub struct StreamTranslator {
    usage: Option<TokenUsage>,
    finish_reason: Option<FinishReason>,
}

impl StreamTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one chunk, returning an event if it carries visible output
    ///
    /// Metadata-only chunks produce no event but still update the latched
    /// usage and finish reason.
    pub fn translate_chunk(&mut self, chunk: &ChatChunk) -> Option<StreamEvent> {
        if let Some(usage) = chunk.usage {
            self.usage = Some(usage);
        }

        if let Some(reason) = &chunk.finish_reason {
            self.finish_reason = Some(reason.clone());
        }

        match chunk.delta.as_deref() {
            Some(text) if !text.is_empty() => Some(StreamEvent::text_delta(text)),
            _ => None,
        }
    }

    /// Terminal event after the chunk stream is exhausted
    pub fn finish(self) -> StreamEvent {
        StreamEvent::MessageComplete {
            text: None,
            finish_reason: self.finish_reason,
            usage: self.usage,
        }
    }
}

/// Translate a non-streaming response into its single terminal event
pub fn translate_completion(completion: ChatCompletion) -> StreamEvent {
    StreamEvent::MessageComplete {
        text: completion.text.map(TextDelta::new),
        finish_reason: completion.finish_reason,
        usage: Some(completion.usage),
    }
}
