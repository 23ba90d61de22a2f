use serde::{Deserialize, Serialize};

use super::{FinishReason, TokenUsage};

/// A single increment of generated text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDelta {
    content: String,
}

impl TextDelta {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for TextDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

/// Normalized event delivered to the caller's event loop
///
/// Failures arrive as `Error` events on the same channel as regular
/// events; there is no separate fault path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental text content
    TextDelta { delta: TextDelta },

    /// Terminal event of a successful dispatch
    ///
    /// `text` is only populated in non-streaming mode; `usage` is absent
    /// when the provider never reported it.
    MessageComplete {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<TextDelta>,
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<FinishReason>,
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<TokenUsage>,
    },

    /// Terminal event of a failed dispatch
    Error { message: String },
}

impl StreamEvent {
    pub fn text_delta(content: impl Into<String>) -> Self {
        Self::TextDelta {
            delta: TextDelta::new(content),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Whether this event ends the sequence
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::MessageComplete { .. } | Self::Error { .. })
    }
}
