use serde::{Deserialize, Serialize};

use super::TokenUsage;

/// Reason why the generation finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    #[serde(untagged)]
    Other(String),
}

impl FinishReason {
    /// Parse the provider's finish reason string
    pub fn parse(reason: &str) -> Self {
        match reason {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "content_filter" => Self::ContentFilter,
            "tool_calls" | "function_call" => Self::ToolCalls,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stop => write!(f, "stop"),
            Self::Length => write!(f, "length"),
            Self::ContentFilter => write!(f, "content_filter"),
            Self::ToolCalls => write!(f, "tool_calls"),
            Self::Other(reason) => write!(f, "{}", reason),
        }
    }
}

/// One normalized chunk of a streaming response
///
/// Any combination of fields may be absent; a chunk with none set is
/// metadata-only and produces no visible event.
#[derive(Debug, Clone, Default)]
pub struct ChatChunk {
    pub delta: Option<String>,
    pub finish_reason: Option<FinishReason>,
    pub usage: Option<TokenUsage>,
}

impl ChatChunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delta(mut self, delta: impl Into<String>) -> Self {
        self.delta = Some(delta.into());
        self
    }

    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// A complete non-streaming response
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub text: Option<String>,
    pub finish_reason: Option<FinishReason>,
    pub usage: TokenUsage,
}

impl ChatCompletion {
    pub fn new(usage: TokenUsage) -> Self {
        Self {
            text: None,
            finish_reason: None,
            usage,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_finish_reason() {
        assert_eq!(FinishReason::parse("stop"), FinishReason::Stop);
        assert_eq!(FinishReason::parse("length"), FinishReason::Length);
        assert_eq!(FinishReason::parse("tool_calls"), FinishReason::ToolCalls);
        assert_eq!(
            FinishReason::parse("end_of_episode"),
            FinishReason::Other("end_of_episode".to_string())
        );
    }

    #[test]
    fn test_finish_reason_display_round_trips() {
        for reason in ["stop", "length", "content_filter", "tool_calls", "weird"] {
            assert_eq!(FinishReason::parse(reason).to_string(), reason);
        }
    }

    #[test]
    fn test_chunk_builder() {
        let chunk = ChatChunk::new()
            .with_delta("Hello")
            .with_finish_reason(FinishReason::Stop);

        assert_eq!(chunk.delta.as_deref(), Some("Hello"));
        assert_eq!(chunk.finish_reason, Some(FinishReason::Stop));
        assert!(chunk.usage.is_none());
    }

    #[test]
    fn test_completion_builder() {
        let completion = ChatCompletion::new(TokenUsage::new(5, 2, 7))
            .with_text("Hello")
            .with_finish_reason(FinishReason::Stop);

        assert_eq!(completion.text.as_deref(), Some("Hello"));
        assert_eq!(completion.usage.total_tokens, 7);
    }
}
