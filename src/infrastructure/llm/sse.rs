//! Incremental decoding of `text/event-stream` payloads

/// Splits transport chunks into complete SSE `data:` payloads
///
/// Transport chunks may end mid-line; the trailing partial line is carried
/// over into the next `feed` call. Empty lines, comments, and non-data
/// fields are dropped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    partial_line: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk, returning the data payloads it completed
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let text = String::from_utf8_lossy(bytes);
        let mut combined = std::mem::take(&mut self.partial_line);
        combined.push_str(&text);

        let mut payloads = Vec::new();
        let mut rest = combined.as_str();

        while let Some(newline) = rest.find('\n') {
            let line = rest[..newline].trim_end_matches('\r');
            if let Some(data) = line.strip_prefix("data: ") {
                payloads.push(data.to_string());
            }
            rest = &rest[newline + 1..];
        }

        self.partial_line = rest.to_string();
        payloads
    }
}
