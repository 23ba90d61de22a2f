//! Chat completion client with bounded retry

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};

use super::translator::{translate_completion, StreamTranslator};
use super::{ChatProvider, Message, RetryPolicy, StreamEvent};
use crate::domain::ClientError;

/// Lazy sequence of events produced by one dispatch
pub type EventStream = UnboundedReceiverStream<StreamEvent>;

/// Chat completion client
///
/// Owns the provider, and through it the HTTP transport; dropping the
/// client releases both. Rate-limit and connection failures are retried
/// with exponential backoff; all other failures terminate the dispatch
/// immediately.
#[derive(Debug)]
pub struct ChatClient<P: ChatProvider> {
    provider: Arc<P>,
    retry: RetryPolicy,
}

impl<P: ChatProvider + 'static> ChatClient<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Dispatch a conversation and return the resulting event sequence
    ///
    /// Streaming mode delivers text deltas as they arrive, then one
    /// `MessageComplete`; non-streaming mode delivers exactly one terminal
    /// event. Failures arrive as a terminal `Error` event on the same
    /// sequence. Dropping the returned stream cancels the dispatch.
    pub fn chat_completion(&self, messages: Vec<Message>, streaming: bool) -> EventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let provider = Arc::clone(&self.provider);
        let retry = self.retry.clone();

        tokio::spawn(async move {
            run_dispatch(provider.as_ref(), &retry, &messages, streaming, &tx).await;
        });

        UnboundedReceiverStream::new(rx)
    }
}

async fn run_dispatch<P: ChatProvider>(
    provider: &P,
    retry: &RetryPolicy,
    messages: &[Message],
    streaming: bool,
    tx: &mpsc::UnboundedSender<StreamEvent>,
) {
    if messages.is_empty() {
        let _ = tx.send(StreamEvent::error(
            "conversation must contain at least one message",
        ));
        return;
    }

    let max_attempts = retry.max_attempts();

    for attempt in 0..max_attempts {
        if tx.is_closed() {
            return;
        }

        if attempt > 0 {
            let delay = retry.delay_for_attempt(attempt - 1);
            debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "backing off before retry"
            );
            tokio::time::sleep(delay).await;
        }

        let result = if streaming {
            stream_attempt(provider, messages, tx).await
        } else {
            complete_attempt(provider, messages, tx).await
        };

        match result {
            Ok(()) => return,
            Err(error) if error.is_retryable() && attempt + 1 < max_attempts => {
                warn!(%error, attempt, "transient failure, retrying");
            }
            Err(error) => {
                let _ = tx.send(StreamEvent::error(error.to_string()));
                return;
            }
        }
    }
}

/// One streaming attempt
///
/// A retryable failure here restarts the whole request; deltas already
/// delivered are not rolled back.
async fn stream_attempt<P: ChatProvider>(
    provider: &P,
    messages: &[Message],
    tx: &mpsc::UnboundedSender<StreamEvent>,
) -> Result<(), ClientError> {
    let mut chunks = provider.complete_stream(messages).await?;
    let mut translator = StreamTranslator::new();

    while let Some(chunk) = chunks.next().await {
        if let Some(event) = translator.translate_chunk(&chunk?) {
            if tx.send(event).is_err() {
                // Receiver dropped; stop producing.
                return Ok(());
            }
        }
    }

    let _ = tx.send(translator.finish());
    Ok(())
}

async fn complete_attempt<P: ChatProvider>(
    provider: &P,
    messages: &[Message],
    tx: &mpsc::UnboundedSender<StreamEvent>,
) -> Result<(), ClientError> {
    let completion = provider.complete(messages).await?;
    let _ = tx.send(translate_completion(completion));
    Ok(())
}
