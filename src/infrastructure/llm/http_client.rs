use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

use crate::domain::ClientError;

/// Stream type for HTTP response bodies
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ClientError>> + Send>>;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ClientError>;

    async fn post_json_stream(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<ByteStream, ClientError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: std::time::Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a reqwest failure onto the retryable/non-retryable taxonomy
fn classify_transport_error(error: reqwest::Error) -> ClientError {
    if error.is_connect() || error.is_timeout() || error.is_body() {
        ClientError::connection(error.to_string())
    } else if error.is_decode() {
        ClientError::malformed_response(error.to_string())
    } else {
        ClientError::provider(error.to_string())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::rate_limited(format!("HTTP {}: {}", status, body)));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::provider(format!("HTTP {}: {}", status, body)));
    }

    Ok(response)
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(classify_transport_error)?;
        let response = check_status(response).await?;

        response.json().await.map_err(|e| {
            ClientError::malformed_response(format!("Failed to parse response: {}", e))
        })
    }

    async fn post_json_stream(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<ByteStream, ClientError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(classify_transport_error)?;
        let response = check_status(response).await?;

        use futures::StreamExt;
        let stream = response
            .bytes_stream()
            .map(|result| result.map_err(classify_transport_error));

        Ok(Box::pin(stream))
    }
}
