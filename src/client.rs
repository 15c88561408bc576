use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use futures::StreamExt as _;
use futures::stream;
use tracing::{debug, warn};

use crate::errors::{ClientError, ServiceError};
use crate::wire::{SseDecoder, WireEvent, decode_frame};

/// Stream of decoded wire events produced by a transport.
pub type WireEventStream =
    Pin<Box<dyn futures::Stream<Item = Result<WireEvent, ServiceError>> + Send + 'static>>;

type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static>>;

/// Seam between the generation flow and the network.
///
/// `GeneratorClient` is the HTTP implementation; tests substitute fakes.
#[async_trait::async_trait]
pub trait GenerateTransport: Send + Sync {
    /// Opens one streaming request for the given prompt.
    async fn open_stream(&self, prompt: &str) -> Result<WireEventStream, ServiceError>;
}

/// Connection settings for the generation service.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the service.
    pub base_url: String,
    /// Default HTTP timeout for requests.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a config with sensible defaults for a local service.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Builds a config from `PAPERSTREAM_BASE_URL`, defaulting to the local
    /// development endpoint.
    pub fn from_env() -> Self {
        let base_url = std::env::var("PAPERSTREAM_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:3000".to_string());
        Self::new(base_url)
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn generate_url(&self) -> String {
        format!("{}/generate-stream", self.base_url.trim_end_matches('/'))
    }
}

/// HTTP transport for the generation service.
pub struct GeneratorClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl GeneratorClient {
    /// Creates a client from explicit configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if config.base_url.trim().is_empty() {
            return Err(ClientError::Config("base_url must not be empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a client using `PAPERSTREAM_BASE_URL`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env())
    }
}

#[async_trait::async_trait]
impl GenerateTransport for GeneratorClient {
    async fn open_stream(&self, prompt: &str) -> Result<WireEventStream, ServiceError> {
        debug!(url = %self.config.generate_url(), "opening generation stream");
        let response = self
            .client
            .post(self.config.generate_url())
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|e| ServiceError::transport(format!("generation request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ServiceError::status(
                status.as_u16(),
                format!("generation request failed: {body}"),
            ));
        }

        let bytes_stream: ByteStream = Box::pin(response.bytes_stream());
        Ok(Box::pin(wire_event_stream(bytes_stream)))
    }
}

fn wire_event_stream(
    bytes_stream: ByteStream,
) -> impl futures::Stream<Item = Result<WireEvent, ServiceError>> + Send {
    struct State {
        bytes_stream: ByteStream,
        decoder: SseDecoder,
        pending: VecDeque<WireEvent>,
        skipped: u64,
        done: bool,
    }

    stream::try_unfold(
        State {
            bytes_stream,
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            skipped: 0,
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Ok(Some((event, state)));
                }
                if state.done {
                    return Ok(None);
                }

                match state.bytes_stream.next().await {
                    Some(Ok(chunk)) => {
                        for frame in state.decoder.push_chunk(&chunk) {
                            match decode_frame(&frame) {
                                Some(event) => state.pending.push_back(event),
                                None => state.skipped = state.skipped.saturating_add(1),
                            }
                        }
                        continue;
                    }
                    Some(Err(e)) => {
                        return Err(ServiceError::transport(format!(
                            "streaming read failed: {e}"
                        )));
                    }
                    None => {
                        if state.skipped > 0 {
                            warn!(
                                skipped = state.skipped,
                                "stream contained unusable event records"
                            );
                        }
                        state.done = true;
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_url_joins_without_duplicate_slash() {
        let config = ClientConfig::new("http://localhost:3000/");
        assert_eq!(config.generate_url(), "http://localhost:3000/generate-stream");
    }

    #[test]
    fn new_rejects_empty_base_url() {
        let err = GeneratorClient::new(ClientConfig::new("  ")).err();
        assert!(matches!(err, Some(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn wire_event_stream_decodes_and_skips_malformed_frames() {
        let chunks: Vec<Result<bytes::Bytes, reqwest::Error>> = vec![
            Ok(bytes::Bytes::from_static(b"data: {\"chunk\":\"Top \"}\n\n")),
            Ok(bytes::Bytes::from_static(b"data: {broken\n\n")),
            Ok(bytes::Bytes::from_static(
                b"data: {\"final\":{\"title\":\"GDP Study\"}}\n\n",
            )),
        ];
        let bytes_stream: ByteStream = Box::pin(stream::iter(chunks));
        let events: Vec<_> = wire_event_stream(bytes_stream).collect().await;

        let events: Vec<WireEvent> = events
            .into_iter()
            .collect::<Result<_, _>>()
            .expect("stream should not fail");
        assert_eq!(
            events,
            vec![
                WireEvent::Chunk("Top ".into()),
                WireEvent::Final(serde_json::json!({"title": "GDP Study"})),
            ]
        );
    }
}
