use std::sync::Arc;

use futures::StreamExt as _;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use crate::client::GenerateTransport;
use crate::errors::{ClientError, GenerateFailure, failure_from_service_error};
use crate::paper::ResearchPaper;
use crate::stream::StreamEvent;
use crate::wire::WireEvent;

const DEFAULT_STREAM_BUFFER_CAPACITY: usize = 128;

/// Handle used to request cancellation of an in-flight submission.
///
/// Each submission owns its handle, so a stale stream can never overwrite
/// state belonging to a newer one.
#[derive(Clone)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortHandle {
    /// Requests cancellation.
    ///
    /// Cancellation is best-effort and becomes visible as a terminal
    /// `StreamEvent::Error` with `GenerateFailure::Cancelled`.
    pub fn abort(&self) {
        let _ = self.tx.send(true);
    }
}

/// Entry point for submitting prompts to the generation service.
#[derive(Clone)]
pub struct Generator {
    transport: Arc<dyn GenerateTransport>,
}

impl Generator {
    /// Creates a generator over the given transport.
    pub fn new(transport: Arc<dyn GenerateTransport>) -> Self {
        Self { transport }
    }

    /// Starts building a submission for the given prompt.
    pub fn generate(&self, prompt: impl Into<String>) -> GenerateBuilder {
        GenerateBuilder {
            transport: self.transport.clone(),
            prompt: prompt.into(),
            stream_buffer_capacity: DEFAULT_STREAM_BUFFER_CAPACITY,
        }
    }
}

/// Builder for configuring and starting a single submission.
pub struct GenerateBuilder {
    transport: Arc<dyn GenerateTransport>,
    prompt: String,
    stream_buffer_capacity: usize,
}

impl GenerateBuilder {
    /// Sets the bounded event buffer size between the stream task and the
    /// consumer.
    pub fn stream_buffer_capacity(mut self, capacity: usize) -> Self {
        self.stream_buffer_capacity = capacity;
        self
    }

    /// Validates the builder state and starts a streaming submission.
    ///
    /// The returned `GenerateStream` yields normalized events (`Started`,
    /// `Delta`, and a terminal `Completed`/`Error` event).
    pub async fn start_stream(self) -> Result<GenerateStream, ClientError> {
        if self.prompt.trim().is_empty() {
            return Err(ClientError::Validation("prompt must not be empty".into()));
        }
        if self.stream_buffer_capacity == 0 {
            return Err(ClientError::Validation(
                "stream_buffer_capacity must be greater than 0".into(),
            ));
        }

        let request_id = uuid::Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.stream_buffer_capacity);
        let (final_tx, final_rx) = oneshot::channel();
        let (abort_tx, abort_rx) = watch::channel(false);

        let abort_handle = AbortHandle { tx: abort_tx };
        tokio::spawn(generate_task(
            self.transport,
            self.prompt,
            request_id,
            tx,
            final_tx,
            abort_rx,
        ));

        Ok(GenerateStream {
            request_id,
            rx,
            final_rx,
            abort_handle,
            saw_terminal: false,
        })
    }

    /// Runs to completion and returns the normalized paper.
    pub async fn collect(self) -> Result<ResearchPaper, ClientError> {
        let stream = self.start_stream().await?;
        stream.finish().await
    }
}

/// Streaming handle returned by `GenerateBuilder::start_stream`.
///
/// Use `next_event()` to consume events as they arrive and `finish()` to
/// obtain the final paper after the terminal event.
pub struct GenerateStream {
    request_id: uuid::Uuid,
    rx: mpsc::Receiver<StreamEvent>,
    final_rx: oneshot::Receiver<Result<ResearchPaper, ClientError>>,
    abort_handle: AbortHandle,
    saw_terminal: bool,
}

impl GenerateStream {
    /// Returns the request id for this submission.
    pub fn request_id(&self) -> uuid::Uuid {
        self.request_id
    }

    /// Returns a handle that can cancel the submission.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort_handle.clone()
    }

    /// Waits for and returns the next normalized stream event.
    ///
    /// Returns `None` after the stream channel is closed.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        let event = self.rx.recv().await;
        if let Some(StreamEvent::Completed { .. } | StreamEvent::Error { .. }) = &event {
            self.saw_terminal = true;
        }
        event
    }

    /// Drains the stream (if needed) and returns the terminal result.
    ///
    /// Safe to call after consuming events manually with `next_event()`.
    pub async fn finish(mut self) -> Result<ResearchPaper, ClientError> {
        while !self.saw_terminal {
            match self.rx.recv().await {
                Some(StreamEvent::Completed { .. } | StreamEvent::Error { .. }) => {
                    self.saw_terminal = true;
                }
                Some(_) => {}
                None => break,
            }
        }

        match self.final_rx.await {
            Ok(result) => result,
            Err(_) => Err(ClientError::protocol_msg(
                "stream task ended without a final result",
            )),
        }
    }
}

async fn generate_task(
    transport: Arc<dyn GenerateTransport>,
    prompt: String,
    request_id: uuid::Uuid,
    tx: mpsc::Sender<StreamEvent>,
    final_tx: oneshot::Sender<Result<ResearchPaper, ClientError>>,
    mut abort_rx: watch::Receiver<bool>,
) {
    if !send_event(&tx, StreamEvent::Started { request_id }).await {
        let _ = final_tx.send(Err(ClientError::protocol_msg(
            "stream receiver dropped before Started",
        )));
        return;
    }

    let mut stream = match transport.open_stream(&prompt).await {
        Ok(stream) => stream,
        Err(err) => {
            let failure = failure_from_service_error(&err);
            let _ = send_event(
                &tx,
                StreamEvent::Error {
                    request_id,
                    error: failure.clone(),
                },
            )
            .await;
            let _ = final_tx.send(Err(ClientError::generate_failed(failure)));
            return;
        }
    };

    let mut seq = 0_u64;
    let mut abort_closed = false;
    loop {
        tokio::select! {
            changed = abort_rx.changed(), if !abort_closed => {
                match changed {
                    Ok(_) if *abort_rx.borrow() => {
                        let failure = GenerateFailure::Cancelled;
                        let _ = send_event(&tx, StreamEvent::Error { request_id, error: failure.clone() }).await;
                        let _ = final_tx.send(Err(ClientError::generate_failed(failure)));
                        return;
                    }
                    Ok(_) => {}
                    // Every abort handle is gone, so cancellation can no
                    // longer be requested; a closed watch channel resolves
                    // immediately forever and must not be polled again.
                    Err(_) => abort_closed = true,
                }
            }
            next = stream.next() => {
                match next {
                    Some(Ok(WireEvent::Chunk(text))) => {
                        if text.is_empty() {
                            continue;
                        }
                        debug!(request_id = %request_id, seq, "stream text chunk");
                        let sent = send_event(&tx, StreamEvent::Delta { request_id, seq, text }).await;
                        seq = seq.saturating_add(1);
                        if !sent {
                            let _ = final_tx.send(Err(ClientError::protocol_msg("stream receiver dropped during output")));
                            return;
                        }
                    }
                    Some(Ok(WireEvent::Final(payload))) => {
                        let paper = ResearchPaper::normalize(payload);
                        let sent = send_event(&tx, StreamEvent::Completed { request_id, paper: paper.clone() }).await;
                        let _ = final_tx.send(if sent { Ok(paper) } else { Err(ClientError::protocol_msg("stream receiver dropped before completion")) });
                        return;
                    }
                    Some(Ok(WireEvent::Error(message))) => {
                        let failure = GenerateFailure::Service { message };
                        let _ = send_event(&tx, StreamEvent::Error { request_id, error: failure.clone() }).await;
                        let _ = final_tx.send(Err(ClientError::generate_failed(failure)));
                        return;
                    }
                    Some(Err(err)) => {
                        let failure = failure_from_service_error(&err);
                        let _ = send_event(&tx, StreamEvent::Error { request_id, error: failure.clone() }).await;
                        let _ = final_tx.send(Err(ClientError::generate_failed(failure)));
                        return;
                    }
                    None => {
                        let failure = GenerateFailure::Protocol { message: "stream ended without a final or error record".into() };
                        let _ = send_event(&tx, StreamEvent::Error { request_id, error: failure.clone() }).await;
                        let _ = final_tx.send(Err(ClientError::generate_failed(failure)));
                        return;
                    }
                }
            }
        }
    }
}

async fn send_event(tx: &mpsc::Sender<StreamEvent>, event: StreamEvent) -> bool {
    tx.send(event).await.is_ok()
}
