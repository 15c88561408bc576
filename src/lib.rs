//! Streaming client for a research-paper generation service.
//!
//! A submission posts a prompt, consumes a `data: <json>` event stream,
//! normalizes the terminal payload into a [`ResearchPaper`], and can export
//! it to a paginated PDF or a flat text file.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use paperstream::{ClientConfig, Generator, GeneratorClient, StreamEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), paperstream::ClientError> {
//! let client = GeneratorClient::new(ClientConfig::new("http://localhost:3000"))?;
//! let generator = Generator::new(Arc::new(client));
//!
//! let mut stream = generator.generate("Top Countries by GDP").start_stream().await?;
//! while let Some(event) = stream.next_event().await {
//!     if let StreamEvent::Delta { text, .. } = event {
//!         print!("{text}");
//!     }
//! }
//! let paper = stream.finish().await?;
//! paperstream::export::export_text(&paper, std::path::Path::new("."))
//!     .expect("text export");
//! # Ok(())
//! # }
//! ```

/// HTTP transport, connection settings, and the transport seam.
pub mod client;
/// Public error types used by the client API.
pub mod errors;
/// Exporters: paginated PDF and flat text.
pub mod export;
/// Submission builder, streaming handle, and cancellation handle.
pub mod generate;
/// Markup collaborator: markdown to plain text.
pub mod markdown;
/// Logging setup for the binary.
pub mod observability;
/// Normalized result schema and classification.
pub mod paper;
/// Display-tree renderer for normalized sections.
pub mod render;
/// Normalized public stream events.
pub mod stream;
/// Event-stream framing and record decoding.
pub mod wire;

pub use client::{ClientConfig, GenerateTransport, GeneratorClient, WireEventStream};
pub use errors::{ClientError, GenerateFailure, ServiceError};
pub use export::{ExportError, export_pdf, export_text, render_text};
pub use generate::{AbortHandle, GenerateBuilder, GenerateStream, Generator};
pub use paper::{ResearchPaper, SectionContent};
pub use render::{DisplayNode, render_section, write_display};
pub use stream::StreamEvent;
pub use wire::WireEvent;
