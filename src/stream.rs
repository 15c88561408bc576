use crate::errors::GenerateFailure;
use crate::paper::ResearchPaper;

/// Normalized stream events exposed by `GenerateStream`.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    /// First event for every submission.
    Started { request_id: uuid::Uuid },
    /// Incremental text fragment, in arrival order with a monotonic sequence
    /// number. Fragments are only ever appended, never reordered.
    Delta {
        request_id: uuid::Uuid,
        seq: u64,
        text: String,
    },
    /// Terminal success event with the normalized paper.
    Completed {
        request_id: uuid::Uuid,
        paper: ResearchPaper,
    },
    /// Terminal failure event.
    Error {
        request_id: uuid::Uuid,
        error: GenerateFailure,
    },
}
