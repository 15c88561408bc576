/// Errors raised while opening or reading the generation stream, before they
/// are normalized for the public event stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The service answered with a non-success HTTP status.
    #[error("service error (status {status_code}): {message}")]
    Status { status_code: u16, message: String },
    /// Network or stream I/O failed.
    #[error("transport error: {message}")]
    Transport { message: String },
}

impl ServiceError {
    /// Creates a status-level error.
    pub fn status(status_code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a transport-level error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Status { message, .. } | Self::Transport { message } => message,
        }
    }
}

/// Terminal stream failure sent through `StreamEvent::Error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum GenerateFailure {
    /// The service reported an application-level error through the stream.
    ///
    /// The message is surfaced verbatim from the `error` record.
    #[error("service failure: {message}")]
    Service { message: String },
    /// Network/stream transport failed before a terminal record arrived.
    #[error("transport failure: {message}")]
    Transport { message: String },
    /// The stream violated the event protocol (for example it ended without a
    /// `final` or `error` record).
    #[error("protocol failure: {message}")]
    Protocol { message: String },
    /// The submission was cancelled by the caller.
    #[error("generation cancelled")]
    Cancelled,
}

/// Top-level error type for the public client API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid input to the builder API.
    #[error("validation error: {0}")]
    Validation(String),
    /// Terminal failure returned from a started stream.
    #[error(transparent)]
    GenerateFailed(GenerateFailure),
    /// Internal protocol misuse or invariant violation.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ClientError {
    pub(crate) fn generate_failed(failure: GenerateFailure) -> Self {
        Self::GenerateFailed(failure)
    }

    pub(crate) fn protocol_msg(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

impl From<GenerateFailure> for ClientError {
    fn from(value: GenerateFailure) -> Self {
        ClientError::GenerateFailed(value)
    }
}

/// Maps transport-layer errors to terminal failures.
///
/// Both arms map to `Transport`: only an `error` record from the stream may
/// become `Service`, since `Service` messages are surfaced to users verbatim
/// while initiation failures get a generic message.
pub(crate) fn failure_from_service_error(err: &ServiceError) -> GenerateFailure {
    match err {
        ServiceError::Status {
            status_code,
            message,
        } => GenerateFailure::Transport {
            message: format!("status {status_code}: {message}"),
        },
        ServiceError::Transport { message } => GenerateFailure::Transport {
            message: message.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initiation_status_failure_maps_to_transport_not_service() {
        let failure = failure_from_service_error(&ServiceError::status(500, "boom"));
        assert_eq!(
            failure,
            GenerateFailure::Transport {
                message: "status 500: boom".into()
            }
        );
    }

    #[test]
    fn transport_failure_keeps_its_message() {
        let failure = failure_from_service_error(&ServiceError::transport("connection reset"));
        assert_eq!(
            failure,
            GenerateFailure::Transport {
                message: "connection reset".into()
            }
        );
    }
}
