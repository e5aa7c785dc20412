use thiserror::Error;

use crate::consumes::HandlerId;

/// Failure outcomes of consumes disambiguation. Absence of a match is an
/// explicit outcome, never a silently substituted default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// No candidate accepts the request body. Maps to 415 at the protocol
    /// boundary.
    #[error("no candidate accepts request content type '{content_type}'")]
    UnsupportedMediaType { content_type: String },

    /// Two or more candidates accept the request. Callers may apply a
    /// secondary selection over the surviving handlers; this crate never
    /// resolves the tie itself.
    #[error("request matches multiple handlers: {}", handlers.join(", "))]
    AmbiguousMatch { handlers: Vec<HandlerId> },
}

impl SelectionError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnsupportedMediaType { .. } => 415,
            Self::AmbiguousMatch { .. } => 500,
        }
    }
}

/// Failure outcomes of response content negotiation.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// No serializer/type pair satisfies the declared content types and the
    /// request's Accept preferences. Maps to 406.
    #[error("no serializer satisfies the declared content types and accept preferences")]
    NotAcceptable,

    /// An explicit format key has no configured media type mapping.
    #[error("unknown response format '{key}'")]
    UnknownFormat { key: String },

    /// The selected serializer failed while writing the body. Fatal for the
    /// request: negotiation has already committed, so there is no retry.
    #[error("response write failed after negotiation committed")]
    WriteFailure(#[from] WriteError),
}

impl NegotiationError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotAcceptable | Self::UnknownFormat { .. } => 406,
            Self::WriteFailure(_) => 500,
        }
    }
}

/// Errors surfaced by `Serializer::write`.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("response body write failed")]
    Io(#[from] std::io::Error),

    #[error("payload serialization failed")]
    Serialize(#[from] serde_json::Error),

    #[error("payload is not representable by this serializer")]
    UnsupportedPayload,

    #[error("response write was cancelled")]
    Cancelled,
}
