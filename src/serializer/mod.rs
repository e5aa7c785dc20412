use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::{error::WriteError, media::MediaType};

pub mod json;
pub mod no_content;
pub mod text;

pub use json::JsonSerializer;
pub use no_content::NoContentSerializer;
pub use text::PlainTextSerializer;

/// Response-side surface a serializer writes into: a settable content-type
/// header and a writable body.
pub struct ResponseTarget<'a> {
    content_type: Option<String>,
    body: &'a mut (dyn AsyncWrite + Send + Unpin),
}

impl<'a> ResponseTarget<'a> {
    pub fn new(body: &'a mut (dyn AsyncWrite + Send + Unpin)) -> Self {
        Self {
            content_type: None,
            body,
        }
    }

    pub fn set_content_type(&mut self, value: impl Into<String>) {
        self.content_type = Some(value.into());
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&mut self) -> &mut (dyn AsyncWrite + Send + Unpin) {
        &mut *self.body
    }
}

/// Inputs to a single body write. `content_type` is the negotiated concrete
/// type, absent only for serializers that advertise no types.
pub struct WriteRequest<'a> {
    pub payload: &'a Value,
    pub content_type: Option<&'a MediaType>,
    pub cancel: &'a CancellationToken,
}

/// A component able to produce response bytes for specific content types.
/// Implementations are stateless and shared across concurrent requests; the
/// capability probes are synchronous, only `write` suspends.
#[async_trait]
pub trait Serializer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this serializer can produce a body for `payload` as
    /// `content_type`. `None` asks about producing anything at all.
    fn can_produce(&self, payload: &Value, content_type: Option<&MediaType>) -> bool;

    /// Concrete types this serializer can emit for `payload`, filtered to
    /// those matching `range` when present, in preference order.
    fn supported_types(&self, payload: &Value, range: Option<&MediaType>) -> Vec<MediaType>;

    /// Writes the body and sets the final content-type header, including any
    /// charset. Must honor the request's cancellation token.
    async fn write(
        &self,
        request: WriteRequest<'_>,
        response: &mut ResponseTarget<'_>,
    ) -> Result<(), WriteError>;
}

/// Ordered serializer list; registration order is the negotiation
/// tie-break priority.
#[derive(Clone)]
pub struct SerializerRegistry {
    serializers: Vec<Arc<dyn Serializer>>,
}

impl SerializerRegistry {
    pub fn new(serializers: impl IntoIterator<Item = Arc<dyn Serializer>>) -> Self {
        Self {
            serializers: serializers.into_iter().collect(),
        }
    }

    pub fn serializers(&self) -> &[Arc<dyn Serializer>] {
        &self.serializers
    }

    pub fn len(&self) -> usize {
        self.serializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serializers.is_empty()
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::new(build_default_serializers())
    }
}

pub fn build_default_serializers() -> Vec<Arc<dyn Serializer>> {
    vec![
        Arc::new(NoContentSerializer),
        Arc::new(PlainTextSerializer),
        Arc::new(JsonSerializer),
    ]
}

pub(crate) fn filter_supported(
    supported: Vec<MediaType>,
    range: Option<&MediaType>,
) -> Vec<MediaType> {
    match range {
        None => supported,
        Some(range) => supported
            .into_iter()
            .filter(|candidate| candidate.is_subset_of(range))
            .collect(),
    }
}

/// Appends `charset=utf-8` unless the negotiated type already carries a
/// charset parameter.
pub(crate) fn content_type_with_charset(content_type: &MediaType) -> String {
    if content_type.parameter("charset").is_some() {
        content_type.to_string()
    } else {
        format!("{content_type}; charset=utf-8")
    }
}

pub(crate) async fn write_body(
    response: &mut ResponseTarget<'_>,
    bytes: &[u8],
    cancel: &CancellationToken,
) -> Result<(), WriteError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(WriteError::Cancelled),
        outcome = async {
            let body = response.body();
            body.write_all(bytes).await?;
            body.flush().await
        } => outcome.map_err(WriteError::from),
    }
}
