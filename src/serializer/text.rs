use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::WriteError,
    media::MediaType,
    serializer::{
        ResponseTarget, Serializer, WriteRequest, content_type_with_charset, filter_supported,
        write_body,
    },
};

/// Writes string payloads as `text/plain`. Declines everything else so that
/// structured payloads fall through to a structured serializer.
#[derive(Debug, Default)]
pub struct PlainTextSerializer;

impl PlainTextSerializer {
    fn supported(&self) -> Vec<MediaType> {
        vec![MediaType::of("text", "plain")]
    }
}

#[async_trait]
impl Serializer for PlainTextSerializer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn can_produce(&self, payload: &Value, content_type: Option<&MediaType>) -> bool {
        if !payload.is_string() {
            return false;
        }
        match content_type {
            None => true,
            Some(target) => self
                .supported()
                .iter()
                .any(|supported| supported.is_subset_of(target)),
        }
    }

    fn supported_types(&self, payload: &Value, range: Option<&MediaType>) -> Vec<MediaType> {
        if !payload.is_string() {
            return Vec::new();
        }
        filter_supported(self.supported(), range)
    }

    async fn write(
        &self,
        request: WriteRequest<'_>,
        response: &mut ResponseTarget<'_>,
    ) -> Result<(), WriteError> {
        let text = request.payload.as_str().ok_or(WriteError::UnsupportedPayload)?;
        let fallback = MediaType::of("text", "plain");
        let header = content_type_with_charset(request.content_type.unwrap_or(&fallback));
        response.set_content_type(header);
        write_body(response, text.as_bytes(), request.cancel).await
    }
}
