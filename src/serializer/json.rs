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

/// Serializes any payload as JSON. Produces `application/json` and
/// `text/json`.
#[derive(Debug, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    fn supported(&self) -> Vec<MediaType> {
        vec![
            MediaType::of("application", "json"),
            MediaType::of("text", "json"),
        ]
    }
}

#[async_trait]
impl Serializer for JsonSerializer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn can_produce(&self, _payload: &Value, content_type: Option<&MediaType>) -> bool {
        match content_type {
            None => true,
            Some(target) => self
                .supported()
                .iter()
                .any(|supported| supported.is_subset_of(target)),
        }
    }

    fn supported_types(&self, _payload: &Value, range: Option<&MediaType>) -> Vec<MediaType> {
        filter_supported(self.supported(), range)
    }

    async fn write(
        &self,
        request: WriteRequest<'_>,
        response: &mut ResponseTarget<'_>,
    ) -> Result<(), WriteError> {
        let bytes = serde_json::to_vec(request.payload)?;
        let fallback = MediaType::of("application", "json");
        let header = content_type_with_charset(request.content_type.unwrap_or(&fallback));
        response.set_content_type(header);
        write_body(response, &bytes, request.cancel).await
    }
}
