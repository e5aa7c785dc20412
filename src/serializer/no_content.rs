use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::WriteError,
    media::MediaType,
    serializer::{ResponseTarget, Serializer, WriteRequest},
};

/// Handles null payloads by writing an empty body and no content-type
/// header. Advertises no concrete media types.
#[derive(Debug, Default)]
pub struct NoContentSerializer;

#[async_trait]
impl Serializer for NoContentSerializer {
    fn name(&self) -> &'static str {
        "no_content"
    }

    fn can_produce(&self, payload: &Value, _content_type: Option<&MediaType>) -> bool {
        payload.is_null()
    }

    fn supported_types(&self, _payload: &Value, _range: Option<&MediaType>) -> Vec<MediaType> {
        Vec::new()
    }

    async fn write(
        &self,
        request: WriteRequest<'_>,
        _response: &mut ResponseTarget<'_>,
    ) -> Result<(), WriteError> {
        if !request.payload.is_null() {
            return Err(WriteError::UnsupportedPayload);
        }
        Ok(())
    }
}
