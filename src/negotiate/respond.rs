use tokio_util::sync::CancellationToken;

use crate::{
    error::NegotiationError,
    negotiate::{
        negotiator::Negotiator,
        types::{Negotiated, NegotiationRequest, ResponseOutcome},
    },
    serializer::{ResponseTarget, WriteRequest},
};

/// Negotiates and drives the selected serializer's write. A write error
/// after selection is a `WriteFailure`: negotiation has committed, the
/// request is not retried.
pub async fn respond(
    negotiator: &Negotiator,
    outcome: &ResponseOutcome,
    request: &NegotiationRequest<'_>,
    response: &mut ResponseTarget<'_>,
    cancel: &CancellationToken,
) -> Result<Negotiated, NegotiationError> {
    let negotiated = negotiator.negotiate(outcome, request)?;

    let write_request = WriteRequest {
        payload: &outcome.payload,
        content_type: negotiated.content_type.as_ref(),
        cancel,
    };
    negotiated
        .serializer
        .write(write_request, response)
        .await
        .map_err(NegotiationError::from)?;

    Ok(negotiated)
}
