use std::io::Cursor;

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use accord::{
    error::{NegotiationError, WriteError},
    media::MediaType,
    negotiate::{NegotiationPolicy, NegotiationRequest, Negotiator, ResponseOutcome, respond},
    serializer::{ResponseTarget, SerializerRegistry},
};

fn media(text: &str) -> MediaType {
    MediaType::parse(text).expect("media type should parse")
}

fn default_negotiator() -> Negotiator {
    Negotiator::new(SerializerRegistry::default(), NegotiationPolicy::default())
}

#[tokio::test]
async fn given_json_payload_when_responding_then_body_and_charset_header_are_written() {
    let negotiator = default_negotiator();
    let payload = json!({"x1": 10, "y1": "Hello"});
    let outcome = ResponseOutcome::new(payload.clone());
    let request = NegotiationRequest {
        accept: Some("application/json"),
        ..NegotiationRequest::default()
    };
    let mut body = Cursor::new(Vec::new());
    let mut response = ResponseTarget::new(&mut body);

    respond(
        &negotiator,
        &outcome,
        &request,
        &mut response,
        &CancellationToken::new(),
    )
    .await
    .expect("respond should succeed");

    assert_eq!(
        response.content_type(),
        Some("application/json; charset=utf-8")
    );
    assert_eq!(
        body.into_inner(),
        serde_json::to_vec(&payload).expect("payload should serialize")
    );
}

#[tokio::test]
async fn given_declared_type_with_charset_then_it_is_not_doubled() {
    let negotiator = default_negotiator();
    let outcome = ResponseOutcome::with_declared_types(
        json!({"x1": 10}),
        vec![media("application/json; charset=utf-8")],
    );
    let mut body = Cursor::new(Vec::new());
    let mut response = ResponseTarget::new(&mut body);

    respond(
        &negotiator,
        &outcome,
        &NegotiationRequest::default(),
        &mut response,
        &CancellationToken::new(),
    )
    .await
    .expect("respond should succeed");

    assert_eq!(
        response.content_type(),
        Some("application/json; charset=utf-8")
    );
}

#[tokio::test]
async fn given_string_payload_then_plain_text_with_charset_is_written() {
    let negotiator = default_negotiator();
    let outcome = ResponseOutcome::new(json!("testInput"));
    let mut body = Cursor::new(Vec::new());
    let mut response = ResponseTarget::new(&mut body);

    respond(
        &negotiator,
        &outcome,
        &NegotiationRequest::default(),
        &mut response,
        &CancellationToken::new(),
    )
    .await
    .expect("respond should succeed");

    assert_eq!(response.content_type(), Some("text/plain; charset=utf-8"));
    assert_eq!(body.into_inner(), b"testInput");
}

#[tokio::test]
async fn given_null_payload_then_empty_body_and_no_content_type() {
    let negotiator = default_negotiator();
    let outcome = ResponseOutcome::new(Value::Null);
    let mut body = Cursor::new(Vec::new());
    let mut response = ResponseTarget::new(&mut body);

    respond(
        &negotiator,
        &outcome,
        &NegotiationRequest::default(),
        &mut response,
        &CancellationToken::new(),
    )
    .await
    .expect("respond should succeed");

    assert_eq!(response.content_type(), None);
    assert!(body.into_inner().is_empty());
}

#[tokio::test]
async fn given_cancelled_request_then_write_fails_after_commit() {
    let negotiator = default_negotiator();
    let outcome = ResponseOutcome::new(json!({"x1": 10}));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut body = Cursor::new(Vec::new());
    let mut response = ResponseTarget::new(&mut body);

    let err = respond(
        &negotiator,
        &outcome,
        &NegotiationRequest::default(),
        &mut response,
        &cancel,
    )
    .await
    .expect_err("respond should fail");

    assert!(matches!(
        err,
        NegotiationError::WriteFailure(WriteError::Cancelled)
    ));
    assert_eq!(err.status_code(), 500);
}
