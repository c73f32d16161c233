use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderName},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use futures::Stream;
use notably::relay::{Enhancement, Mode, RelayStream};
use serde::Deserialize;
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};

// Missing fields fall through to the relay's own validation
#[derive(Debug, Deserialize)]
struct EnhanceRequest {
    #[serde(default)]
    content: String,
    #[serde(default)]
    action: String,
    #[serde(default)]
    stream: bool,
}

/// Relay events framed as `text/event-stream`.
///
/// Each event is written as soon as the relay yields it. Dropping the body
/// (client gone) drops the relay stream and with it the upstream connection.
pub struct SseResponse {
    events: RelayStream,
}

impl SseResponse {
    fn new(events: RelayStream) -> Self {
        Self { events }
    }
}

impl Stream for SseResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events)
            .poll_next(cx)
            .map(|opt| opt.map(|event| Ok(Bytes::from(event.to_sse()))))
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> Response {
        let body = Body::from_stream(self);

        (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
                (HeaderName::from_static("x-accel-buffering"), "no"),
            ],
            body,
        )
            .into_response()
    }
}

fn wants_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|accept| accept.to_str().ok())
        .is_some_and(|accept| accept.contains("text/event-stream"))
}

async fn handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
    request: Result<Json<EnhanceRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = request?;
    let mode = if request.stream || wants_event_stream(&headers) {
        Mode::Stream
    } else {
        Mode::Complete
    };
    tracing::debug!(%user, action = %request.action, ?mode, "enhance request");

    match state
        .relay
        .enhance(&request.content, &request.action, mode)
        .await?
    {
        Enhancement::Complete(result) => Ok(Json(result).into_response()),
        Enhancement::Stream(events) => Ok(SseResponse::new(events).into_response()),
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/ai/enhance", post(handler))
        .with_state(state)
}
