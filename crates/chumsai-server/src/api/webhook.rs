//! `POST /api/webhook`: LINE event intake.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use chumsai_core::{find_nearby, Coordinate};
use chumsai_line::{
    build_nearby_message, text_reply, verify_signature, Event, IncomingMessage, OutgoingMessage,
    WebhookBody, SIGNATURE_HEADER,
};
use chumsai_source::fetch_rows_or_empty;

use super::{ApiError, AppState};
use crate::middleware::RequestId;

/// Verifies the signature, then answers each event before acknowledging.
///
/// Only signature and body problems produce an error status; failures while
/// searching or replying are logged and LINE still gets `200 OK`.
pub(super) async fn receive(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        tracing::warn!(request_id = %req_id.0, "webhook request without signature header");
        return ApiError::new(req_id.0, "invalid_signature", "missing X-Line-Signature header")
            .into_response();
    };

    if !verify_signature(&state.channel_secret, &body, signature) {
        tracing::warn!(request_id = %req_id.0, "webhook signature mismatch");
        return ApiError::new(req_id.0, "invalid_signature", "invalid X-Line-Signature")
            .into_response();
    }

    let payload: WebhookBody = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(request_id = %req_id.0, error = %e, "malformed webhook body");
            return ApiError::new(req_id.0, "bad_request", "malformed webhook body")
                .into_response();
        }
    };

    tracing::debug!(request_id = %req_id.0, events = payload.events.len(), "webhook received");
    for event in &payload.events {
        handle_event(&state, event).await;
    }

    (StatusCode::OK, "OK").into_response()
}

async fn handle_event(state: &AppState, event: &Event) {
    let Event::Message(event) = event else {
        return;
    };
    let Some(reply_token) = event.reply_token.as_deref() else {
        tracing::debug!("message event without reply token");
        return;
    };

    let message = match &event.message {
        IncomingMessage::Location {
            latitude,
            longitude,
            ..
        } => nearby_message(state, *latitude, *longitude).await,
        IncomingMessage::Text { text } => {
            OutgoingMessage::text(text_reply(text, state.search.radius_km))
        }
        IncomingMessage::Other => return,
    };

    if let Err(e) = state.line.reply(reply_token, &[message]).await {
        tracing::error!(error = %e, "failed to send LINE reply");
    }
}

/// Runs the search for a shared location. Any failure degrades to the
/// "nothing nearby" bubble.
async fn nearby_message(state: &AppState, latitude: f64, longitude: f64) -> OutgoingMessage {
    let sites = match Coordinate::new(latitude, longitude) {
        Ok(user) => {
            let rows = fetch_rows_or_empty(&state.source).await;
            find_nearby(user, &rows, &state.search).unwrap_or_else(|e| {
                tracing::error!(error = %e, "nearby search rejected its parameters");
                Vec::new()
            })
        }
        Err(e) => {
            tracing::warn!(latitude, longitude, error = %e, "location outside valid range");
            Vec::new()
        }
    };

    build_nearby_message(&sites, state.search.radius_km, &state.map_url)
}

#[cfg(test)]
#[path = "webhook_test.rs"]
mod tests;
