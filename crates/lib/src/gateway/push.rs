//! /push_message: health probe on GET, outbound dispatch on POST.

use crate::gateway::protocol::{MessageType, Ping, PushRequest};
use crate::gateway::server::RelayState;
use crate::line::{parse_flex_container, LineError, MessagingApi, OutboundMessage};
use axum::{body::Body, extract::State, http::StatusCode, Json};

/// What a valid push request led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Sent,
    /// Unrecognised message_type; nothing was sent.
    Ignored,
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("flex message layout rejected: {0}")]
    Layout(LineError),
    #[error("push to {to} failed: {source}")]
    Send { to: String, source: LineError },
}

/// Build the message for `req` and push it. At most one send per call.
pub async fn dispatch_push(
    messaging: &dyn MessagingApi,
    flex_alt_text: &str,
    req: PushRequest,
) -> Result<PushOutcome, PushError> {
    let message = match req.message_type {
        MessageType::Text => OutboundMessage::text(req.message),
        MessageType::FlexMessage => {
            let container =
                parse_flex_container(req.message.as_bytes()).map_err(PushError::Layout)?;
            OutboundMessage::flex(flex_alt_text, container)
        }
        MessageType::Unsupported => return Ok(PushOutcome::Ignored),
    };
    let res = messaging
        .push_message(&req.to, vec![message])
        .await
        .map_err(|source| PushError::Send {
            to: req.to.clone(),
            source,
        })?;
    log::debug!(
        "pushed to {} ({} message id(s))",
        req.to,
        res.sent_messages.len()
    );
    Ok(PushOutcome::Sent)
}

/// GET /push_message — liveness probe.
pub(crate) async fn push_ping() -> Json<Ping> {
    Json(Ping::pong())
}

/// POST /push_message — decode the request and forward it. Client-side problems (unreadable
/// body, bad JSON, bad layout) are logged and answered with an empty 200; only a failed
/// send surfaces, as 502.
pub(crate) async fn push_message(State(state): State<RelayState>, body: Body) -> StatusCode {
    let bytes = match axum::body::to_bytes(body, state.config.server.max_body_bytes).await {
        Ok(b) => b,
        Err(e) => {
            log::warn!("push_message: reading request body failed: {}", e);
            return StatusCode::OK;
        }
    };
    let req: PushRequest = match serde_json::from_slice(&bytes) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("push_message: JSON decode error: {}", e);
            return StatusCode::OK;
        }
    };
    match dispatch_push(
        state.messaging.as_ref(),
        &state.config.line.flex_alt_text,
        req,
    )
    .await
    {
        Ok(PushOutcome::Sent) => StatusCode::OK,
        Ok(PushOutcome::Ignored) => {
            log::warn!("push_message: unsupported message_type, nothing sent");
            StatusCode::OK
        }
        Err(e @ PushError::Layout(_)) => {
            log::warn!("push_message: {}", e);
            StatusCode::OK
        }
        Err(e @ PushError::Send { .. }) => {
            log::error!("push_message: {}", e);
            StatusCode::BAD_GATEWAY
        }
    }
}
