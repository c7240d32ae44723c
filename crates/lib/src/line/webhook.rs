//! Webhook payloads delivered to /callback, and X-Line-Signature verification.

use axum::http::HeaderMap;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("invalid webhook payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Request body of a webhook delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: String,
    pub events: Vec<Event>,
}

/// A webhook event. Only message events are inspected; the others are decoded so that
/// they can be matched and skipped explicitly.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Message(MessageEvent),
    Follow,
    Unfollow,
    Join,
    Leave,
    Postback,
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent for events delivered while the channel is in standby mode; those cannot be
    /// replied to.
    #[serde(default)]
    pub reply_token: Option<String>,
    pub source: EventSource,
    #[serde(default)]
    pub timestamp: i64,
    pub message: EventMessage,
}

/// Where an event came from: a 1:1 chat, a group chat, or a multi-person room.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventSource {
    #[serde(rename_all = "camelCase")]
    User { user_id: String },
    #[serde(rename_all = "camelCase")]
    Group {
        group_id: String,
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Room {
        room_id: String,
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(other)]
    Other,
}

impl EventSource {
    /// Sender's user id; empty when the platform omits it (e.g. group members who have
    /// not added the bot).
    pub fn user_id(&self) -> &str {
        match self {
            Self::User { user_id } => user_id,
            Self::Group { user_id, .. } | Self::Room { user_id, .. } => {
                user_id.as_deref().unwrap_or("")
            }
            Self::Other => "",
        }
    }

    pub fn group_id(&self) -> &str {
        match self {
            Self::Group { group_id, .. } => group_id,
            _ => "",
        }
    }

    pub fn room_id(&self) -> &str {
        match self {
            Self::Room { room_id, .. } => room_id,
            _ => "",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventMessage {
    Text { id: String, text: String },
    Image { id: String },
    Video { id: String },
    Audio { id: String },
    File { id: String },
    Location { id: String },
    Sticker { id: String },
    #[serde(other)]
    Other,
}

/// Check `signature` (base64 HMAC-SHA256 of the raw body keyed by the channel secret).
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Verify the X-Line-Signature header and decode the events, keeping delivery order.
pub fn parse_request(
    channel_secret: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Vec<Event>, WebhookError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::InvalidSignature)?;
    if !verify_signature(channel_secret, body, signature) {
        return Err(WebhookError::InvalidSignature);
    }
    let payload: WebhookPayload = serde_json::from_slice(body)?;
    Ok(payload.events)
}

/// Compute the X-Line-Signature value for `body`. `None` only if the key is rejected,
/// which HMAC does not do for any length.
pub fn sign_body(channel_secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes()).ok()?;
    mac.update(body);
    Some(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}
