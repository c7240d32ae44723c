//! LINE Messaging API: outbound messages, webhook verification and parsing, and the
//! HTTP client used to push and reply.

mod client;
mod message;
mod webhook;

pub use client::{LineClient, MessagingApi, PushResponse, SentMessage};
pub use message::{parse_flex_container, FlexBubble, FlexCarousel, FlexContainer, OutboundMessage};
pub use webhook::{
    parse_request, sign_body, verify_signature, Event, EventMessage, EventSource, MessageEvent,
    WebhookError, WebhookPayload, SIGNATURE_HEADER,
};

/// Errors from the Messaging API client and the flex layout parser.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("messaging api request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("messaging api returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("messaging api response could not be decoded: {0}")]
    Decode(serde_json::Error),
    #[error("invalid flex layout: {0}")]
    Layout(serde_json::Error),
}
