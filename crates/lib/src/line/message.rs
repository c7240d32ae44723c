//! Outbound message shapes sent to the Messaging API, and the flex layout parser.

use crate::line::LineError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A message object in a push or reply request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    Flex {
        #[serde(rename = "altText")]
        alt_text: String,
        contents: FlexContainer,
    },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Wrap a parsed layout in a flex message. `alt_text` is what chat lists and push
    /// notifications show in place of the layout.
    pub fn flex(alt_text: impl Into<String>, contents: FlexContainer) -> Self {
        Self::Flex {
            alt_text: alt_text.into(),
            contents,
        }
    }
}

/// Top-level flex layout: a single bubble or a carousel of bubbles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FlexContainer {
    Bubble(FlexBubble),
    Carousel(FlexCarousel),
}

/// Bubble fields (header, hero, body, footer, styles, ...) are kept verbatim; the relay
/// only forwards them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexBubble {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexCarousel {
    pub contents: Vec<FlexBubble>,
}

/// Parse a flex container document (the JSON `contents` of a flex message).
pub fn parse_flex_container(raw: &[u8]) -> Result<FlexContainer, LineError> {
    serde_json::from_slice(raw).map_err(LineError::Layout)
}
