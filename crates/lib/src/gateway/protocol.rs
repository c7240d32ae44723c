//! Request and response bodies of the control endpoint.

use serde::{Deserialize, Serialize};

/// GET /push_message response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ping {
    pub status: u16,
    pub ping: String,
}

impl Ping {
    pub fn pong() -> Self {
        Self {
            status: 200,
            ping: "pong!".to_string(),
        }
    }
}

/// POST /push_message request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushRequest {
    /// Recipient: user, group or room id.
    pub to: String,
    pub message_type: MessageType,
    /// Literal text for `text`; a flex container JSON document for `flexMessage`.
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "flexMessage")]
    FlexMessage,
    /// Any other value. Accepted and ignored rather than rejected.
    #[serde(other)]
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_serializes_exactly() {
        assert_eq!(
            serde_json::to_string(&Ping::pong()).unwrap(),
            r#"{"status":200,"ping":"pong!"}"#
        );
    }

    #[test]
    fn message_type_decodes_known_and_unknown_values() {
        let req: PushRequest = serde_json::from_str(
            r#"{"to":"U1","message_type":"flexMessage","message":"{}"}"#,
        )
        .unwrap();
        assert_eq!(req.message_type, MessageType::FlexMessage);

        let req: PushRequest =
            serde_json::from_str(r#"{"to":"U1","message_type":"sticker","message":"x"}"#).unwrap();
        assert_eq!(req.message_type, MessageType::Unsupported);
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        assert!(serde_json::from_str::<PushRequest>(r#"{"to":"U1","message":"x"}"#).is_err());
    }
}
