//! Messaging API client: push and reply over HTTPS with a channel access token.

use crate::line::{LineError, OutboundMessage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const PUSH_PATH: &str = "/v2/bot/message/push";
const REPLY_PATH: &str = "/v2/bot/message/reply";
const REQUEST_ID_HEADER: &str = "x-line-request-id";

/// Outbound operations the gateway needs from the messaging platform.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    /// Push messages to a user, group or room id.
    async fn push_message(
        &self,
        to: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<PushResponse, LineError>;

    /// Reply to an event using its single-use reply token.
    async fn reply_message(
        &self,
        reply_token: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), LineError>;
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushResponse {
    #[serde(default)]
    pub sent_messages: Vec<SentMessage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub id: String,
    #[serde(default)]
    pub quote_token: Option<String>,
}

#[derive(Serialize)]
struct PushRequestBody<'a> {
    to: &'a str,
    messages: &'a [OutboundMessage],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequestBody<'a> {
    reply_token: &'a str,
    messages: &'a [OutboundMessage],
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// reqwest-backed Messaging API client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct LineClient {
    api_base: String,
    channel_access_token: String,
    client: reqwest::Client,
}

impl LineClient {
    pub fn new(api_base: &str, channel_access_token: String) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            channel_access_token,
            client: reqwest::Client::new(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// POST a JSON body and return the raw response body, mapping non-2xx to `LineError::Api`.
    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Vec<u8>, LineError> {
        let url = format!("{}{}", self.api_base, path);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.channel_access_token)
            .json(body)
            .send()
            .await?;
        let status = res.status();
        if let Some(id) = res
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            log::debug!("line api {} -> {} (request id {})", path, status, id);
        }
        let bytes = res.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
                .map(|e| e.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(LineError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl MessagingApi for LineClient {
    async fn push_message(
        &self,
        to: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<PushResponse, LineError> {
        let body = self
            .post_json(PUSH_PATH, &PushRequestBody { to, messages: &messages })
            .await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(PushResponse::default());
        }
        serde_json::from_slice(&body).map_err(LineError::Decode)
    }

    async fn reply_message(
        &self,
        reply_token: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), LineError> {
        self.post_json(
            REPLY_PATH,
            &ReplyRequestBody {
                reply_token,
                messages: &messages,
            },
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_api_base() {
        let c = LineClient::new("http://127.0.0.1:9/", "token".to_string());
        assert_eq!(c.api_base(), "http://127.0.0.1:9");
    }

    #[test]
    fn push_response_tolerates_missing_fields() {
        let r: PushResponse = serde_json::from_str("{}").unwrap();
        assert!(r.sent_messages.is_empty());
        let r: PushResponse =
            serde_json::from_str(r#"{"sentMessages":[{"id":"461230966842064897","quoteToken":"q"}]}"#)
                .unwrap();
        assert_eq!(r.sent_messages[0].quote_token.as_deref(), Some("q"));
    }

    #[test]
    fn reply_body_uses_camel_case() {
        let messages = [OutboundMessage::text("hi")];
        let v = serde_json::to_value(ReplyRequestBody {
            reply_token: "r",
            messages: &messages,
        })
        .unwrap();
        assert_eq!(v["replyToken"], "r");
        assert_eq!(v["messages"][0]["text"], "hi");
    }
}
