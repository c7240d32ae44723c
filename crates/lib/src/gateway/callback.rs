//! /callback: LINE webhook deliveries.

use crate::gateway::server::RelayState;
use crate::line::{
    parse_request, Event, EventMessage, EventSource, MessageEvent, MessagingApi,
    OutboundMessage, WebhookError,
};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode},
};

/// Text that asks the bot for the ids of the chat it was sent from.
pub const CHECK_COMMAND: &str = "check";

/// Reply to the check command: user, group and room id, in that order. Ids that do not
/// apply to the source are left empty.
pub fn check_ids_reply(source: &EventSource) -> String {
    format!(
        "【check ids】\n UserId ----------\n{}\n\n GroupId ----------\n{}\n\n RoomId ----------\n{}",
        source.user_id(),
        source.group_id(),
        source.room_id()
    )
}

/// Handle verified events in delivery order. Returns the number of replies sent.
pub async fn handle_events(messaging: &dyn MessagingApi, events: Vec<Event>) -> usize {
    let mut replied = 0;
    for event in events {
        match event {
            Event::Message(m) => {
                if handle_message_event(messaging, &m).await {
                    replied += 1;
                }
            }
            Event::Follow
            | Event::Unfollow
            | Event::Join
            | Event::Leave
            | Event::Postback
            | Event::Other => {}
        }
    }
    replied
}

async fn handle_message_event(messaging: &dyn MessagingApi, event: &MessageEvent) -> bool {
    let text = match &event.message {
        EventMessage::Text { text, .. } => text,
        _ => return false,
    };
    if text != CHECK_COMMAND {
        return false;
    }
    let Some(reply_token) = event.reply_token.as_deref() else {
        log::debug!("callback: check received without a reply token (standby), not replying");
        return false;
    };
    let reply = OutboundMessage::text(check_ids_reply(&event.source));
    match messaging.reply_message(reply_token, vec![reply]).await {
        Ok(()) => true,
        Err(e) => {
            log::error!("callback: reply to check failed: {}", e);
            false
        }
    }
}

/// POST /callback — 400 on a bad signature, 500 on any other read or parse failure,
/// else 200.
pub(crate) async fn callback(
    State(state): State<RelayState>,
    headers: HeaderMap,
    body: Body,
) -> StatusCode {
    let body = match axum::body::to_bytes(body, state.config.server.max_body_bytes).await {
        Ok(b) => b,
        Err(e) => {
            log::error!("callback: reading request body failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };
    let events = match parse_request(&state.channel_secret, &headers, &body) {
        Ok(events) => events,
        Err(WebhookError::InvalidSignature) => {
            log::warn!("callback: rejected delivery with invalid signature");
            return StatusCode::BAD_REQUEST;
        }
        Err(e) => {
            log::error!("callback: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };
    log::debug!("callback: {} event(s)", events.len());
    handle_events(state.messaging.as_ref(), events).await;
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_reply_lists_user_group_room_in_order() {
        let source = EventSource::Group {
            group_id: "Cgroup".to_string(),
            user_id: Some("Uuser".to_string()),
        };
        assert_eq!(
            check_ids_reply(&source),
            "【check ids】\n UserId ----------\nUuser\n\n GroupId ----------\nCgroup\n\n RoomId ----------\n"
        );
    }

    #[test]
    fn check_reply_for_one_to_one_chat_leaves_group_and_room_empty() {
        let source = EventSource::User {
            user_id: "Uabc".to_string(),
        };
        let reply = check_ids_reply(&source);
        let user = reply.find("UserId").unwrap();
        let group = reply.find("GroupId").unwrap();
        let room = reply.find("RoomId").unwrap();
        assert!(user < group && group < room);
        assert!(reply.contains("\nUabc\n"));
        assert!(reply.ends_with("RoomId ----------\n"));
    }
}
