//! Wire format of the real-time channel: every frame is
//! `{"event": <name>, "data": <object>}`.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::db::models::{Message, MessageInfo, Notification, ReactionSummary};
use crate::support_bot::BotReply;

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatRef {
    pub chat_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutgoingMessage {
    pub chat_id: Uuid,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReactionInput {
    pub message_id: Uuid,
    pub emoji: String,
}

/// A signaling frame addressed to one peer. `signal` is forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignalInput {
    pub to: Uuid,
    #[serde(default)]
    pub signal: Value,
    #[serde(default)]
    pub chat_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PeerRef {
    pub to: Uuid,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BotInput {
    pub text: String,
}

/// Frames a client may send.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    JoinChat(ChatRef),
    LeaveChat(ChatRef),
    SendMessage(OutgoingMessage),
    Typing(ChatRef),
    StopTyping(ChatRef),
    AddReaction(ReactionInput),
    CallUser(SignalInput),
    AnswerCall(SignalInput),
    Ringing(PeerRef),
    EndCall(PeerRef),
    SupportBotStart,
    SupportBotReply(BotInput),
    Ping,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EventError {
    #[error("Malformed frame: {0}")]
    Malformed(String),
    #[error("Unknown event: {0}")]
    UnknownEvent(String),
    #[error("Invalid payload for {event}: {reason}")]
    InvalidPayload { event: String, reason: String },
}

fn payload<T: DeserializeOwned>(event: &str, data: Value) -> Result<T, EventError> {
    serde_json::from_value(data).map_err(|e| EventError::InvalidPayload {
        event: event.to_string(),
        reason: e.to_string(),
    })
}

impl ClientEvent {
    pub fn parse(text: &str) -> Result<Self, EventError> {
        let Envelope { event, data } =
            serde_json::from_str(text).map_err(|e| EventError::Malformed(e.to_string()))?;

        let parsed = match event.as_str() {
            "join_chat" => ClientEvent::JoinChat(payload(&event, data)?),
            "leave_chat" => ClientEvent::LeaveChat(payload(&event, data)?),
            "send_message" => ClientEvent::SendMessage(payload(&event, data)?),
            "typing" => ClientEvent::Typing(payload(&event, data)?),
            "stop_typing" => ClientEvent::StopTyping(payload(&event, data)?),
            "add_reaction" => ClientEvent::AddReaction(payload(&event, data)?),
            "call_user" => ClientEvent::CallUser(payload(&event, data)?),
            "answer_call" => ClientEvent::AnswerCall(payload(&event, data)?),
            "ringing" => ClientEvent::Ringing(payload(&event, data)?),
            "end_call" => ClientEvent::EndCall(payload(&event, data)?),
            "support_bot_start" => ClientEvent::SupportBotStart,
            "support_bot_reply" => ClientEvent::SupportBotReply(payload(&event, data)?),
            "ping" => ClientEvent::Ping,
            _ => return Err(EventError::UnknownEvent(event)),
        };
        Ok(parsed)
    }
}

/// Frames the server sends.
#[derive(Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected {
        connection_id: String,
        user_id: Uuid,
        online_users: usize,
    },
    ReceiveMessage(MessageInfo),
    MessageEdited(Message),
    MessageDeleted {
        chat_id: Uuid,
        message_id: Uuid,
    },
    Typing {
        chat_id: Uuid,
        user_id: Uuid,
    },
    StopTyping {
        chat_id: Uuid,
        user_id: Uuid,
    },
    ReactionUpdated {
        chat_id: Uuid,
        message_id: Uuid,
        reactions: Vec<ReactionSummary>,
    },
    IncomingCall {
        from: Uuid,
        signal: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        chat_id: Option<Uuid>,
    },
    CallAccepted {
        from: Uuid,
        signal: Value,
    },
    Ringing {
        from: Uuid,
    },
    CallEnded {
        from: Uuid,
    },
    UserOffline {
        user_id: Uuid,
    },
    Notification(Notification),
    SupportBotPrompt(BotReply),
    SupportBotDone {
        #[serde(skip_serializing_if = "Option::is_none")]
        ticket_id: Option<Uuid>,
        text: String,
    },
    Error {
        message: String,
    },
    Pong {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_chat_events() {
        let chat_id = Uuid::new_v4();
        let text = json!({"event": "typing", "data": {"chat_id": chat_id}}).to_string();
        assert_eq!(
            ClientEvent::parse(&text).unwrap(),
            ClientEvent::Typing(ChatRef { chat_id })
        );
    }

    #[test]
    fn events_without_payload_need_no_data() {
        assert_eq!(ClientEvent::parse(r#"{"event":"ping"}"#).unwrap(), ClientEvent::Ping);
        assert_eq!(
            ClientEvent::parse(r#"{"event":"support_bot_start","data":null}"#).unwrap(),
            ClientEvent::SupportBotStart
        );
    }

    #[test]
    fn signal_payload_is_kept_verbatim() {
        let to = Uuid::new_v4();
        let signal = json!({"type": "offer", "sdp": "v=0\r\n", "nested": [1, 2, {"a": null}]});
        let text = json!({"event": "call_user", "data": {"to": to, "signal": signal}}).to_string();
        match ClientEvent::parse(&text).unwrap() {
            ClientEvent::CallUser(input) => {
                assert_eq!(input.to, to);
                assert_eq!(input.signal, signal);
                assert_eq!(input.chat_id, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_and_broken_frames() {
        assert!(matches!(
            ClientEvent::parse(r#"{"event":"self_destruct"}"#),
            Err(EventError::UnknownEvent(_))
        ));
        assert!(matches!(ClientEvent::parse("not json"), Err(EventError::Malformed(_))));
        assert!(matches!(
            ClientEvent::parse(r#"{"event":"join_chat","data":{"chat_id":"nope"}}"#),
            Err(EventError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn server_events_use_the_envelope() {
        let from = Uuid::new_v4();
        let value: Value =
            serde_json::from_str(&ServerEvent::Ringing { from }.encode().unwrap()).unwrap();
        assert_eq!(value["event"], "ringing");
        assert_eq!(value["data"]["from"], json!(from));

        let value: Value =
            serde_json::from_str(&ServerEvent::error("boom").encode().unwrap()).unwrap();
        assert_eq!(value, json!({"event": "error", "data": {"message": "boom"}}));
    }
}
