use campus_desk::websocket::{ClientEvent, EventError, ServerEvent};
use serde_json::{Value, json};
use uuid::Uuid;

#[test]
fn signaling_payload_is_kept_verbatim() {
    let to = Uuid::new_v4();
    let signal = json!({"type": "offer", "sdp": "v=0..."});
    let frame = json!({"event": "call_user", "data": {"to": to, "signal": signal}}).to_string();
    match ClientEvent::parse(&frame).unwrap() {
        ClientEvent::CallUser(input) => {
            assert_eq!(input.to, to);
            assert_eq!(input.signal, signal);
            assert!(input.chat_id.is_none());
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn unknown_and_malformed_frames_are_reported() {
    assert!(matches!(
        ClientEvent::parse(r#"{"event": "dance"}"#),
        Err(EventError::UnknownEvent(_))
    ));
    assert!(matches!(ClientEvent::parse("not json"), Err(EventError::Malformed(_))));
    assert!(matches!(
        ClientEvent::parse(r#"{"event": "join_chat", "data": {}}"#),
        Err(EventError::InvalidPayload { .. })
    ));
}

#[test]
fn server_frames_use_the_event_envelope() {
    let user_id = Uuid::new_v4();
    let encoded = ServerEvent::UserOffline { user_id }.encode().unwrap();
    let value: Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(value["event"], "user_offline");
    assert_eq!(value["data"]["user_id"], json!(user_id));
}
