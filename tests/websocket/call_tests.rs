use futures_util::SinkExt;
use serde_json::json;
use tokio_tungstenite::tungstenite::protocol::Message as TungsteniteMessage;
use uuid::Uuid;

use super::{connect, expect_event, register_and_login};

#[tokio::test]
#[ignore = "requires running server"]
async fn offer_and_answer_are_relayed_between_peers() {
    let caller = register_and_login("Avery").await;
    let callee = register_and_login("Quinn").await;
    let mut caller_socket = connect(&caller.token).await;
    let mut callee_socket = connect(&callee.token).await;
    expect_event(&mut caller_socket, "connected").await;
    expect_event(&mut callee_socket, "connected").await;

    let offer = json!({"type": "offer", "sdp": "v=0"});
    caller_socket
        .send(TungsteniteMessage::Text(
            json!({"event": "call_user", "data": {"to": callee.id, "signal": offer}}).to_string(),
        ))
        .await
        .unwrap();
    let incoming = expect_event(&mut callee_socket, "incoming_call").await;
    assert_eq!(incoming["data"]["from"], json!(caller.id));
    assert_eq!(incoming["data"]["signal"], offer);

    let answer = json!({"type": "answer", "sdp": "v=0"});
    callee_socket
        .send(TungsteniteMessage::Text(
            json!({"event": "answer_call", "data": {"to": caller.id, "signal": answer}}).to_string(),
        ))
        .await
        .unwrap();
    let accepted = expect_event(&mut caller_socket, "call_accepted").await;
    assert_eq!(accepted["data"]["signal"], answer);
}

#[tokio::test]
#[ignore = "requires running server"]
async fn calling_an_offline_user_reports_offline() {
    let caller = register_and_login("Skyler").await;
    let mut socket = connect(&caller.token).await;
    expect_event(&mut socket, "connected").await;

    let nobody = Uuid::new_v4();
    socket
        .send(TungsteniteMessage::Text(
            json!({"event": "call_user", "data": {"to": nobody, "signal": {}}}).to_string(),
        ))
        .await
        .unwrap();
    let offline = expect_event(&mut socket, "user_offline").await;
    assert_eq!(offline["data"]["user_id"], json!(nobody));
}
