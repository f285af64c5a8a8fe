use futures_util::SinkExt;
use serde_json::json;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as TungsteniteMessage};

use super::{WEBSOCKET_URL, connect, expect_event, register_and_login};

#[tokio::test]
#[ignore = "requires running server"]
async fn connection_without_token_is_rejected() {
    assert!(connect_async(WEBSOCKET_URL).await.is_err());
}

#[tokio::test]
#[ignore = "requires running server"]
async fn connection_with_garbage_token_is_rejected() {
    let url = format!("{}?token=not-a-jwt", WEBSOCKET_URL);
    assert!(connect_async(url).await.is_err());
}

#[tokio::test]
#[ignore = "requires running server"]
async fn connected_frame_then_ping_pong() {
    let user = register_and_login("Riley").await;
    let mut socket = connect(&user.token).await;

    let connected = expect_event(&mut socket, "connected").await;
    assert_eq!(connected["data"]["user_id"], json!(user.id));

    socket
        .send(TungsteniteMessage::Text(json!({"event": "ping"}).to_string()))
        .await
        .unwrap();
    let pong = expect_event(&mut socket, "pong").await;
    assert!(pong["data"]["timestamp"].is_string());
}

#[tokio::test]
#[ignore = "requires running server"]
async fn unknown_event_gets_an_error_frame() {
    let user = register_and_login("Jordan").await;
    let mut socket = connect(&user.token).await;
    expect_event(&mut socket, "connected").await;

    socket
        .send(TungsteniteMessage::Text(json!({"event": "teleport"}).to_string()))
        .await
        .unwrap();
    let error = expect_event(&mut socket, "error").await;
    assert!(error["data"]["message"].as_str().unwrap().contains("teleport"));
}

#[tokio::test]
#[ignore = "requires running server"]
async fn support_bot_walks_to_a_ticket() {
    let user = register_and_login("Morgan").await;
    let mut socket = connect(&user.token).await;
    expect_event(&mut socket, "connected").await;

    socket
        .send(TungsteniteMessage::Text(json!({"event": "support_bot_start"}).to_string()))
        .await
        .unwrap();
    expect_event(&mut socket, "support_bot_prompt").await;

    for answer in [
        "1",
        "Lab PC will not boot",
        "Machine 12 in lab C shows a black screen.",
        "skip",
        "West",
        "hardware",
        "medium",
    ] {
        socket
            .send(TungsteniteMessage::Text(
                json!({"event": "support_bot_reply", "data": {"text": answer}}).to_string(),
            ))
            .await
            .unwrap();
        if answer == "medium" {
            break;
        }
        expect_event(&mut socket, "support_bot_prompt").await;
    }

    let done = expect_event(&mut socket, "support_bot_done").await;
    assert!(done["data"]["ticket_id"].is_string());
}
