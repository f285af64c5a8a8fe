pub mod basic_tests;
pub mod call_tests;

use futures_util::StreamExt;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message as TungsteniteMessage,
};
use url::Url;
use uuid::Uuid;

pub const API_URL: &str = "http://127.0.0.1:8000/api/v1";
pub const WEBSOCKET_URL: &str = "ws://127.0.0.1:8000/ws";

pub type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// A freshly registered account on the running server.
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

pub async fn register_and_login(name: &str) -> TestUser {
    let client = reqwest::Client::new();
    let email = format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4());
    let password = "Passw0rd123";

    let registered = client
        .post(format!("{}/auth/register", API_URL))
        .json(&json!({"name": name, "email": email, "password": password}))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(registered.status(), 201);

    let body: Value = client
        .post(format!("{}/auth/login", API_URL))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await
        .expect("login request failed")
        .json()
        .await
        .expect("login body was not JSON");

    let data = &body["data"];
    TestUser {
        id: serde_json::from_value(data["user"]["id"].clone()).expect("missing user id"),
        token: data["access_token"].as_str().expect("missing token").to_string(),
    }
}

pub async fn connect(token: &str) -> Socket {
    let mut url = Url::parse(WEBSOCKET_URL).expect("invalid url");
    url.query_pairs_mut().append_pair("token", token);
    let (socket, _) = connect_async(url).await.expect("websocket connect failed");
    socket
}

/// Next text frame as JSON, skipping control frames.
pub async fn next_event(socket: &mut Socket) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .expect("socket error");
        if let TungsteniteMessage::Text(text) = frame {
            return serde_json::from_str(&text).expect("frame was not JSON");
        }
    }
}

/// Reads frames until one with the given event name arrives.
pub async fn expect_event(socket: &mut Socket, event: &str) -> Value {
    loop {
        let frame = next_event(socket).await;
        if frame["event"] == event {
            return frame;
        }
    }
}
