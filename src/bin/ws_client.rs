use clap::{Arg, Command};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as TungsteniteMessage};
use url::Url;

const HELP: &str = "\
Commands:
  /join <chat_id>            join a chat room
  /leave <chat_id>           leave a chat room
  /send <chat_id> <text>     send a chat message
  /typing <chat_id>          send a typing indicator
  /call <user_id>            start a call (empty signal)
  /hangup <user_id>          end a call
  /bot                       start the support bot
  /reply <text>              answer the support bot
  /ping                      ping the server
  /quit                      close the connection
Any other line is sent as `<event> [json]`, e.g. `typing {\"chat_id\": \"...\"}`.";

/// Turns one input line into a wire frame. `None` means the line could not
/// be understood.
fn frame_for(line: &str) -> Option<Value> {
    let line = line.trim();
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let frame = match command {
        "/join" => json!({"event": "join_chat", "data": {"chat_id": rest}}),
        "/leave" => json!({"event": "leave_chat", "data": {"chat_id": rest}}),
        "/typing" => json!({"event": "typing", "data": {"chat_id": rest}}),
        "/send" => {
            let (chat_id, body) = rest.split_once(' ')?;
            json!({"event": "send_message", "data": {"chat_id": chat_id, "body": body}})
        }
        "/call" => json!({"event": "call_user", "data": {"to": rest, "signal": {}}}),
        "/hangup" => json!({"event": "end_call", "data": {"to": rest}}),
        "/bot" => json!({"event": "support_bot_start"}),
        "/reply" => json!({"event": "support_bot_reply", "data": {"text": rest}}),
        "/ping" => json!({"event": "ping"}),
        _ if command.starts_with('/') => return None,
        event => {
            let data: Value = if rest.is_empty() {
                json!({})
            } else {
                serde_json::from_str(rest).ok()?
            };
            json!({"event": event, "data": data})
        }
    };
    Some(frame)
}

fn print_event(text: &str) {
    match serde_json::from_str::<Value>(text) {
        Ok(frame) => {
            let event = frame.get("event").and_then(|v| v.as_str()).unwrap_or("unknown");
            let data = frame.get("data").cloned().unwrap_or(Value::Null);
            match event {
                "support_bot_prompt" => {
                    if let Some(error) = data.get("error").and_then(|e| e.as_str()) {
                        println!("[bot] {}", error);
                    }
                    let prompt = data.get("text").and_then(|t| t.as_str()).unwrap_or_default();
                    println!("[bot] {}", prompt);
                    if let Some(choices) = data.get("choices").and_then(|c| c.as_array()) {
                        for choice in choices.iter().filter_map(|c| c.as_str()) {
                            println!("      - {}", choice);
                        }
                    }
                }
                "error" => println!(
                    "[error] {}",
                    data.get("message").and_then(|m| m.as_str()).unwrap_or_default()
                ),
                _ => println!(
                    "[{}] {}",
                    event,
                    serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string())
                ),
            }
        }
        Err(_) => println!("[raw] {}", text),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("campus-desk-ws")
        .about("Interactive client for the campus_desk real-time channel")
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("WebSocket endpoint")
                .default_value("ws://127.0.0.1:8000/ws"),
        )
        .arg(
            Arg::new("token")
                .short('t')
                .long("token")
                .value_name("TOKEN")
                .help("Access token from /api/v1/auth/login")
                .required(true),
        )
        .get_matches();

    let base = matches
        .get_one::<String>("url")
        .ok_or("missing --url")?;
    let token = matches
        .get_one::<String>("token")
        .ok_or("missing --token")?;

    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair("token", token);

    let (ws_stream, response) = connect_async(url).await?;
    println!("Connected ({}). Type /help for commands.", response.status());

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let receive_handle = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            match msg {
                Ok(TungsteniteMessage::Text(text)) => print_event(&text),
                Ok(TungsteniteMessage::Close(frame)) => {
                    println!("Connection closed: {:?}", frame);
                    break;
                }
                Err(e) => {
                    println!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            ws_sender.send(TungsteniteMessage::Close(None)).await?;
            break;
        }
        if line == "/help" {
            println!("{}", HELP);
            continue;
        }
        match frame_for(line) {
            Some(frame) => ws_sender.send(TungsteniteMessage::Text(frame.to_string())).await?,
            None => println!("Could not parse that line. Type /help for commands."),
        }
    }

    receive_handle.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_splits_chat_and_body() {
        let frame = frame_for("/send 7b0c hello there").unwrap();
        assert_eq!(frame["event"], "send_message");
        assert_eq!(frame["data"]["chat_id"], "7b0c");
        assert_eq!(frame["data"]["body"], "hello there");
    }

    #[test]
    fn plain_lines_are_event_and_json() {
        let frame = frame_for(r#"leave_chat {"chat_id": "7b0c"}"#).unwrap();
        assert_eq!(frame["event"], "leave_chat");
        assert_eq!(frame["data"]["chat_id"], "7b0c");
        assert_eq!(frame_for("ping").unwrap()["data"], json!({}));
        assert!(frame_for("typing {not json").is_none());
        assert!(frame_for("/dance").is_none());
    }
}
