use axum::{
    Json,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    db::models::{ApiResponse, SendMessageRequest},
    error::{AppError, AppResult},
    services::{ChatsService, TicketsService, context::RequestContext},
    support_bot::{BotReply, SupportBot},
    websocket::{
        auth::{WebSocketAuthQuery, authenticate_websocket},
        events::{ClientEvent, ServerEvent},
        manager::{ConnectedUser, Payload, WebSocketManager},
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WebSocketAuthQuery>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Response> {
    let (_, ctx) = match authenticate_websocket(&state, &query).await {
        Ok(auth) => auth,
        Err(e) => {
            warn!(error = %e, "WebSocket authentication failed");
            return Err(e);
        }
    };

    info!(user_id = %ctx.user_id, "WebSocket upgrade accepted");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, ctx)))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, ctx: RequestContext) {
    let manager = state.ws.clone();
    let connection_id = Uuid::new_v4().to_string();
    let user_id = ctx.user_id;

    // Subscribe before registering so nothing addressed to us is missed.
    let mut rx = manager.subscribe();
    manager
        .add_connection(
            connection_id.clone(),
            ConnectedUser::new(user_id, ctx.name.clone(), ctx.role),
        )
        .await;

    let welcome = ServerEvent::Connected {
        connection_id: connection_id.clone(),
        user_id,
        online_users: manager.online_user_ids().await.len(),
    };
    if let Ok(text) = welcome.encode() {
        let _ = socket.send(Message::Text(text)).await;
    }

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = {
        let connection_id = connection_id.clone();
        tokio::spawn(async move {
            loop {
                let delivery = match rx.recv().await {
                    Ok(delivery) => delivery,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(connection_id = %connection_id, skipped, "Connection lagging, frames dropped");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if !delivery.is_for(&connection_id, user_id) {
                    continue;
                }
                match delivery.payload {
                    Payload::Text(text) => {
                        if sender.send(Message::Text(text.to_string())).await.is_err() {
                            break;
                        }
                    }
                    Payload::Close => {
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        })
    };

    let mut recv_task = {
        let mut session = Session {
            state: state.clone(),
            ctx,
            connection_id: connection_id.clone(),
            bot: None,
        };
        tokio::spawn(async move {
            while let Some(frame) = receiver.next().await {
                match frame {
                    Ok(Message::Text(text)) => session.on_text(&text).await,
                    Ok(Message::Close(_)) => {
                        info!(connection_id = %session.connection_id, "WebSocket closed by client");
                        break;
                    }
                    Err(e) => {
                        warn!(connection_id = %session.connection_id, error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        })
    };

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    manager.remove_connection(&connection_id).await;
}

/// Per-connection state. The support bot lives here and dies with the
/// socket.
struct Session {
    state: Arc<AppState>,
    ctx: RequestContext,
    connection_id: String,
    bot: Option<SupportBot>,
}

impl Session {
    fn ws(&self) -> &WebSocketManager {
        &self.state.ws
    }

    fn reply(&self, event: &ServerEvent) {
        self.ws().send_to_connection(&self.connection_id, event);
    }

    fn reply_error(&self, error: &AppError) {
        let message = if error.status_code().is_server_error() {
            "Internal server error".to_string()
        } else {
            error.to_string()
        };
        self.reply(&ServerEvent::error(message));
    }

    async fn on_text(&mut self, text: &str) {
        let event = match ClientEvent::parse(text) {
            Ok(event) => event,
            Err(e) => {
                debug!(connection_id = %self.connection_id, error = %e, "Rejected client frame");
                self.reply(&ServerEvent::error(e.to_string()));
                return;
            }
        };
        if let Err(e) = self.dispatch(event).await {
            self.reply_error(&e);
        }
    }

    async fn dispatch(&mut self, event: ClientEvent) -> AppResult<()> {
        let user_id = self.ctx.user_id;
        match event {
            ClientEvent::JoinChat(chat) => {
                {
                    let mut conn = self.state.db.get()?;
                    ChatsService::ensure_participant(&mut conn, chat.chat_id, user_id)?;
                }
                self.ws().join_room(&self.connection_id, chat.chat_id).await;
            }
            ClientEvent::LeaveChat(chat) => {
                self.ws().leave_room(&self.connection_id, chat.chat_id).await;
            }
            ClientEvent::SendMessage(outgoing) => {
                let mut conn = self.state.db.get()?;
                let request = SendMessageRequest {
                    body: outgoing.body,
                    attachments: outgoing.attachments,
                };
                ChatsService::send(&mut conn, self.ws(), &self.ctx, outgoing.chat_id, &request)?;
            }
            ClientEvent::Typing(chat) => {
                self.ensure_joined(chat.chat_id).await?;
                let event = ServerEvent::Typing {
                    chat_id: chat.chat_id,
                    user_id,
                };
                self.ws().send_to_room(chat.chat_id, Some(self.connection_id.as_str()), &event).await;
            }
            ClientEvent::StopTyping(chat) => {
                self.ensure_joined(chat.chat_id).await?;
                let event = ServerEvent::StopTyping {
                    chat_id: chat.chat_id,
                    user_id,
                };
                self.ws().send_to_room(chat.chat_id, Some(self.connection_id.as_str()), &event).await;
            }
            ClientEvent::AddReaction(reaction) => {
                let mut conn = self.state.db.get()?;
                ChatsService::toggle_reaction(
                    &mut conn,
                    self.ws(),
                    &self.ctx,
                    reaction.message_id,
                    &reaction.emoji,
                )?;
            }
            ClientEvent::CallUser(input) => {
                let event = ServerEvent::IncomingCall {
                    from: user_id,
                    signal: input.signal,
                    chat_id: input.chat_id,
                };
                self.relay(input.to, &event).await;
            }
            ClientEvent::AnswerCall(input) => {
                let event = ServerEvent::CallAccepted {
                    from: user_id,
                    signal: input.signal,
                };
                self.relay(input.to, &event).await;
            }
            ClientEvent::Ringing(peer) => {
                self.relay(peer.to, &ServerEvent::Ringing { from: user_id }).await;
            }
            ClientEvent::EndCall(peer) => {
                self.relay(peer.to, &ServerEvent::CallEnded { from: user_id }).await;
            }
            ClientEvent::SupportBotStart => {
                let bot = SupportBot::new();
                self.reply(&ServerEvent::SupportBotPrompt(bot.prompt()));
                self.bot = Some(bot);
            }
            ClientEvent::SupportBotReply(input) => self.advance_bot(&input.text)?,
            ClientEvent::Ping => {
                self.ws().update_ping(&self.connection_id).await;
                self.reply(&ServerEvent::Pong { timestamp: Utc::now() });
            }
        }
        Ok(())
    }

    async fn ensure_joined(&self, chat_id: Uuid) -> AppResult<()> {
        let joined = self
            .ws()
            .get_connection(&self.connection_id)
            .await
            .is_some_and(|conn| conn.rooms.contains(&chat_id));
        if !joined {
            return Err(AppError::forbidden("Join the chat before sending typing events"));
        }
        Ok(())
    }

    /// Signaling is forwarded as-is; an absent peer is reported back.
    async fn relay(&self, to: Uuid, event: &ServerEvent) {
        if !self.ws().relay(to, event).await {
            debug!(from = %self.ctx.user_id, to = %to, "Relay target offline");
            self.reply(&ServerEvent::UserOffline { user_id: to });
        }
    }

    fn advance_bot(&mut self, text: &str) -> AppResult<()> {
        let Some(bot) = self.bot.as_mut() else {
            return Err(AppError::validation("Start the support bot first"));
        };

        match bot.advance(text) {
            prompt @ BotReply::Prompt { .. } => {
                self.reply(&ServerEvent::SupportBotPrompt(prompt));
            }
            BotReply::Closed { text } => {
                self.bot = None;
                self.reply(&ServerEvent::SupportBotDone {
                    ticket_id: None,
                    text,
                });
            }
            BotReply::Submit { request } => {
                self.bot = None;
                let mut conn = self.state.db.get()?;
                let created = TicketsService::create(&mut conn, &self.ctx, &request)?;
                info!(
                    ticket_id = %created.ticket.id,
                    user_id = %self.ctx.user_id,
                    "Ticket raised through support bot"
                );
                self.reply(&ServerEvent::SupportBotDone {
                    ticket_id: Some(created.ticket.id),
                    text: format!(
                        "Your ticket \"{}\" has been raised. We will get back to you soon.",
                        created.ticket.title
                    ),
                });
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct OnlineUsers {
    pub count: usize,
    pub user_ids: Vec<Uuid>,
}

pub async fn online_users(
    State(state): State<Arc<AppState>>,
    _ctx: RequestContext,
) -> impl IntoResponse {
    let user_ids = state.ws.online_user_ids().await;
    Json(ApiResponse::success(
        OnlineUsers {
            count: user_ids.len(),
            user_ids,
        },
        "Online users retrieved",
    ))
}
