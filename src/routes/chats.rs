use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    AppState,
    db::models::{
        ApiResponse, CreateChatRequest, EditMessageRequest, MessageListQuery, ReactionRequest,
        SendMessageRequest,
    },
    error::AppResult,
    services::{ChatsService, context::RequestContext},
    validation::ValidatedJson,
};

pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let chats = ChatsService::list(&mut conn, &ctx)?;
    let count = chats.len() as i64;
    Ok(Json(ApiResponse::success_with_count(
        chats,
        "Chats retrieved successfully",
        count,
    )))
}

pub async fn create_chat(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<CreateChatRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let chat = ChatsService::create(&mut conn, &ctx, &payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(chat, "Chat created successfully")),
    ))
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(chat_id): Path<Uuid>,
    Query(query): Query<MessageListQuery>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let messages = ChatsService::messages(&mut conn, &ctx, chat_id, &query)?;
    let count = messages.len() as i64;
    Ok(Json(ApiResponse::success_with_count(
        messages,
        "Messages retrieved successfully",
        count,
    )))
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(chat_id): Path<Uuid>,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let message = ChatsService::send(&mut conn, &state.ws, &ctx, chat_id, &payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(message, "Message sent")),
    ))
}

pub async fn edit_message(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(message_id): Path<Uuid>,
    Json(payload): Json<EditMessageRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let message = ChatsService::edit(&mut conn, &state.ws, &ctx, message_id, &payload)?;
    Ok(Json(ApiResponse::success(message, "Message updated")))
}

pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(message_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    ChatsService::delete(&mut conn, &state.ws, &ctx, message_id)?;
    Ok(Json(ApiResponse::<()>::ok("Message deleted")))
}

pub async fn toggle_reaction(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(message_id): Path<Uuid>,
    Json(payload): Json<ReactionRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let reactions =
        ChatsService::toggle_reaction(&mut conn, &state.ws, &ctx, message_id, &payload.emoji)?;
    Ok(Json(ApiResponse::success(reactions, "Reactions updated")))
}
