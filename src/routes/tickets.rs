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
        ApiResponse, AssignTicketRequest, CreateTicketCommentRequest, CreateTicketRequest,
        TicketListQuery, UpdateTicketRequest,
    },
    error::AppResult,
    services::{TicketsService, context::RequestContext},
    validation::ValidatedJson,
};

pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Query(query): Query<TicketListQuery>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let tickets = TicketsService::list(&mut conn, &ctx, &query)?;
    let count = tickets.len() as i64;
    Ok(Json(ApiResponse::success_with_count(
        tickets,
        "Tickets retrieved successfully",
        count,
    )))
}

pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<CreateTicketRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let ticket = TicketsService::create(&mut conn, &ctx, &payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(ticket, "Ticket created successfully")),
    ))
}

pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let ticket = TicketsService::get(&mut conn, &ctx, ticket_id)?;
    Ok(Json(ApiResponse::success(ticket, "Ticket retrieved successfully")))
}

pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<UpdateTicketRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let ticket = TicketsService::update(&mut conn, &state.ws, &ctx, ticket_id, &payload)?;
    Ok(Json(ApiResponse::success(ticket, "Ticket updated successfully")))
}

pub async fn assign_ticket(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<AssignTicketRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let ticket = TicketsService::assign(&mut conn, &state.ws, &ctx, ticket_id, &payload)?;
    Ok(Json(ApiResponse::success(ticket, "Ticket assigned successfully")))
}

pub async fn comment_ticket(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(ticket_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateTicketCommentRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let comment = TicketsService::comment(&mut conn, &state.ws, &ctx, ticket_id, &payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(comment, "Comment added successfully")),
    ))
}

pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    TicketsService::delete(&mut conn, &ctx, ticket_id)?;
    Ok(Json(ApiResponse::<()>::ok("Ticket deleted successfully")))
}
