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
        ApiResponse, AvailabilityQuery, CreateBlockRequest, CreateMeetingRequest,
        CreateRoomRequest, RoomListQuery, UpdateMeetingRequest, UpdateRoomRequest, WindowQuery,
    },
    error::AppResult,
    services::{MeetingsService, context::RequestContext},
    validation::ValidatedJson,
};

// Rooms

pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RoomListQuery>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let rooms = MeetingsService::list_rooms(&mut conn, query.campus.as_deref())?;
    let count = rooms.len() as i64;
    Ok(Json(ApiResponse::success_with_count(
        rooms,
        "Rooms retrieved successfully",
        count,
    )))
}

pub async fn available_rooms(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let rooms = MeetingsService::available_rooms(&mut conn, &query)?;
    let count = rooms.len() as i64;
    Ok(Json(ApiResponse::success_with_count(
        rooms,
        "Available rooms retrieved successfully",
        count,
    )))
}

pub async fn create_room(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CreateRoomRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let room = MeetingsService::create_room(&mut conn, &payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(room, "Room created successfully")),
    ))
}

pub async fn update_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRoomRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let room = MeetingsService::update_room(&mut conn, room_id, &payload)?;
    Ok(Json(ApiResponse::success(room, "Room updated successfully")))
}

pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    MeetingsService::delete_room(&mut conn, room_id)?;
    Ok(Json(ApiResponse::<()>::ok("Room deleted successfully")))
}

pub async fn block_slot(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<CreateBlockRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let block = MeetingsService::block_slot(&mut conn, &ctx, room_id, &payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(block, "Room slot blocked")),
    ))
}

pub async fn room_schedule(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<Uuid>,
    Query(query): Query<WindowQuery>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let schedule = MeetingsService::schedule(&mut conn, room_id, &query)?;
    Ok(Json(ApiResponse::success(schedule, "Room schedule retrieved successfully")))
}

// Meetings

pub async fn list_meetings(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Query(query): Query<WindowQuery>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let meetings = MeetingsService::list(&mut conn, &ctx, &query)?;
    let count = meetings.len() as i64;
    Ok(Json(ApiResponse::success_with_count(
        meetings,
        "Meetings retrieved successfully",
        count,
    )))
}

pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<CreateMeetingRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let meeting = MeetingsService::create(&mut conn, &state.ws, &ctx, &payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(meeting, "Meeting scheduled successfully")),
    ))
}

pub async fn update_meeting(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(meeting_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateMeetingRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let meeting = MeetingsService::update(&mut conn, &state.ws, &ctx, meeting_id, &payload)?;
    Ok(Json(ApiResponse::success(meeting, "Meeting updated successfully")))
}

pub async fn delete_meeting(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(meeting_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    MeetingsService::delete(&mut conn, &ctx, meeting_id)?;
    Ok(Json(ApiResponse::<()>::ok("Meeting cancelled successfully")))
}
