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
    db::models::{ApiResponse, CreateUserRequest, UpdateUserRequest, UserListQuery},
    error::AppResult,
    services::{UsersService, context::RequestContext},
    validation::ValidatedJson,
};

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Query(query): Query<UserListQuery>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let users = UsersService::list(&mut conn, &ctx, &query)?;
    let count = users.len() as i64;
    Ok(Json(ApiResponse::success_with_count(
        users,
        "Users retrieved successfully",
        count,
    )))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(user_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let user = UsersService::get(&mut conn, &ctx, user_id)?;
    Ok(Json(ApiResponse::success(user, "User retrieved successfully")))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let user = UsersService::create(&mut conn, &state.config.auth(), &payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(user, "User created successfully")),
    ))
}

/// Role or campus changes must reach the next request, so the cached
/// context is dropped.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(user_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let user = {
        let mut conn = state.db.get()?;
        UsersService::update(&mut conn, &ctx, user_id, &payload)?
    };
    state.auth_cache.invalidate(user_id).await?;
    Ok(Json(ApiResponse::success(user, "User updated successfully")))
}

pub async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(user_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    {
        let mut conn = state.db.get()?;
        UsersService::deactivate(&mut conn, &ctx, user_id)?;
    }
    state.auth_cache.invalidate(user_id).await?;
    Ok(Json(ApiResponse::<()>::ok("User deactivated successfully")))
}
