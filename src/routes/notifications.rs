use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    AppState,
    db::models::{ApiResponse, NotificationQuery},
    error::AppResult,
    services::{NotificationsService, context::RequestContext},
};

#[derive(Serialize)]
pub struct MarkedRead {
    pub updated: usize,
}

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Query(query): Query<NotificationQuery>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let notifications =
        NotificationsService::list(&mut conn, &ctx, query.unread_only.unwrap_or(false))?;
    let count = notifications.len() as i64;
    Ok(Json(ApiResponse::success_with_count(
        notifications,
        "Notifications retrieved successfully",
        count,
    )))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(notification_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    NotificationsService::mark_read(&mut conn, &ctx, notification_id)?;
    Ok(Json(ApiResponse::<()>::ok("Notification marked as read")))
}

pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let updated = NotificationsService::mark_all_read(&mut conn, &ctx)?;
    Ok(Json(ApiResponse::success(
        MarkedRead { updated },
        "Notifications marked as read",
    )))
}
