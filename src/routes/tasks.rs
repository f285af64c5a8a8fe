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
    db::models::{ApiResponse, CreateTaskRequest, CreateTimeLogRequest, TaskListQuery, UpdateTaskRequest},
    error::AppResult,
    services::{TasksService, context::RequestContext},
    validation::ValidatedJson,
};

pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
    Query(query): Query<TaskListQuery>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let tasks = TasksService::list(&mut conn, &ctx, project_id, &query)?;
    let count = tasks.len() as i64;
    Ok(Json(ApiResponse::success_with_count(
        tasks,
        "Tasks retrieved successfully",
        count,
    )))
}

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateTaskRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let task = TasksService::create(&mut conn, &state.ws, &ctx, project_id, &payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(task, "Task created successfully")),
    ))
}

pub async fn get_task(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(task_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let task = TasksService::get(&mut conn, &ctx, task_id)?;
    Ok(Json(ApiResponse::success(task, "Task retrieved successfully")))
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(task_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateTaskRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let task = TasksService::update(&mut conn, &state.ws, &ctx, task_id, &payload)?;
    Ok(Json(ApiResponse::success(task, "Task updated successfully")))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(task_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    TasksService::delete(&mut conn, &ctx, task_id)?;
    Ok(Json(ApiResponse::<()>::ok("Task deleted successfully")))
}

pub async fn log_time(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(task_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateTimeLogRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let entry = TasksService::log_time(&mut conn, &ctx, task_id, &payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(entry, "Time logged successfully")),
    ))
}

pub async fn list_time_logs(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(task_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let logs = TasksService::time_logs(&mut conn, &ctx, task_id)?;
    Ok(Json(ApiResponse::success(logs, "Time logs retrieved successfully")))
}
