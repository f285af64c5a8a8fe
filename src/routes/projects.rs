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
        ApiResponse, CreateProjectRequest, ProjectListQuery, SetMembersRequest, UpdateProjectRequest,
    },
    error::AppResult,
    services::{ProjectsService, context::RequestContext},
    validation::ValidatedJson,
};

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Query(query): Query<ProjectListQuery>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let projects = ProjectsService::list(&mut conn, &ctx, &query)?;
    let count = projects.len() as i64;
    Ok(Json(ApiResponse::success_with_count(
        projects,
        "Projects retrieved successfully",
        count,
    )))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let project = ProjectsService::get(&mut conn, &ctx, project_id)?;
    Ok(Json(ApiResponse::success(project, "Project retrieved successfully")))
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<CreateProjectRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let project = ProjectsService::create(&mut conn, &ctx, &payload)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(project, "Project created successfully")),
    ))
}

pub async fn update_project(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProjectRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let project = ProjectsService::update(&mut conn, &ctx, project_id, &payload)?;
    Ok(Json(ApiResponse::success(project, "Project updated successfully")))
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    ProjectsService::delete(&mut conn, &ctx, project_id)?;
    Ok(Json(ApiResponse::<()>::ok("Project deleted successfully")))
}

pub async fn set_members(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<SetMembersRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let project = ProjectsService::set_members(&mut conn, &ctx, project_id, &payload.member_ids)?;
    Ok(Json(ApiResponse::success(project, "Project members updated successfully")))
}

pub async fn project_summary(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let summary = ProjectsService::summary(&mut conn, &ctx, project_id)?;
    Ok(Json(ApiResponse::success(summary, "Project summary generated")))
}
