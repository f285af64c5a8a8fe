use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    db::enums::{Priority, TaskStatus},
    db::models::{
        CreateTaskRequest, CreateTimeLogRequest, NewTask, NewTimeLog, ProjectInfo, TaskChanges,
        TaskInfo, TaskListQuery, TimeLog, TimeLogList, UpdateTaskRequest,
    },
    db::repositories::TasksRepo,
    error::{AppError, AppResult},
    rbac::{OwnershipRule, TaskGuard, check_ownership},
    services::{
        NotificationsService, ProjectsService, context::RequestContext,
        notifications_service::kinds,
    },
    validation::{
        project::validate_date_range,
        task::{validate_assignees, validate_create_task},
    },
    websocket::WebSocketManager,
};

pub struct TasksService;

impl TasksService {
    pub fn list(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        project_id: Uuid,
        query: &TaskListQuery,
    ) -> AppResult<Vec<TaskInfo>> {
        // Listing follows project visibility.
        ProjectsService::get(conn, ctx, project_id)?;
        let tasks = TasksRepo::list_by_project(conn, project_id, query.status, query.assignee_id)?;
        tasks
            .into_iter()
            .map(|task| {
                let assignee_ids = TasksRepo::assignee_ids(conn, task.id)?;
                Ok(TaskInfo { task, assignee_ids })
            })
            .collect()
    }

    pub fn get(conn: &mut PgConnection, ctx: &RequestContext, task_id: Uuid) -> AppResult<TaskInfo> {
        let (info, project) = Self::load(conn, task_id)?;
        // Anyone who can see the project can read its tasks.
        check_ownership(ctx, &project, OwnershipRule::OwnerOrParticipant)?;
        Ok(info)
    }

    pub fn create(
        conn: &mut PgConnection,
        ws: &WebSocketManager,
        ctx: &RequestContext,
        project_id: Uuid,
        req: &CreateTaskRequest,
    ) -> AppResult<TaskInfo> {
        let project = ProjectsService::load(conn, project_id)?;
        check_ownership(ctx, &project, OwnershipRule::OwnerOnly)?;
        validate_create_task(&req.title, req.start_date, req.due_date)?;

        let mut assignees = req.assignee_ids.clone();
        assignees.sort();
        assignees.dedup();
        validate_assignees(&assignees, &project.member_ids)?;

        let info = conn.transaction::<_, AppError, _>(|conn| {
            let task = TasksRepo::insert(
                conn,
                &NewTask {
                    project_id,
                    title: req.title.trim().to_string(),
                    description: req.description.clone(),
                    status: req.status.unwrap_or(TaskStatus::Todo),
                    priority: req.priority.unwrap_or(Priority::Medium),
                    start_date: req.start_date,
                    due_date: req.due_date,
                    created_by: ctx.user_id,
                },
            )?;
            TasksRepo::replace_assignees(conn, task.id, &assignees)?;
            Ok(TaskInfo {
                task,
                assignee_ids: assignees.clone(),
            })
        })?;

        Self::notify_assigned(conn, ws, ctx, &info, &assignees);
        tracing::info!(task_id = %info.task.id, project_id = %project_id, "Task created");
        Ok(info)
    }

    /// Project owners edit anything; assignees may only move the status.
    pub fn update(
        conn: &mut PgConnection,
        ws: &WebSocketManager,
        ctx: &RequestContext,
        task_id: Uuid,
        req: &UpdateTaskRequest,
    ) -> AppResult<TaskInfo> {
        let (info, project) = Self::load(conn, task_id)?;
        let guard = TaskGuard {
            project: &project.project,
            assignee_ids: &info.assignee_ids,
        };
        check_ownership(ctx, &guard, OwnershipRule::OwnerOrParticipant)?;

        let owns = ctx.is_admin() || project.project.manager_id == ctx.user_id;
        if !owns && req.changes_more_than_status() {
            return Err(AppError::forbidden("Assignees can only change a task's status"));
        }

        if let Some(title) = &req.title {
            if title.trim().is_empty() {
                return Err(AppError::validation("Task title cannot be empty"));
            }
        }
        let start = req.start_date.unwrap_or(info.task.start_date);
        let due = req.due_date.unwrap_or(info.task.due_date);
        validate_date_range(start, due)?;

        let newly_assigned = match &req.assignee_ids {
            Some(ids) => {
                let mut ids = ids.clone();
                ids.sort();
                ids.dedup();
                validate_assignees(&ids, &project.member_ids)?;
                Some(ids)
            }
            None => None,
        };

        let changes = TaskChanges {
            title: req.title.as_ref().map(|t| t.trim().to_string()),
            description: req.description.clone(),
            status: req.status,
            priority: req.priority,
            start_date: req.start_date,
            due_date: req.due_date,
            updated_at: Some(Utc::now()),
        };

        let updated = conn.transaction::<_, AppError, _>(|conn| {
            let task = TasksRepo::update(conn, task_id, &changes)?;
            let assignee_ids = match &newly_assigned {
                Some(ids) => {
                    TasksRepo::replace_assignees(conn, task_id, ids)?;
                    ids.clone()
                }
                None => info.assignee_ids.clone(),
            };
            Ok(TaskInfo { task, assignee_ids })
        })?;

        if newly_assigned.is_some() {
            let added: Vec<Uuid> = updated
                .assignee_ids
                .iter()
                .filter(|id| !info.assignee_ids.contains(id))
                .copied()
                .collect();
            Self::notify_assigned(conn, ws, ctx, &updated, &added);
        }
        Ok(updated)
    }

    pub fn delete(conn: &mut PgConnection, ctx: &RequestContext, task_id: Uuid) -> AppResult<()> {
        let (info, project) = Self::load(conn, task_id)?;
        let guard = TaskGuard {
            project: &project.project,
            assignee_ids: &info.assignee_ids,
        };
        check_ownership(ctx, &guard, OwnershipRule::OwnerOnly)?;
        TasksRepo::delete_by_id(conn, task_id)?;
        Ok(())
    }

    /// Assignees log their own time; project owners may log on any task.
    pub fn log_time(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        task_id: Uuid,
        req: &CreateTimeLogRequest,
    ) -> AppResult<TimeLog> {
        let (info, project) = Self::load(conn, task_id)?;
        let guard = TaskGuard {
            project: &project.project,
            assignee_ids: &info.assignee_ids,
        };
        check_ownership(ctx, &guard, OwnershipRule::OwnerOrParticipant)?;

        let today = Utc::now().date_naive();
        let logged_on = req.logged_on.unwrap_or(today);
        if logged_on > today {
            return Err(AppError::validation("Time cannot be logged in the future"));
        }

        let entry = TasksRepo::insert_time_log(
            conn,
            &NewTimeLog {
                task_id,
                user_id: ctx.user_id,
                minutes: req.minutes,
                note: req.note.clone(),
                logged_on,
            },
        )?;
        Ok(entry)
    }

    pub fn time_logs(conn: &mut PgConnection, ctx: &RequestContext, task_id: Uuid) -> AppResult<TimeLogList> {
        let (info, project) = Self::load(conn, task_id)?;
        let guard = TaskGuard {
            project: &project.project,
            assignee_ids: &info.assignee_ids,
        };
        check_ownership(ctx, &guard, OwnershipRule::OwnerOrParticipant)?;

        let entries = TasksRepo::time_logs(conn, task_id)?;
        let total_minutes = entries.iter().map(|e| i64::from(e.minutes)).sum();
        Ok(TimeLogList {
            entries,
            total_minutes,
        })
    }

    fn load(conn: &mut PgConnection, task_id: Uuid) -> AppResult<(TaskInfo, ProjectInfo)> {
        let task = TasksRepo::find_by_id(conn, task_id)?.ok_or_else(|| AppError::not_found("task"))?;
        let project = ProjectsService::load(conn, task.project_id)?;
        let assignee_ids = TasksRepo::assignee_ids(conn, task_id)?;
        Ok((TaskInfo { task, assignee_ids }, project))
    }

    fn notify_assigned(
        conn: &mut PgConnection,
        ws: &WebSocketManager,
        ctx: &RequestContext,
        info: &TaskInfo,
        recipients: &[Uuid],
    ) {
        let rows = recipients
            .iter()
            .filter(|id| **id != ctx.user_id)
            .map(|id| {
                NotificationsService::build(
                    *id,
                    kinds::TASK_ASSIGNED,
                    format!("You were assigned \"{}\"", info.task.title),
                    Some(format!("Assigned by {}", ctx.name)),
                    Some(format!("/projects/{}/tasks/{}", info.task.project_id, info.task.id)),
                )
            })
            .collect();
        NotificationsService::notify(conn, ws, rows);
    }
}
