use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    db::enums::{ProjectStatus, TaskStatus, UserRole},
    db::models::{
        CreateProjectRequest, NewProject, ProjectChanges, ProjectInfo, ProjectListQuery,
        ProjectSummary, StatusCount, UpdateProjectRequest,
    },
    db::repositories::{ProjectScope, ProjectsRepo, UsersRepo},
    error::{AppError, AppResult},
    rbac::{OwnershipRule, check_ownership},
    services::context::RequestContext,
    validation::project::{validate_create_project, validate_date_range},
};

pub struct ProjectsService;

impl ProjectsService {
    pub fn scope_for(ctx: &RequestContext) -> ProjectScope {
        match ctx.role {
            UserRole::Admin => ProjectScope::All,
            UserRole::Manager => ProjectScope::ManagedBy(ctx.user_id),
            UserRole::TeamMember => ProjectScope::MemberOf(ctx.user_id),
            UserRole::Customer => ProjectScope::CustomerOf(ctx.user_id),
        }
    }

    pub fn list(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        query: &ProjectListQuery,
    ) -> AppResult<Vec<ProjectInfo>> {
        let projects = ProjectsRepo::list(conn, Self::scope_for(ctx), query.status)?;
        projects
            .into_iter()
            .map(|project| {
                let member_ids = ProjectsRepo::member_ids(conn, project.id)?;
                Ok(ProjectInfo { project, member_ids })
            })
            .collect()
    }

    /// Loads a project with its members, without any access check.
    pub fn load(conn: &mut PgConnection, project_id: Uuid) -> AppResult<ProjectInfo> {
        let project = ProjectsRepo::find_by_id(conn, project_id)?
            .ok_or_else(|| AppError::not_found("project"))?;
        let member_ids = ProjectsRepo::member_ids(conn, project_id)?;
        Ok(ProjectInfo { project, member_ids })
    }

    pub fn get(conn: &mut PgConnection, ctx: &RequestContext, project_id: Uuid) -> AppResult<ProjectInfo> {
        let info = Self::load(conn, project_id)?;
        check_ownership(ctx, &info, OwnershipRule::OwnerOrParticipant)?;
        Ok(info)
    }

    pub fn create(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        req: &CreateProjectRequest,
    ) -> AppResult<ProjectInfo> {
        validate_create_project(&req.name, req.start_date, req.end_date)?;

        let manager_id = match req.manager_id {
            Some(id) if id != ctx.user_id => {
                if !ctx.is_admin() {
                    return Err(AppError::forbidden("Only admins can assign another manager"));
                }
                Self::ensure_role(conn, id, &[UserRole::Admin, UserRole::Manager], "Manager")?;
                id
            }
            _ => ctx.user_id,
        };
        if let Some(customer_id) = req.customer_id {
            Self::ensure_role(conn, customer_id, &[UserRole::Customer], "Customer")?;
        }
        let members = Self::existing_members(conn, &req.member_ids)?;

        conn.transaction::<_, AppError, _>(|conn| {
            let project = ProjectsRepo::insert(
                conn,
                &NewProject {
                    name: req.name.trim().to_string(),
                    description: req.description.clone(),
                    manager_id,
                    customer_id: req.customer_id,
                    start_date: req.start_date,
                    end_date: req.end_date,
                    status: req.status.unwrap_or(ProjectStatus::Planning),
                },
            )?;
            ProjectsRepo::replace_members(conn, project.id, &members)?;
            tracing::info!(project_id = %project.id, manager_id = %manager_id, "Project created");
            Ok(ProjectInfo {
                project,
                member_ids: members,
            })
        })
    }

    pub fn update(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        project_id: Uuid,
        req: &UpdateProjectRequest,
    ) -> AppResult<ProjectInfo> {
        let info = Self::load(conn, project_id)?;
        check_ownership(ctx, &info, OwnershipRule::OwnerOnly)?;

        if let Some(name) = &req.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Project name cannot be empty"));
            }
        }
        let start = req.start_date.unwrap_or(info.project.start_date);
        let end = req.end_date.unwrap_or(info.project.end_date);
        validate_date_range(start, end)?;

        if let Some(manager_id) = req.manager_id {
            if manager_id != info.project.manager_id {
                if !ctx.is_admin() {
                    return Err(AppError::forbidden("Only admins can reassign a project"));
                }
                Self::ensure_role(conn, manager_id, &[UserRole::Admin, UserRole::Manager], "Manager")?;
            }
        }
        if let Some(Some(customer_id)) = req.customer_id {
            Self::ensure_role(conn, customer_id, &[UserRole::Customer], "Customer")?;
        }

        let changes = ProjectChanges {
            name: req.name.as_ref().map(|n| n.trim().to_string()),
            description: req.description.clone(),
            manager_id: req.manager_id,
            customer_id: req.customer_id,
            start_date: req.start_date,
            end_date: req.end_date,
            status: req.status,
            updated_at: Some(Utc::now()),
        };
        let project = ProjectsRepo::update(conn, project_id, &changes)?;
        Ok(ProjectInfo {
            project,
            member_ids: info.member_ids,
        })
    }

    pub fn delete(conn: &mut PgConnection, ctx: &RequestContext, project_id: Uuid) -> AppResult<()> {
        let info = Self::load(conn, project_id)?;
        check_ownership(ctx, &info, OwnershipRule::OwnerOnly)?;
        ProjectsRepo::delete_by_id(conn, project_id)?;
        tracing::info!(project_id = %project_id, by = %ctx.user_id, "Project deleted");
        Ok(())
    }

    pub fn set_members(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        project_id: Uuid,
        member_ids: &[Uuid],
    ) -> AppResult<ProjectInfo> {
        let info = Self::load(conn, project_id)?;
        check_ownership(ctx, &info, OwnershipRule::OwnerOnly)?;
        let members = Self::existing_members(conn, member_ids)?;
        ProjectsRepo::replace_members(conn, project_id, &members)?;
        Ok(ProjectInfo {
            project: info.project,
            member_ids: members,
        })
    }

    pub fn summary(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        project_id: Uuid,
    ) -> AppResult<ProjectSummary> {
        let info = Self::load(conn, project_id)?;
        check_ownership(ctx, &info, OwnershipRule::OwnerOrParticipant)?;

        let counts = ProjectsRepo::task_status_counts(conn, project_id)?;
        let overdue = ProjectsRepo::overdue_task_count(conn, project_id, Utc::now().date_naive())?;
        let logged = ProjectsRepo::logged_minutes(conn, project_id)?;
        Ok(summarize(project_id, &counts, overdue, logged))
    }

    fn existing_members(conn: &mut PgConnection, requested: &[Uuid]) -> AppResult<Vec<Uuid>> {
        let mut wanted: Vec<Uuid> = requested.to_vec();
        wanted.sort();
        wanted.dedup();
        let found = UsersRepo::existing_active_ids(conn, &wanted)?;
        if let Some(missing) = wanted.iter().find(|id| !found.contains(id)) {
            return Err(AppError::validation(format!("User {} does not exist or is inactive", missing)));
        }
        Ok(wanted)
    }

    fn ensure_role(conn: &mut PgConnection, user_id: Uuid, roles: &[UserRole], what: &str) -> AppResult<()> {
        let user = UsersRepo::find_active_by_id(conn, user_id)?
            .ok_or_else(|| AppError::validation(format!("{} does not exist", what)))?;
        if !roles.contains(&user.role) {
            return Err(AppError::validation(format!("{} has the wrong role ({})", what, user.role)));
        }
        Ok(())
    }
}

/// Deterministic project digest: tasks per status (every status listed,
/// zeros included), overdue count, logged time and share of tasks done.
pub fn summarize(
    project_id: Uuid,
    counts: &[(TaskStatus, i64)],
    overdue_tasks: i64,
    logged_minutes: i64,
) -> ProjectSummary {
    let tasks_by_status: Vec<StatusCount> = TaskStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: counts
                .iter()
                .filter(|(s, _)| s == status)
                .map(|(_, n)| *n)
                .sum(),
        })
        .collect();
    let total_tasks: i64 = tasks_by_status.iter().map(|c| c.count).sum();
    let done = tasks_by_status
        .iter()
        .find(|c| c.status == TaskStatus::Done)
        .map(|c| c.count)
        .unwrap_or(0);
    let completion_percent = if total_tasks == 0 {
        0
    } else {
        ((done * 100) / total_tasks) as u8
    };

    ProjectSummary {
        project_id,
        total_tasks,
        tasks_by_status,
        overdue_tasks,
        logged_minutes,
        completion_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_every_status_and_rounds_down() {
        let id = Uuid::new_v4();
        let summary = summarize(id, &[(TaskStatus::Done, 1), (TaskStatus::Todo, 2)], 1, 95);
        assert_eq!(summary.total_tasks, 3);
        assert_eq!(summary.tasks_by_status.len(), TaskStatus::ALL.len());
        assert_eq!(summary.completion_percent, 33);
        assert_eq!(summary.overdue_tasks, 1);
        assert_eq!(summary.logged_minutes, 95);
    }

    #[test]
    fn listing_scope_follows_role() {
        let ctx = |role| RequestContext {
            user_id: Uuid::nil(),
            name: "Sam".into(),
            email: "sam@example.com".into(),
            role,
            department: None,
            campus_access: vec![],
        };
        assert_eq!(ProjectsService::scope_for(&ctx(UserRole::Admin)), ProjectScope::All);
        assert_eq!(ProjectsService::scope_for(&ctx(UserRole::Manager)), ProjectScope::ManagedBy(Uuid::nil()));
        assert_eq!(ProjectsService::scope_for(&ctx(UserRole::TeamMember)), ProjectScope::MemberOf(Uuid::nil()));
        assert_eq!(ProjectsService::scope_for(&ctx(UserRole::Customer)), ProjectScope::CustomerOf(Uuid::nil()));
    }

    #[test]
    fn empty_project_is_zero_percent() {
        let summary = summarize(Uuid::new_v4(), &[], 0, 0);
        assert_eq!(summary.total_tasks, 0);
        assert_eq!(summary.completion_percent, 0);
    }
}
