use diesel::prelude::*;
use uuid::Uuid;

use crate::db::enums::{ProjectStatus, TaskStatus};
use crate::db::models::project::{NewProject, Project, ProjectChanges, ProjectMember};

pub struct ProjectsRepo;

/// Which slice of projects a caller may list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectScope {
    All,
    ManagedBy(Uuid),
    MemberOf(Uuid),
    CustomerOf(Uuid),
}

impl ProjectsRepo {
    pub fn insert(conn: &mut PgConnection, new_project: &NewProject) -> Result<Project, diesel::result::Error> {
        diesel::insert_into(crate::schema::projects::table)
            .values(new_project)
            .returning(Project::as_returning())
            .get_result(conn)
    }

    pub fn find_by_id(conn: &mut PgConnection, project_id: Uuid) -> Result<Option<Project>, diesel::result::Error> {
        use crate::schema::projects::dsl::*;
        projects.filter(id.eq(project_id)).select(Project::as_select()).first(conn).optional()
    }

    pub fn list(
        conn: &mut PgConnection,
        scope: ProjectScope,
        status_filter: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, diesel::result::Error> {
        use crate::schema::project_members::dsl as pm;
        use crate::schema::projects::dsl::*;

        let mut query = projects.select(Project::as_select()).into_boxed();
        query = match scope {
            ProjectScope::All => query,
            ProjectScope::ManagedBy(user) => query.filter(manager_id.eq(user)),
            ProjectScope::CustomerOf(user) => query.filter(customer_id.eq(user)),
            ProjectScope::MemberOf(user) => query.filter(
                id.eq_any(pm::project_members.filter(pm::user_id.eq(user)).select(pm::project_id)),
            ),
        };
        if let Some(s) = status_filter {
            query = query.filter(status.eq(s));
        }
        query.order(created_at.desc()).load(conn)
    }

    pub fn update(conn: &mut PgConnection, project_id: Uuid, changes: &ProjectChanges) -> Result<Project, diesel::result::Error> {
        use crate::schema::projects::dsl::*;
        diesel::update(projects.filter(id.eq(project_id)))
            .set(changes)
            .returning(Project::as_returning())
            .get_result(conn)
    }

    pub fn delete_by_id(conn: &mut PgConnection, project_id: Uuid) -> Result<usize, diesel::result::Error> {
        use crate::schema::projects::dsl::*;
        diesel::delete(projects.filter(id.eq(project_id))).execute(conn)
    }

    pub fn member_ids(conn: &mut PgConnection, target_project: Uuid) -> Result<Vec<Uuid>, diesel::result::Error> {
        use crate::schema::project_members::dsl::*;
        project_members
            .filter(project_id.eq(target_project))
            .select(user_id)
            .load(conn)
    }

    pub fn replace_members(conn: &mut PgConnection, target_project: Uuid, members: &[Uuid]) -> Result<(), diesel::result::Error> {
        use crate::schema::project_members::dsl::*;
        diesel::delete(project_members.filter(project_id.eq(target_project))).execute(conn)?;
        let rows: Vec<ProjectMember> = members
            .iter()
            .map(|member| ProjectMember {
                project_id: target_project,
                user_id: *member,
            })
            .collect();
        if !rows.is_empty() {
            diesel::insert_into(project_members)
                .values(&rows)
                .on_conflict_do_nothing()
                .execute(conn)?;
        }
        Ok(())
    }

    pub fn task_status_counts(conn: &mut PgConnection, target_project: Uuid) -> Result<Vec<(TaskStatus, i64)>, diesel::result::Error> {
        use crate::schema::tasks::dsl::*;
        tasks
            .filter(project_id.eq(target_project))
            .group_by(status)
            .select((status, diesel::dsl::count_star()))
            .load(conn)
    }

    pub fn overdue_task_count(conn: &mut PgConnection, target_project: Uuid, today: chrono::NaiveDate) -> Result<i64, diesel::result::Error> {
        use crate::schema::tasks::dsl::*;
        tasks
            .filter(project_id.eq(target_project))
            .filter(due_date.lt(today))
            .filter(status.ne(TaskStatus::Done))
            .count()
            .get_result(conn)
    }

    pub fn logged_minutes(conn: &mut PgConnection, target_project: Uuid) -> Result<i64, diesel::result::Error> {
        use crate::schema::tasks::dsl as t;
        use crate::schema::time_logs::dsl as tl;
        let total: Option<i64> = tl::time_logs
            .filter(tl::task_id.eq_any(t::tasks.filter(t::project_id.eq(target_project)).select(t::id)))
            .select(diesel::dsl::sum(tl::minutes))
            .first(conn)?;
        Ok(total.unwrap_or(0))
    }
}
