use diesel::prelude::*;
use uuid::Uuid;

use crate::db::enums::TaskStatus;
use crate::db::models::task::{NewTask, Task, TaskAssignee, TaskChanges};
use crate::db::models::time_log::{NewTimeLog, TimeLog};

pub struct TasksRepo;

impl TasksRepo {
    pub fn insert(conn: &mut PgConnection, new_task: &NewTask) -> Result<Task, diesel::result::Error> {
        diesel::insert_into(crate::schema::tasks::table)
            .values(new_task)
            .returning(Task::as_returning())
            .get_result(conn)
    }

    pub fn find_by_id(conn: &mut PgConnection, task_id: Uuid) -> Result<Option<Task>, diesel::result::Error> {
        use crate::schema::tasks::dsl::*;
        tasks.filter(id.eq(task_id)).select(Task::as_select()).first(conn).optional()
    }

    pub fn list_by_project(
        conn: &mut PgConnection,
        target_project: Uuid,
        status_filter: Option<TaskStatus>,
        assignee_filter: Option<Uuid>,
    ) -> Result<Vec<Task>, diesel::result::Error> {
        use crate::schema::task_assignees::dsl as ta;
        use crate::schema::tasks::dsl::*;

        let mut query = tasks
            .filter(project_id.eq(target_project))
            .select(Task::as_select())
            .into_boxed();
        if let Some(s) = status_filter {
            query = query.filter(status.eq(s));
        }
        if let Some(assignee) = assignee_filter {
            query = query.filter(id.eq_any(ta::task_assignees.filter(ta::user_id.eq(assignee)).select(ta::task_id)));
        }
        query.order(created_at.asc()).load(conn)
    }

    pub fn update(conn: &mut PgConnection, task_id: Uuid, changes: &TaskChanges) -> Result<Task, diesel::result::Error> {
        use crate::schema::tasks::dsl::*;
        diesel::update(tasks.filter(id.eq(task_id)))
            .set(changes)
            .returning(Task::as_returning())
            .get_result(conn)
    }

    pub fn delete_by_id(conn: &mut PgConnection, task_id: Uuid) -> Result<usize, diesel::result::Error> {
        use crate::schema::tasks::dsl::*;
        diesel::delete(tasks.filter(id.eq(task_id))).execute(conn)
    }

    pub fn assignee_ids(conn: &mut PgConnection, target_task: Uuid) -> Result<Vec<Uuid>, diesel::result::Error> {
        use crate::schema::task_assignees::dsl::*;
        task_assignees.filter(task_id.eq(target_task)).select(user_id).load(conn)
    }

    pub fn replace_assignees(conn: &mut PgConnection, target_task: Uuid, assignees: &[Uuid]) -> Result<(), diesel::result::Error> {
        use crate::schema::task_assignees::dsl::*;
        diesel::delete(task_assignees.filter(task_id.eq(target_task))).execute(conn)?;
        let rows: Vec<TaskAssignee> = assignees
            .iter()
            .map(|assignee| TaskAssignee {
                task_id: target_task,
                user_id: *assignee,
            })
            .collect();
        if !rows.is_empty() {
            diesel::insert_into(task_assignees)
                .values(&rows)
                .on_conflict_do_nothing()
                .execute(conn)?;
        }
        Ok(())
    }

    pub fn insert_time_log(conn: &mut PgConnection, entry: &NewTimeLog) -> Result<TimeLog, diesel::result::Error> {
        diesel::insert_into(crate::schema::time_logs::table)
            .values(entry)
            .returning(TimeLog::as_returning())
            .get_result(conn)
    }

    pub fn time_logs(conn: &mut PgConnection, target_task: Uuid) -> Result<Vec<TimeLog>, diesel::result::Error> {
        use crate::schema::time_logs::dsl::*;
        time_logs
            .filter(task_id.eq(target_task))
            .select(TimeLog::as_select())
            .order(logged_on.desc())
            .load(conn)
    }
}
