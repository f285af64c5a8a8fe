use crate::db::enums::{Priority, TaskStatus};
use crate::db::models::api::double_option;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tasks)]
pub struct NewTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub created_by: Uuid,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = crate::schema::tasks)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub start_date: Option<Option<NaiveDate>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::task_assignees)]
pub struct TaskAssignee {
    pub task_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct TaskInfo {
    #[serde(flatten)]
    pub task: Task,
    pub assignee_ids: Vec<Uuid>,
}

#[derive(Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 512, message = "Task title must be between 1 and 512 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assignee_ids: Vec<Uuid>,
}

#[derive(Deserialize, Validate, Default)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 512, message = "Task title must be between 1 and 512 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
    pub assignee_ids: Option<Vec<Uuid>>,
}

impl UpdateTaskRequest {
    /// True when the request touches anything besides `status`.
    pub fn changes_more_than_status(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.priority.is_some()
            || self.start_date.is_some()
            || self.due_date.is_some()
            || self.assignee_ids.is_some()
    }
}

#[derive(Deserialize)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<Uuid>,
}
