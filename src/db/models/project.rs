use crate::db::enums::{ProjectStatus, TaskStatus};
use crate::db::models::api::double_option;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::projects)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = crate::schema::projects)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub manager_id: Option<Uuid>,
    pub customer_id: Option<Option<Uuid>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub status: Option<ProjectStatus>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::project_members)]
pub struct ProjectMember {
    pub project_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct ProjectInfo {
    #[serde(flatten)]
    pub project: Project,
    pub member_ids: Vec<Uuid>,
}

#[derive(Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Project name must be between 1 and 255 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}

#[derive(Deserialize, Validate, Default)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Project name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub manager_id: Option<Uuid>,
    #[serde(default, deserialize_with = "double_option")]
    pub customer_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,
    pub status: Option<ProjectStatus>,
}

#[derive(Deserialize)]
pub struct SetMembersRequest {
    pub member_ids: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct ProjectListQuery {
    pub status: Option<ProjectStatus>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct StatusCount {
    pub status: TaskStatus,
    pub count: i64,
}

#[derive(Serialize)]
pub struct ProjectSummary {
    pub project_id: Uuid,
    pub total_tasks: i64,
    pub tasks_by_status: Vec<StatusCount>,
    pub overdue_tasks: i64,
    pub logged_minutes: i64,
    pub completion_percent: u8,
}
