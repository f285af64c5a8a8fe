use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::time_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TimeLog {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub minutes: i32,
    pub note: Option<String>,
    pub logged_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::time_logs)]
pub struct NewTimeLog {
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub minutes: i32,
    pub note: Option<String>,
    pub logged_on: NaiveDate,
}

#[derive(Deserialize, Validate)]
pub struct CreateTimeLogRequest {
    #[validate(range(min = 1, max = 1440, message = "Minutes must be between 1 and 1440"))]
    pub minutes: i32,
    #[validate(length(max = 2000, message = "Note is too long"))]
    pub note: Option<String>,
    pub logged_on: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct TimeLogList {
    pub entries: Vec<TimeLog>,
    pub total_minutes: i64,
}
