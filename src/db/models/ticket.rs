use crate::db::enums::{Priority, TicketCategory, TicketStatus};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Ticket {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub reporter_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub campus: String,
    pub category: TicketCategory,
    pub priority: Priority,
    pub status: TicketStatus,
    pub sla_deadline: DateTime<Utc>,
    pub attachments: Vec<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tickets)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub reporter_id: Uuid,
    pub campus: String,
    pub category: TicketCategory,
    pub priority: Priority,
    pub status: TicketStatus,
    pub sla_deadline: DateTime<Utc>,
    pub attachments: Vec<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = crate::schema::tickets)]
pub struct TicketChanges {
    pub assignee_id: Option<Option<Uuid>>,
    pub category: Option<TicketCategory>,
    pub priority: Option<Priority>,
    pub status: Option<TicketStatus>,
    pub sla_deadline: Option<DateTime<Utc>>,
    pub resolved_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::ticket_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TicketComment {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ticket_comments)]
pub struct NewTicketComment {
    pub ticket_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::ticket_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TicketLog {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ticket_logs)]
pub struct NewTicketLog {
    pub ticket_id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub detail: Option<String>,
}

#[derive(Serialize)]
pub struct TicketInfo {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub sla_breached: bool,
}

#[derive(Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub info: TicketInfo,
    pub comments: Vec<TicketComment>,
    pub logs: Vec<TicketLog>,
}

#[derive(Deserialize, Validate, Clone, Debug, PartialEq)]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 10000, message = "Description must be between 1 and 10000 characters"))]
    pub description: String,
    #[validate(length(min = 1, max = 100, message = "Campus is required"))]
    pub campus: String,
    pub category: TicketCategory,
    pub priority: Priority,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdateTicketRequest {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub category: Option<TicketCategory>,
}

#[derive(Deserialize)]
pub struct AssignTicketRequest {
    pub assignee_id: Uuid,
}

#[derive(Deserialize, Validate)]
pub struct CreateTicketCommentRequest {
    #[validate(length(min = 1, max = 10000, message = "Comment must be between 1 and 10000 characters"))]
    pub body: String,
}

#[derive(Deserialize, Default)]
pub struct TicketListQuery {
    pub status: Option<TicketStatus>,
    pub campus: Option<String>,
    pub priority: Option<Priority>,
}
