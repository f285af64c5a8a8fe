use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::chats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Chat {
    pub id: Uuid,
    pub name: Option<String>,
    pub is_group: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::chats)]
pub struct NewChat {
    pub name: Option<String>,
    pub is_group: bool,
    pub created_by: Uuid,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::chat_participants)]
pub struct NewChatParticipant {
    pub chat_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub attachments: Vec<String>,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// Deleted messages keep their row and position but lose their content.
    pub fn redacted(mut self) -> Self {
        if self.is_deleted {
            self.body.clear();
            self.attachments.clear();
        }
        self
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::messages)]
pub struct NewMessage {
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub attachments: Vec<String>,
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::message_reactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Reaction {
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ReactionSummary {
    pub emoji: String,
    pub user_ids: Vec<Uuid>,
}

#[derive(Serialize)]
pub struct ChatInfo {
    #[serde(flatten)]
    pub chat: Chat,
    pub participant_ids: Vec<Uuid>,
}

#[derive(Serialize, Clone)]
pub struct MessageInfo {
    #[serde(flatten)]
    pub message: Message,
    pub reactions: Vec<ReactionSummary>,
}

#[derive(Deserialize, Validate)]
pub struct CreateChatRequest {
    #[validate(length(min = 1, max = 255, message = "Chat name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "At least one participant is required"))]
    pub participant_ids: Vec<Uuid>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Deserialize)]
pub struct EditMessageRequest {
    pub body: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ReactionRequest {
    pub emoji: String,
}

#[derive(Deserialize, Default)]
pub struct MessageListQuery {
    pub before: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}
