use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::meeting_rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MeetingRoom {
    pub id: Uuid,
    pub name: String,
    pub campus: String,
    pub capacity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::meeting_rooms)]
pub struct NewMeetingRoom {
    pub name: String,
    pub campus: String,
    pub capacity: i32,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = crate::schema::meeting_rooms)]
pub struct MeetingRoomChanges {
    pub name: Option<String>,
    pub campus: Option<String>,
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::room_blocked_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BlockedSlot {
    pub id: Uuid,
    pub room_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::room_blocked_slots)]
pub struct NewBlockedSlot {
    pub room_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub created_by: Uuid,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::meetings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Meeting {
    pub id: Uuid,
    pub room_id: Option<Uuid>,
    pub organizer_id: Uuid,
    pub title: String,
    pub agenda: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::meetings)]
pub struct NewMeeting {
    pub room_id: Option<Uuid>,
    pub organizer_id: Uuid,
    pub title: String,
    pub agenda: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = crate::schema::meetings)]
pub struct MeetingChanges {
    pub room_id: Option<Option<Uuid>>,
    pub title: Option<String>,
    pub agenda: Option<Option<String>>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::meeting_participants)]
pub struct MeetingParticipant {
    pub meeting_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct MeetingInfo {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub participant_ids: Vec<Uuid>,
}

#[derive(Serialize)]
pub struct RoomSchedule {
    pub room: MeetingRoom,
    pub blocked_slots: Vec<BlockedSlot>,
    pub meetings: Vec<Meeting>,
}

#[derive(Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 255, message = "Room name must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Campus is required"))]
    pub campus: String,
    #[validate(range(min = 1, max = 1000, message = "Capacity must be between 1 and 1000"))]
    pub capacity: i32,
}

#[derive(Deserialize, Validate, Default)]
pub struct UpdateRoomRequest {
    #[validate(length(min = 1, max = 255, message = "Room name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Campus is required"))]
    pub campus: Option<String>,
    #[validate(range(min = 1, max = 1000, message = "Capacity must be between 1 and 1000"))]
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateBlockRequest {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct RoomListQuery {
    pub campus: Option<String>,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub campus: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct WindowQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Validate)]
pub struct CreateMeetingRequest {
    #[validate(length(min = 1, max = 255, message = "Meeting title must be between 1 and 255 characters"))]
    pub title: String,
    pub agenda: Option<String>,
    pub room_id: Option<Uuid>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub participant_ids: Vec<Uuid>,
}

#[derive(Deserialize, Validate, Default)]
pub struct UpdateMeetingRequest {
    #[validate(length(min = 1, max = 255, message = "Meeting title must be between 1 and 255 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::db::models::api::double_option")]
    pub agenda: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::db::models::api::double_option")]
    pub room_id: Option<Option<Uuid>>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub participant_ids: Option<Vec<Uuid>>,
}
