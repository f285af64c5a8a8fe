use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    db::models::{
        AvailabilityQuery, BlockedSlot, CreateBlockRequest, CreateMeetingRequest, CreateRoomRequest,
        Meeting, MeetingChanges, MeetingInfo, MeetingRoom, MeetingRoomChanges, NewBlockedSlot, NewMeeting,
        NewMeetingRoom, RoomSchedule, UpdateMeetingRequest, UpdateRoomRequest, WindowQuery,
        error_codes,
    },
    db::repositories::{MeetingsRepo, UsersRepo},
    error::{AppError, AppResult},
    rbac::{OwnershipRule, check_ownership},
    scheduling::{Interval, is_available, is_available_excluding, is_free},
    services::{NotificationsService, context::RequestContext, notifications_service::kinds},
    validation::meeting::{validate_meeting_length, validate_meeting_title, validate_room},
    websocket::WebSocketManager,
};

pub struct MeetingsService;

impl MeetingsService {
    pub fn list_rooms(conn: &mut PgConnection, campus: Option<&str>) -> AppResult<Vec<MeetingRoom>> {
        Ok(MeetingsRepo::list_rooms(conn, campus, false)?)
    }

    pub fn create_room(conn: &mut PgConnection, req: &CreateRoomRequest) -> AppResult<MeetingRoom> {
        validate_room(&req.name, &req.campus, req.capacity)?;
        let room = MeetingsRepo::insert_room(
            conn,
            &NewMeetingRoom {
                name: req.name.trim().to_string(),
                campus: req.campus.trim().to_string(),
                capacity: req.capacity,
            },
        )?;
        tracing::info!(room_id = %room.id, campus = %room.campus, "Meeting room created");
        Ok(room)
    }

    pub fn update_room(
        conn: &mut PgConnection,
        room_id: Uuid,
        req: &UpdateRoomRequest,
    ) -> AppResult<MeetingRoom> {
        let room = MeetingsRepo::find_room(conn, room_id)?.ok_or_else(|| AppError::not_found("room"))?;
        validate_room(
            req.name.as_deref().unwrap_or(&room.name),
            req.campus.as_deref().unwrap_or(&room.campus),
            req.capacity.unwrap_or(room.capacity),
        )?;
        let changes = MeetingRoomChanges {
            name: req.name.as_ref().map(|n| n.trim().to_string()),
            campus: req.campus.as_ref().map(|c| c.trim().to_string()),
            capacity: req.capacity,
            is_active: req.is_active,
        };
        Ok(MeetingsRepo::update_room(conn, room_id, &changes)?)
    }

    pub fn delete_room(conn: &mut PgConnection, room_id: Uuid) -> AppResult<()> {
        if MeetingsRepo::delete_room(conn, room_id)? == 0 {
            return Err(AppError::not_found("room"));
        }
        Ok(())
    }

    /// Active rooms with nothing booked or blocked in the requested range.
    pub fn available_rooms(conn: &mut PgConnection, query: &AvailabilityQuery) -> AppResult<Vec<MeetingRoom>> {
        let requested = Interval::new(query.starts_at, query.ends_at)?;
        let rooms = MeetingsRepo::list_rooms(conn, query.campus.as_deref(), true)?;
        let mut free = Vec::with_capacity(rooms.len());
        for room in rooms {
            let (blocked, meetings) = Self::busy_in(conn, room.id, &requested)?;
            if is_available(&requested, &blocked, &meetings) {
                free.push(room);
            }
        }
        Ok(free)
    }

    pub fn block_slot(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        room_id: Uuid,
        req: &CreateBlockRequest,
    ) -> AppResult<BlockedSlot> {
        let requested = Interval::new(req.starts_at, req.ends_at)?;
        conn.transaction::<_, AppError, _>(|conn| {
            MeetingsRepo::lock_room(conn, room_id)?.ok_or_else(|| AppError::not_found("room"))?;
            let meetings = MeetingsRepo::room_meetings_in_window(conn, room_id, requested.start, requested.end)?;
            if !is_free(&requested, &meetings) {
                return Err(AppError::conflict_with_code(
                    "The room has meetings booked in this range",
                    Some("starts_at".to_string()),
                    error_codes::ROOM_UNAVAILABLE,
                ));
            }
            Ok(MeetingsRepo::insert_block(
                conn,
                &NewBlockedSlot {
                    room_id,
                    starts_at: requested.start,
                    ends_at: requested.end,
                    reason: req.reason.clone(),
                    created_by: ctx.user_id,
                },
            )?)
        })
    }

    pub fn schedule(conn: &mut PgConnection, room_id: Uuid, query: &WindowQuery) -> AppResult<RoomSchedule> {
        let room = MeetingsRepo::find_room(conn, room_id)?.ok_or_else(|| AppError::not_found("room"))?;
        let from = query.from.unwrap_or_else(Utc::now);
        let to = query.to.unwrap_or(from + chrono::Duration::days(7));
        let window = Interval::new(from, to)?;
        let (blocked_slots, meetings) = Self::busy_in(conn, room_id, &window)?;
        Ok(RoomSchedule {
            room,
            blocked_slots,
            meetings,
        })
    }

    pub fn create(
        conn: &mut PgConnection,
        ws: &WebSocketManager,
        ctx: &RequestContext,
        req: &CreateMeetingRequest,
    ) -> AppResult<MeetingInfo> {
        validate_meeting_title(&req.title)?;
        let requested = Interval::new(req.starts_at, req.ends_at)?;
        validate_meeting_length(&requested)?;
        let participants = Self::participants(conn, ctx.user_id, &req.participant_ids)?;

        let info = conn.transaction::<_, AppError, _>(|conn| {
            if let Some(room_id) = req.room_id {
                Self::reserve(conn, room_id, &requested, None)?;
            }
            let meeting = MeetingsRepo::insert_meeting(
                conn,
                &NewMeeting {
                    room_id: req.room_id,
                    organizer_id: ctx.user_id,
                    title: req.title.trim().to_string(),
                    agenda: req.agenda.clone(),
                    starts_at: requested.start,
                    ends_at: requested.end,
                },
            )?;
            MeetingsRepo::replace_participants(conn, meeting.id, &participants)?;
            Ok(MeetingInfo {
                meeting,
                participant_ids: participants.clone(),
            })
        })?;

        Self::notify(conn, ws, ctx, &info, &participants, kinds::MEETING_INVITE);
        tracing::info!(meeting_id = %info.meeting.id, room_id = ?info.meeting.room_id, "Meeting booked");
        Ok(info)
    }

    pub fn list(conn: &mut PgConnection, ctx: &RequestContext, query: &WindowQuery) -> AppResult<Vec<MeetingInfo>> {
        let meetings = MeetingsRepo::meetings_for_user(conn, ctx.user_id, query.from, query.to)?;
        meetings
            .into_iter()
            .map(|meeting| {
                let participant_ids = MeetingsRepo::participant_ids(conn, meeting.id)?;
                Ok(MeetingInfo {
                    meeting,
                    participant_ids,
                })
            })
            .collect()
    }

    pub fn update(
        conn: &mut PgConnection,
        ws: &WebSocketManager,
        ctx: &RequestContext,
        meeting_id: Uuid,
        req: &UpdateMeetingRequest,
    ) -> AppResult<MeetingInfo> {
        let current = Self::load(conn, meeting_id)?;
        check_ownership(ctx, &current, OwnershipRule::OwnerOnly)?;
        if let Some(title) = &req.title {
            validate_meeting_title(title)?;
        }

        let requested = Interval::new(
            req.starts_at.unwrap_or(current.meeting.starts_at),
            req.ends_at.unwrap_or(current.meeting.ends_at),
        )?;
        validate_meeting_length(&requested)?;
        let room_id = req.room_id.unwrap_or(current.meeting.room_id);
        let participants = match &req.participant_ids {
            Some(ids) => Some(Self::participants(conn, current.meeting.organizer_id, ids)?),
            None => None,
        };

        let changes = MeetingChanges {
            room_id: req.room_id,
            title: req.title.as_ref().map(|t| t.trim().to_string()),
            agenda: req.agenda.clone(),
            starts_at: req.starts_at,
            ends_at: req.ends_at,
            updated_at: Some(Utc::now()),
        };
        let moved = room_id != current.meeting.room_id
            || requested.start != current.meeting.starts_at
            || requested.end != current.meeting.ends_at;

        let info = conn.transaction::<_, AppError, _>(|conn| {
            if let (Some(room_id), true) = (room_id, moved) {
                Self::reserve(conn, room_id, &requested, Some(meeting_id))?;
            }
            let meeting = MeetingsRepo::update_meeting(conn, meeting_id, &changes)?;
            let participant_ids = match &participants {
                Some(ids) => {
                    MeetingsRepo::replace_participants(conn, meeting_id, ids)?;
                    ids.clone()
                }
                None => current.participant_ids.clone(),
            };
            Ok(MeetingInfo {
                meeting,
                participant_ids,
            })
        })?;

        if moved {
            Self::notify(conn, ws, ctx, &info, &info.participant_ids, kinds::MEETING_CHANGED);
        } else if participants.is_some() {
            let added: Vec<Uuid> = info
                .participant_ids
                .iter()
                .filter(|id| !current.participant_ids.contains(id))
                .copied()
                .collect();
            Self::notify(conn, ws, ctx, &info, &added, kinds::MEETING_INVITE);
        }
        Ok(info)
    }

    pub fn delete(conn: &mut PgConnection, ctx: &RequestContext, meeting_id: Uuid) -> AppResult<()> {
        let current = Self::load(conn, meeting_id)?;
        check_ownership(ctx, &current, OwnershipRule::OwnerOnly)?;
        MeetingsRepo::delete_meeting(conn, meeting_id)?;
        Ok(())
    }

    /// Locks the room row and checks the requested range against it. Must
    /// run inside the transaction that writes the booking.
    fn reserve(
        conn: &mut PgConnection,
        room_id: Uuid,
        requested: &Interval,
        excluding: Option<Uuid>,
    ) -> AppResult<()> {
        let room = MeetingsRepo::lock_room(conn, room_id)?.ok_or_else(|| AppError::not_found("room"))?;
        if !room.is_active {
            return Err(AppError::conflict_with_code(
                format!("Room {} is not accepting bookings", room.name),
                Some("room_id".to_string()),
                error_codes::ROOM_INACTIVE,
            ));
        }
        let (blocked, meetings) = Self::busy_in(conn, room_id, requested)?;
        if !is_available_excluding(requested, &blocked, &meetings, excluding) {
            tracing::debug!(room_id = %room_id, start = %requested.start, end = %requested.end, "Room unavailable");
            return Err(AppError::conflict_with_code(
                format!("Room {} is not available for the requested time", room.name),
                Some("room_id".to_string()),
                error_codes::ROOM_UNAVAILABLE,
            ));
        }
        Ok(())
    }

    fn busy_in(
        conn: &mut PgConnection,
        room_id: Uuid,
        window: &Interval,
    ) -> AppResult<(Vec<BlockedSlot>, Vec<Meeting>)> {
        let blocked = MeetingsRepo::blocks_in_window(conn, room_id, window.start, window.end)?;
        let meetings = MeetingsRepo::room_meetings_in_window(conn, room_id, window.start, window.end)?;
        Ok((blocked, meetings))
    }

    fn load(conn: &mut PgConnection, meeting_id: Uuid) -> AppResult<MeetingInfo> {
        let meeting = MeetingsRepo::find_meeting(conn, meeting_id)?
            .ok_or_else(|| AppError::not_found("meeting"))?;
        let participant_ids = MeetingsRepo::participant_ids(conn, meeting_id)?;
        Ok(MeetingInfo {
            meeting,
            participant_ids,
        })
    }

    /// Distinct, active attendees; the organizer is implied and left out.
    fn participants(conn: &mut PgConnection, organizer: Uuid, requested: &[Uuid]) -> AppResult<Vec<Uuid>> {
        let mut wanted: Vec<Uuid> = requested.iter().copied().filter(|id| *id != organizer).collect();
        wanted.sort();
        wanted.dedup();
        let found = UsersRepo::existing_active_ids(conn, &wanted)?;
        if let Some(missing) = wanted.iter().find(|id| !found.contains(id)) {
            return Err(AppError::validation(format!("User {} does not exist or is inactive", missing)));
        }
        Ok(wanted)
    }

    fn notify(
        conn: &mut PgConnection,
        ws: &WebSocketManager,
        ctx: &RequestContext,
        info: &MeetingInfo,
        recipients: &[Uuid],
        kind: &str,
    ) {
        let title = if kind == kinds::MEETING_INVITE {
            format!("{} invited you to \"{}\"", ctx.name, info.meeting.title)
        } else {
            format!("\"{}\" was rescheduled", info.meeting.title)
        };
        let rows = recipients
            .iter()
            .filter(|id| **id != ctx.user_id)
            .map(|id| {
                NotificationsService::build(
                    *id,
                    kind,
                    title.clone(),
                    Some(format!(
                        "{} - {}",
                        info.meeting.starts_at.format("%Y-%m-%d %H:%M"),
                        info.meeting.ends_at.format("%H:%M UTC")
                    )),
                    Some(format!("/meetings/{}", info.meeting.id)),
                )
            })
            .collect();
        NotificationsService::notify(conn, ws, rows);
    }
}
