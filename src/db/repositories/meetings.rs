use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::models::meeting::{
    BlockedSlot, Meeting, MeetingChanges, MeetingParticipant, MeetingRoom, MeetingRoomChanges,
    NewBlockedSlot, NewMeeting, NewMeetingRoom,
};

pub struct MeetingsRepo;

impl MeetingsRepo {
    pub fn insert_room(conn: &mut PgConnection, room: &NewMeetingRoom) -> Result<MeetingRoom, diesel::result::Error> {
        diesel::insert_into(crate::schema::meeting_rooms::table)
            .values(room)
            .returning(MeetingRoom::as_returning())
            .get_result(conn)
    }

    pub fn find_room(conn: &mut PgConnection, room_id: Uuid) -> Result<Option<MeetingRoom>, diesel::result::Error> {
        use crate::schema::meeting_rooms::dsl::*;
        meeting_rooms.filter(id.eq(room_id)).select(MeetingRoom::as_select()).first(conn).optional()
    }

    /// Takes a row lock on the room for the rest of the transaction so that
    /// competing bookings for the same room run one after another.
    pub fn lock_room(conn: &mut PgConnection, room_id: Uuid) -> Result<Option<MeetingRoom>, diesel::result::Error> {
        use crate::schema::meeting_rooms::dsl::*;
        meeting_rooms
            .filter(id.eq(room_id))
            .select(MeetingRoom::as_select())
            .for_update()
            .first(conn)
            .optional()
    }

    pub fn list_rooms(conn: &mut PgConnection, campus_filter: Option<&str>, active_only: bool) -> Result<Vec<MeetingRoom>, diesel::result::Error> {
        use crate::schema::meeting_rooms::dsl::*;
        let mut query = meeting_rooms.select(MeetingRoom::as_select()).into_boxed();
        if let Some(c) = campus_filter {
            query = query.filter(campus.eq(c.to_string()));
        }
        if active_only {
            query = query.filter(is_active.eq(true));
        }
        query.order(name.asc()).load(conn)
    }

    pub fn update_room(conn: &mut PgConnection, room_id: Uuid, changes: &MeetingRoomChanges) -> Result<MeetingRoom, diesel::result::Error> {
        use crate::schema::meeting_rooms::dsl::*;
        diesel::update(meeting_rooms.filter(id.eq(room_id)))
            .set(changes)
            .returning(MeetingRoom::as_returning())
            .get_result(conn)
    }

    pub fn delete_room(conn: &mut PgConnection, room_id: Uuid) -> Result<usize, diesel::result::Error> {
        use crate::schema::meeting_rooms::dsl::*;
        diesel::delete(meeting_rooms.filter(id.eq(room_id))).execute(conn)
    }

    pub fn insert_block(conn: &mut PgConnection, block: &NewBlockedSlot) -> Result<BlockedSlot, diesel::result::Error> {
        diesel::insert_into(crate::schema::room_blocked_slots::table)
            .values(block)
            .returning(BlockedSlot::as_returning())
            .get_result(conn)
    }

    /// Blocked slots of a room that intersect `[from, to)`.
    pub fn blocks_in_window(
        conn: &mut PgConnection,
        target_room: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BlockedSlot>, diesel::result::Error> {
        use crate::schema::room_blocked_slots::dsl::*;
        room_blocked_slots
            .filter(room_id.eq(target_room))
            .filter(starts_at.lt(to))
            .filter(ends_at.gt(from))
            .select(BlockedSlot::as_select())
            .order(starts_at.asc())
            .load(conn)
    }

    /// Meetings booked in a room that intersect `[from, to)`.
    pub fn room_meetings_in_window(
        conn: &mut PgConnection,
        target_room: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Meeting>, diesel::result::Error> {
        use crate::schema::meetings::dsl::*;
        meetings
            .filter(room_id.eq(target_room))
            .filter(starts_at.lt(to))
            .filter(ends_at.gt(from))
            .select(Meeting::as_select())
            .order(starts_at.asc())
            .load(conn)
    }

    pub fn insert_meeting(conn: &mut PgConnection, meeting: &NewMeeting) -> Result<Meeting, diesel::result::Error> {
        diesel::insert_into(crate::schema::meetings::table)
            .values(meeting)
            .returning(Meeting::as_returning())
            .get_result(conn)
    }

    pub fn find_meeting(conn: &mut PgConnection, meeting_id: Uuid) -> Result<Option<Meeting>, diesel::result::Error> {
        use crate::schema::meetings::dsl::*;
        meetings.filter(id.eq(meeting_id)).select(Meeting::as_select()).first(conn).optional()
    }

    pub fn update_meeting(conn: &mut PgConnection, meeting_id: Uuid, changes: &MeetingChanges) -> Result<Meeting, diesel::result::Error> {
        use crate::schema::meetings::dsl::*;
        diesel::update(meetings.filter(id.eq(meeting_id)))
            .set(changes)
            .returning(Meeting::as_returning())
            .get_result(conn)
    }

    pub fn delete_meeting(conn: &mut PgConnection, meeting_id: Uuid) -> Result<usize, diesel::result::Error> {
        use crate::schema::meetings::dsl::*;
        diesel::delete(meetings.filter(id.eq(meeting_id))).execute(conn)
    }

    /// Meetings the user organizes or attends, optionally bounded to a window.
    pub fn meetings_for_user(
        conn: &mut PgConnection,
        user: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Meeting>, diesel::result::Error> {
        use crate::schema::meeting_participants::dsl as mp;
        use crate::schema::meetings::dsl::*;

        let attending = mp::meeting_participants
            .filter(mp::user_id.eq(user))
            .select(mp::meeting_id);
        let mut query = meetings
            .filter(organizer_id.eq(user).or(id.eq_any(attending)))
            .select(Meeting::as_select())
            .into_boxed();
        if let Some(from) = from {
            query = query.filter(ends_at.gt(from));
        }
        if let Some(to) = to {
            query = query.filter(starts_at.lt(to));
        }
        query.order(starts_at.asc()).load(conn)
    }

    pub fn participant_ids(conn: &mut PgConnection, target_meeting: Uuid) -> Result<Vec<Uuid>, diesel::result::Error> {
        use crate::schema::meeting_participants::dsl::*;
        meeting_participants
            .filter(meeting_id.eq(target_meeting))
            .select(user_id)
            .load(conn)
    }

    pub fn replace_participants(conn: &mut PgConnection, target_meeting: Uuid, users: &[Uuid]) -> Result<(), diesel::result::Error> {
        use crate::schema::meeting_participants::dsl::*;
        diesel::delete(meeting_participants.filter(meeting_id.eq(target_meeting))).execute(conn)?;
        let rows: Vec<MeetingParticipant> = users
            .iter()
            .map(|user| MeetingParticipant {
                meeting_id: target_meeting,
                user_id: *user,
            })
            .collect();
        if !rows.is_empty() {
            diesel::insert_into(meeting_participants)
                .values(&rows)
                .on_conflict_do_nothing()
                .execute(conn)?;
        }
        Ok(())
    }
}
