use campus_desk::db::models::{BlockedSlot, Meeting};
use campus_desk::scheduling::{Interval, is_available, is_available_excluding, is_free, overlaps};
use campus_desk::validation::meeting::validate_meeting_length;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 11, hour, minute, 0).unwrap()
}

fn span(from: u32, to: u32) -> Interval {
    Interval::new(at(from, 0), at(to, 0)).unwrap()
}

fn block(room_id: Uuid, from: u32, to: u32) -> BlockedSlot {
    BlockedSlot {
        id: Uuid::new_v4(),
        room_id,
        starts_at: at(from, 0),
        ends_at: at(to, 0),
        reason: Some("Maintenance".into()),
        created_by: Uuid::new_v4(),
        created_at: Utc::now(),
    }
}

fn meeting(room_id: Uuid, from: u32, to: u32) -> Meeting {
    Meeting {
        id: Uuid::new_v4(),
        room_id: Some(room_id),
        organizer_id: Uuid::new_v4(),
        title: "Standup".into(),
        agenda: None,
        starts_at: at(from, 0),
        ends_at: at(to, 0),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn empty_or_inverted_ranges_are_rejected() {
    assert!(Interval::new(at(10, 0), at(10, 0)).is_err());
    assert!(Interval::new(at(11, 0), at(10, 0)).is_err());
}

#[test]
fn back_to_back_bookings_do_not_clash() {
    assert!(!overlaps(&span(9, 10), &span(10, 11)));
    assert!(!overlaps(&span(10, 11), &span(9, 10)));
}

#[test]
fn partial_and_enclosing_overlaps_clash() {
    assert!(overlaps(&span(9, 11), &span(10, 12)));
    assert!(overlaps(&span(8, 18), &span(12, 13)));
    assert!(overlaps(&span(12, 13), &span(8, 18)));
}

#[test]
fn room_is_busy_when_a_block_or_meeting_overlaps() {
    let room = Uuid::new_v4();
    let blocks = vec![block(room, 8, 9)];
    let meetings = vec![meeting(room, 13, 14)];

    assert!(is_available(&span(9, 13), &blocks, &meetings));
    assert!(!is_available(&span(8, 10), &blocks, &meetings));
    assert!(!is_available(&span(12, 15), &blocks, &meetings));
}

#[test]
fn rescheduling_ignores_the_meeting_being_moved() {
    let room = Uuid::new_v4();
    let own = meeting(room, 10, 11);
    let other = meeting(room, 12, 13);
    let meetings = vec![own.clone(), other.clone()];
    let blocks = vec![block(room, 15, 16)];

    // Stretching the slot over its own old range is fine.
    assert!(is_available_excluding(&span(10, 12), &blocks, &meetings, Some(own.id)));
    assert!(!is_available_excluding(&span(10, 12), &blocks, &meetings, None));
    // Other bookings and blocks still count.
    assert!(!is_available_excluding(&span(11, 13), &blocks, &meetings, Some(own.id)));
    assert!(!is_available_excluding(&span(14, 16), &blocks, &meetings, Some(own.id)));
    assert!(!is_available_excluding(&span(10, 11), &blocks, &meetings, Some(other.id)));
}

#[test]
fn nothing_booked_means_free() {
    let busy: Vec<Interval> = vec![];
    assert!(is_free(&span(9, 17), &busy));
}

#[test]
fn over_long_meetings_are_rejected() {
    assert!(validate_meeting_length(&span(8, 18)).is_ok());
    let marathon = Interval::new(at(0, 0), at(23, 0)).unwrap();
    assert!(validate_meeting_length(&marathon).is_err());
}
