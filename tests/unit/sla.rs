use campus_desk::db::enums::{Priority, TicketCategory, TicketStatus};
use campus_desk::db::models::Ticket;
use campus_desk::services::tickets_service::{is_sla_breached, sla_deadline_for, sla_hours};
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

fn ticket_at(priority: Priority, status: TicketStatus) -> Ticket {
    let created = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
    Ticket {
        id: Uuid::new_v4(),
        title: "VPN down".into(),
        description: "Cannot reach the intranet".into(),
        reporter_id: Uuid::new_v4(),
        assignee_id: None,
        campus: "South".into(),
        category: TicketCategory::Network,
        priority,
        status,
        sla_deadline: sla_deadline_for(priority, created),
        attachments: vec![],
        resolved_at: None,
        created_at: created,
        updated_at: created,
    }
}

#[test]
fn urgency_shortens_the_deadline() {
    let hours: Vec<i64> = [Priority::Urgent, Priority::High, Priority::Medium, Priority::Low]
        .into_iter()
        .map(sla_hours)
        .collect();
    assert_eq!(hours, vec![4, 8, 24, 72]);
}

#[test]
fn open_ticket_breaches_after_deadline() {
    let ticket = ticket_at(Priority::Urgent, TicketStatus::Open);
    assert!(!is_sla_breached(&ticket, ticket.created_at + Duration::hours(3)));
    assert!(is_sla_breached(&ticket, ticket.created_at + Duration::hours(5)));
}

#[test]
fn resolved_ticket_is_judged_by_resolution_time() {
    let mut ticket = ticket_at(Priority::High, TicketStatus::Resolved);
    ticket.resolved_at = Some(ticket.created_at + Duration::hours(2));
    let much_later = ticket.created_at + Duration::days(30);
    assert!(!is_sla_breached(&ticket, much_later));

    ticket.resolved_at = Some(ticket.created_at + Duration::hours(9));
    assert!(is_sla_breached(&ticket, much_later));
}
