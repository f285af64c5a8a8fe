use campus_desk::db::enums::{Priority, TicketCategory};
use campus_desk::db::models::CreateTicketRequest;
use campus_desk::validation::{
    auth::{UpdateProfileChanges, validate_password, validate_register_request, validate_update_profile},
    chat::{validate_emoji, validate_message},
    project::validate_date_range,
    task::validate_assignees,
    ticket::validate_create_ticket,
};
use chrono::NaiveDate;
use uuid::Uuid;

#[test]
fn register_requires_name_email_and_strong_password() {
    assert!(validate_register_request("Dana", "dana@example.com", "Secure123").is_ok());
    assert!(validate_register_request("", "dana@example.com", "Secure123").is_err());
    assert!(validate_register_request("Dana", "not-an-email", "Secure123").is_err());
    assert!(validate_password("short1").is_err());
    assert!(validate_password("lettersonly").is_err());
}

#[test]
fn new_password_needs_the_current_one() {
    let changes = UpdateProfileChanges {
        name: None,
        department_present: false,
        current_password: None,
        new_password: Some("Another123"),
    };
    assert!(validate_update_profile(&changes).is_err());

    let changes = UpdateProfileChanges {
        current_password: Some("Secure123"),
        ..changes
    };
    assert!(validate_update_profile(&changes).is_ok());
}

#[test]
fn end_date_may_not_precede_start_date() {
    let start = NaiveDate::from_ymd_opt(2026, 3, 1);
    let end = NaiveDate::from_ymd_opt(2026, 2, 1);
    assert!(validate_date_range(start, end).is_err());
    assert!(validate_date_range(start, None).is_ok());
    assert!(validate_date_range(start, start).is_ok());
}

#[test]
fn assignees_must_be_project_members() {
    let member = Uuid::new_v4();
    assert!(validate_assignees(&[member], &[member]).is_ok());
    assert!(validate_assignees(&[Uuid::new_v4()], &[member]).is_err());
}

#[test]
fn tickets_need_text_fields_and_web_links() {
    let mut request = CreateTicketRequest {
        title: "Heating off".into(),
        description: "Block B radiators are cold".into(),
        campus: "East".into(),
        category: TicketCategory::Facilities,
        priority: Priority::Medium,
        attachments: vec!["https://files.example.com/photo.jpg".into()],
    };
    assert!(validate_create_ticket(&request).is_ok());

    request.attachments = vec!["javascript:alert(1)".into()];
    assert!(validate_create_ticket(&request).is_err());

    request.attachments.clear();
    request.campus = "  ".into();
    assert!(validate_create_ticket(&request).is_err());
}

#[test]
fn messages_need_text_or_attachments() {
    assert!(validate_message("hello", &[]).is_ok());
    assert!(validate_message("", &["https://files.example.com/a.pdf".into()]).is_ok());
    assert!(validate_message("   ", &[]).is_err());
    assert!(validate_emoji("👍").is_ok());
    assert!(validate_emoji("two words").is_err());
}
