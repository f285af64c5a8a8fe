use super::{require_links, require_text};
use crate::db::models::CreateTicketRequest;
use crate::error::AppError;

pub const MAX_ATTACHMENTS: usize = 5;

pub fn validate_create_ticket(req: &CreateTicketRequest) -> Result<(), AppError> {
    require_text(&req.title, "Title")?;
    require_text(&req.description, "Description")?;
    require_text(&req.campus, "Campus")?;
    if req.attachments.len() > MAX_ATTACHMENTS {
        return Err(AppError::validation(format!(
            "At most {} attachments are allowed",
            MAX_ATTACHMENTS
        )));
    }
    require_links(&req.attachments)
}

pub fn validate_comment(body: &str) -> Result<(), AppError> {
    require_text(body, "Comment")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::{Priority, TicketCategory};

    fn request() -> CreateTicketRequest {
        CreateTicketRequest {
            title: "Printer jam".into(),
            description: "Second floor printer jams on every job".into(),
            campus: "South".into(),
            category: TicketCategory::Hardware,
            priority: Priority::Low,
            attachments: vec![],
        }
    }

    #[test]
    fn test_ticket_validation() {
        assert!(validate_create_ticket(&request()).is_ok());

        let mut blank = request();
        blank.campus = "   ".into();
        assert!(validate_create_ticket(&blank).is_err());

        let mut too_many = request();
        too_many.attachments = (0..6).map(|i| format!("https://x/{}", i)).collect();
        assert!(validate_create_ticket(&too_many).is_err());
    }
}
