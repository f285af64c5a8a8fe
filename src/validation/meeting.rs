use super::require_text;
use crate::error::AppError;

pub fn validate_room(name: &str, campus: &str, capacity: i32) -> Result<(), AppError> {
    require_text(name, "Room name")?;
    require_text(campus, "Campus")?;
    if capacity < 1 {
        return Err(AppError::validation("Capacity must be at least 1"));
    }
    Ok(())
}

pub fn validate_meeting_title(title: &str) -> Result<(), AppError> {
    require_text(title, "Meeting title")
}

/// Upper bound on a single booking.
pub const MAX_MEETING_HOURS: i64 = 12;

pub fn validate_meeting_length(interval: &crate::scheduling::Interval) -> Result<(), AppError> {
    if interval.end - interval.start > chrono::Duration::hours(MAX_MEETING_HOURS) {
        return Err(AppError::validation(format!(
            "Meetings cannot be longer than {} hours",
            MAX_MEETING_HOURS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::Interval;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_room_validation() {
        assert!(validate_room("Aula", "North", 30).is_ok());
        assert!(validate_room("Aula", "North", 0).is_err());
        assert!(validate_room("", "North", 3).is_err());
    }

    #[test]
    fn test_meeting_title() {
        assert!(validate_meeting_title("Sprint review").is_ok());
        assert!(validate_meeting_title("   ").is_err());
    }

    #[test]
    fn test_meeting_length() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();
        let ok = Interval::new(start, start + chrono::Duration::hours(2)).unwrap();
        let long = Interval::new(start, start + chrono::Duration::hours(13)).unwrap();
        assert!(validate_meeting_length(&ok).is_ok());
        assert!(validate_meeting_length(&long).is_err());
    }
}
