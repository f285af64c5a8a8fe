use chrono::NaiveDate;

use super::require_text;
use crate::error::AppError;

pub fn validate_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(AppError::validation("End date cannot be before start date"));
        }
    }
    Ok(())
}

pub fn validate_create_project(
    name: &str,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<(), AppError> {
    require_text(name, "Project name")?;
    validate_date_range(start_date, end_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, day).unwrap()
    }

    #[test]
    fn test_create_validation() {
        assert!(validate_create_project("Library refit", Some(d(1)), Some(d(30))).is_ok());
        assert!(validate_create_project("Library refit", Some(d(1)), Some(d(1))).is_ok());
        assert!(validate_create_project("  ", None, None).is_err());
        assert!(validate_create_project("Library refit", Some(d(30)), Some(d(1))).is_err());
    }

    #[test]
    fn open_ended_ranges_pass() {
        assert!(validate_date_range(Some(d(3)), None).is_ok());
        assert!(validate_date_range(None, Some(d(3))).is_ok());
    }
}
