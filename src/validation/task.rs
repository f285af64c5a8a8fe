use chrono::NaiveDate;

use super::{project::validate_date_range, require_text};
use crate::error::AppError;

pub fn validate_create_task(
    title: &str,
    start_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
) -> Result<(), AppError> {
    require_text(title, "Task title")?;
    validate_date_range(start_date, due_date)
}

/// Every assignee must already belong to the project.
pub fn validate_assignees(assignees: &[uuid::Uuid], members: &[uuid::Uuid]) -> Result<(), AppError> {
    if let Some(outsider) = assignees.iter().find(|id| !members.contains(id)) {
        return Err(AppError::validation(format!(
            "User {} is not a member of this project",
            outsider
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_assignees_must_be_members() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(validate_assignees(&[a], &[a, b]).is_ok());
        assert!(validate_assignees(&[], &[]).is_ok());
        assert!(validate_assignees(&[Uuid::new_v4()], &[a, b]).is_err());
    }

    #[test]
    fn test_due_before_start_rejected() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 10);
        let due = NaiveDate::from_ymd_opt(2026, 1, 5);
        assert!(validate_create_task("Paint walls", start, due).is_err());
        assert!(validate_create_task("", None, None).is_err());
    }
}
