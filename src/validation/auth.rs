use crate::error::AppError;

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 8 {
        return Err(AppError::validation("Password must be at least 8 characters"));
    }
    if !password.chars().any(|c| c.is_alphabetic()) || !password.chars().any(|c| c.is_numeric()) {
        return Err(AppError::validation(
            "Password must contain at least one letter and one number",
        ));
    }
    Ok(())
}

pub fn validate_register_request(name: &str, email: &str, password: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AppError::validation("Invalid email format"));
    }
    validate_password(password)
}

pub fn validate_campus_list(campuses: &[String]) -> Result<(), AppError> {
    if campuses.iter().any(|c| c.trim().is_empty()) {
        return Err(AppError::validation("Campus names cannot be blank"));
    }
    Ok(())
}

pub struct UpdateProfileChanges<'a> {
    pub name: Option<&'a str>,
    pub department_present: bool,
    pub current_password: Option<&'a str>,
    pub new_password: Option<&'a str>,
}

pub fn validate_update_profile(changes: &UpdateProfileChanges) -> Result<(), AppError> {
    if changes.name.is_none() && !changes.department_present && changes.new_password.is_none() {
        return Err(AppError::validation("No update data provided"));
    }
    if let Some(name) = changes.name {
        if name.trim().is_empty() {
            return Err(AppError::validation("Name cannot be empty"));
        }
    }
    if let Some(new_password) = changes.new_password {
        if changes.current_password.is_none() {
            return Err(AppError::validation(
                "Current password is required to set a new password",
            ));
        }
        validate_password(new_password)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        assert!(validate_register_request("Ada", "ada@example.com", "secret123").is_ok());
        assert!(validate_register_request(" ", "ada@example.com", "secret123").is_err());
        assert!(validate_register_request("Ada", "ada.example.com", "secret123").is_err());
        assert!(validate_register_request("Ada", "ada@example.com", "password").is_err());
    }

    #[test]
    fn test_profile_validation() {
        let empty = UpdateProfileChanges {
            name: None,
            department_present: false,
            current_password: None,
            new_password: None,
        };
        assert!(validate_update_profile(&empty).is_err());

        let missing_current = UpdateProfileChanges {
            new_password: Some("newpass123"),
            ..empty
        };
        assert!(validate_update_profile(&missing_current).is_err());

        let ok = UpdateProfileChanges {
            name: None,
            department_present: false,
            current_password: Some("oldpass123"),
            new_password: Some("newpass123"),
        };
        assert!(validate_update_profile(&ok).is_ok());
    }
}
