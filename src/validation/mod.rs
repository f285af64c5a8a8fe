pub mod auth;
pub mod chat;
pub mod meeting;
pub mod project;
pub mod task;
pub mod ticket;

use axum::{Json, async_trait, extract::FromRequest, http::Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::{db::models::api::ErrorDetail, error::AppError};

/// JSON body extractor that runs the payload's `validator` rules.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S, axum::body::Body> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<axum::body::Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(format!("Invalid JSON: {}", rejection)))?;

        value
            .validate()
            .map_err(|errors| AppError::validation_with_details(error_details(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

/// Flattens `validator` output into the envelope's per-field details.
pub fn error_details(errors: &ValidationErrors) -> Vec<ErrorDetail> {
    let mut details: Vec<ErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Validation failed for field: {}", field));
                ErrorDetail::new(Some(&**field), &error.code, message)
            })
        })
        .collect();
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

pub(crate) fn require_text(value: &str, what: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} is required", what)));
    }
    Ok(())
}

pub(crate) fn require_links(links: &[String]) -> Result<(), AppError> {
    for link in links {
        if !(link.starts_with("http://") || link.starts_with("https://")) {
            return Err(AppError::validation(format!(
                "Attachment \"{}\" must be an http(s) link",
                link
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 1, max = 10))]
        count: i32,
    }

    #[test]
    fn field_errors_become_details() {
        let sample = Sample {
            name: String::new(),
            count: 50,
        };
        let details = error_details(&sample.validate().unwrap_err());
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].field.as_deref(), Some("count"));
        assert_eq!(details[1].message, "Name is required");
    }

    #[test]
    fn links_must_be_http() {
        assert!(require_links(&["https://a.example/x.png".into()]).is_ok());
        assert!(require_links(&["file:///etc/passwd".into()]).is_err());
    }
}
