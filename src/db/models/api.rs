use serde::{Deserialize, Deserializer, Serialize};

/// Envelope shared by every REST response.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
    pub timestamp: String,
}

#[derive(Serialize, Default)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub code: String,
    pub message: String,
}

impl ErrorDetail {
    pub fn new(field: Option<&str>, code: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.map(str::to_string),
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl<T> ApiResponse<T> {
    fn build(
        success: bool,
        code: u16,
        message: &str,
        data: Option<T>,
        errors: Option<Vec<ErrorDetail>>,
    ) -> Self {
        Self {
            success,
            code,
            message: message.to_string(),
            data,
            meta: None,
            errors,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn failure(code: u16, error_code: &str, message: &str) -> Self {
        Self::build(
            false,
            code,
            message,
            None,
            Some(vec![ErrorDetail::new(None, error_code, message)]),
        )
    }

    pub fn success(data: T, message: &str) -> Self {
        Self::build(true, 200, message, Some(data), None)
    }

    /// 503 that still carries a body, for status reports.
    pub fn unavailable(data: T, message: &str) -> Self {
        Self::build(false, 503, message, Some(data), None)
    }

    pub fn success_with_count(data: T, message: &str, total_count: i64) -> Self {
        let mut response = Self::success(data, message);
        response.meta = Some(ResponseMeta {
            total_count: Some(total_count),
            ..Default::default()
        });
        response
    }

    pub fn created(data: T, message: &str) -> Self {
        Self::build(true, 201, message, Some(data), None)
    }

    pub fn ok(message: &str) -> Self {
        Self::build(true, 200, message, None, None)
    }

    pub fn validation_error(errors: Vec<ErrorDetail>) -> Self {
        Self::build(false, 400, "Validation failed", None, Some(errors))
    }

    pub fn bad_request(message: &str) -> Self {
        Self::failure(400, "BAD_REQUEST", message)
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::failure(401, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: &str) -> Self {
        Self::failure(403, "FORBIDDEN", message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::failure(404, "NOT_FOUND", message)
    }

    pub fn conflict(message: &str, field: Option<String>, error_code: &str) -> Self {
        Self::build(
            false,
            409,
            message,
            None,
            Some(vec![ErrorDetail {
                field,
                code: error_code.to_string(),
                message: message.to_string(),
            }]),
        )
    }

    pub fn internal_error(message: &str) -> Self {
        Self::failure(500, "INTERNAL_ERROR", message)
    }
}

/// Lets PATCH-style payloads tell an absent field (`None`) from an explicit
/// `null` (`Some(None)`).
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub mod error_codes {
    pub const AUTH_INVALID_CREDENTIALS: &str = "AUTH_001";
    pub const AUTH_ACCOUNT_DISABLED: &str = "AUTH_002";
    pub const AUTH_TOKEN_REVOKED: &str = "AUTH_003";

    pub const USER_EMAIL_EXISTS: &str = "USER_001";

    pub const ROOM_UNAVAILABLE: &str = "ROOM_001";
    pub const ROOM_INACTIVE: &str = "ROOM_002";

    pub const CHAT_NOT_PARTICIPANT: &str = "CHAT_001";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_errors() {
        let value = serde_json::to_value(ApiResponse::success(vec![1, 2], "ok")).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["code"], 200);
        assert!(value.get("errors").is_none());
        assert_eq!(value["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn failure_envelope_carries_error_code() {
        let value = serde_json::to_value(ApiResponse::<()>::forbidden("nope")).unwrap();
        assert_eq!(value["code"], 403);
        assert_eq!(value["errors"][0]["code"], "FORBIDDEN");
        assert!(value.get("data").is_none());
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        manager_id: Option<Option<u32>>,
    }

    #[test]
    fn double_option_distinguishes_null_from_missing() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.manager_id, None);
        let cleared: Patch = serde_json::from_str(r#"{"manager_id": null}"#).unwrap();
        assert_eq!(cleared.manager_id, Some(None));
        let set: Patch = serde_json::from_str(r#"{"manager_id": 7}"#).unwrap();
        assert_eq!(set.manager_id, Some(Some(7)));
    }

    #[test]
    fn count_lands_in_meta() {
        let value =
            serde_json::to_value(ApiResponse::success_with_count(vec!["a"], "listed", 1)).unwrap();
        assert_eq!(value["meta"]["total_count"], 1);
        assert!(value["meta"].get("request_id").is_none());
    }
}
