use super::require_links;
use crate::error::AppError;

pub const MAX_MESSAGE_LEN: usize = 5000;
pub const MAX_EMOJI_LEN: usize = 32;

pub fn validate_message(body: &str, attachments: &[String]) -> Result<(), AppError> {
    if body.trim().is_empty() && attachments.is_empty() {
        return Err(AppError::validation("Message needs text or an attachment"));
    }
    if body.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::validation(format!(
            "Message cannot exceed {} characters",
            MAX_MESSAGE_LEN
        )));
    }
    require_links(attachments)
}

pub fn validate_emoji(emoji: &str) -> Result<(), AppError> {
    let emoji = emoji.trim();
    if emoji.is_empty() || emoji.len() > MAX_EMOJI_LEN || emoji.chars().any(char::is_whitespace) {
        return Err(AppError::validation("Invalid reaction"));
    }
    Ok(())
}
