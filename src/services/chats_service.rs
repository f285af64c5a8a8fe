use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    db::models::{
        Chat, ChatInfo, CreateChatRequest, EditMessageRequest, Message, MessageInfo,
        MessageListQuery, NewChat, NewMessage, Reaction, ReactionSummary, SendMessageRequest,
        error_codes,
    },
    db::repositories::{ChatsRepo, UsersRepo},
    error::{AppError, AppResult},
    services::context::RequestContext,
    validation::chat::{validate_emoji, validate_message},
    websocket::{ServerEvent, WebSocketManager},
};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Groups reactions by emoji, keeping the order each emoji first appeared.
pub fn summarize_reactions(reactions: &[Reaction]) -> Vec<ReactionSummary> {
    let mut summary: Vec<ReactionSummary> = Vec::new();
    for reaction in reactions {
        match summary.iter_mut().find(|s| s.emoji == reaction.emoji) {
            Some(entry) => entry.user_ids.push(reaction.user_id),
            None => summary.push(ReactionSummary {
                emoji: reaction.emoji.clone(),
                user_ids: vec![reaction.user_id],
            }),
        }
    }
    summary
}

pub struct ChatsService;

impl ChatsService {
    /// Two-person chats are direct and reused; anything larger is a group.
    pub fn create(conn: &mut PgConnection, ctx: &RequestContext, req: &CreateChatRequest) -> AppResult<ChatInfo> {
        let mut participants: Vec<Uuid> = req.participant_ids.clone();
        participants.push(ctx.user_id);
        participants.sort();
        participants.dedup();
        if participants.len() < 2 {
            return Err(AppError::validation("A chat needs at least one other participant"));
        }
        let found = UsersRepo::existing_active_ids(conn, &participants)?;
        if let Some(missing) = participants.iter().find(|id| !found.contains(id)) {
            return Err(AppError::validation(format!("User {} does not exist or is inactive", missing)));
        }

        let is_group = participants.len() > 2;
        if !is_group {
            let other = participants
                .iter()
                .copied()
                .find(|id| *id != ctx.user_id)
                .unwrap_or(ctx.user_id);
            if let Some(chat) = ChatsRepo::find_direct_chat(conn, ctx.user_id, other)? {
                return Ok(ChatInfo {
                    chat,
                    participant_ids: participants,
                });
            }
        }

        let chat = conn.transaction::<_, AppError, _>(|conn| {
            Ok(ChatsRepo::insert_chat(
                conn,
                &NewChat {
                    name: req.name.as_ref().map(|n| n.trim().to_string()),
                    is_group,
                    created_by: ctx.user_id,
                },
                &participants,
            )?)
        })?;
        tracing::info!(chat_id = %chat.id, members = participants.len(), "Chat created");
        Ok(ChatInfo {
            chat,
            participant_ids: participants,
        })
    }

    pub fn list(conn: &mut PgConnection, ctx: &RequestContext) -> AppResult<Vec<ChatInfo>> {
        let chats = ChatsRepo::chats_for_user(conn, ctx.user_id)?;
        chats
            .into_iter()
            .map(|chat| {
                let participant_ids = ChatsRepo::participant_ids(conn, chat.id)?;
                Ok(ChatInfo {
                    chat,
                    participant_ids,
                })
            })
            .collect()
    }

    /// Rejects callers who are not in the chat.
    pub fn ensure_participant(conn: &mut PgConnection, chat_id: Uuid, user_id: Uuid) -> AppResult<Chat> {
        let chat = ChatsRepo::find_chat(conn, chat_id)?.ok_or_else(|| AppError::not_found("chat"))?;
        if !ChatsRepo::is_participant(conn, chat_id, user_id)? {
            return Err(AppError::forbidden_with_code(
                "You are not a participant of this chat",
                error_codes::CHAT_NOT_PARTICIPANT,
            ));
        }
        Ok(chat)
    }

    /// Newest first. Deleted messages keep their slot with blanked content.
    pub fn messages(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        chat_id: Uuid,
        query: &MessageListQuery,
    ) -> AppResult<Vec<MessageInfo>> {
        Self::ensure_participant(conn, chat_id, ctx.user_id)?;
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let page = ChatsRepo::messages_page(conn, chat_id, query.before, limit)?;
        let ids: Vec<Uuid> = page.iter().map(|m| m.id).collect();
        let reactions = ChatsRepo::reactions_for(conn, &ids)?;

        Ok(page
            .into_iter()
            .map(|message| {
                let own: Vec<Reaction> = reactions
                    .iter()
                    .filter(|r| r.message_id == message.id)
                    .cloned()
                    .collect();
                MessageInfo {
                    reactions: if message.is_deleted { Vec::new() } else { summarize_reactions(&own) },
                    message: message.redacted(),
                }
            })
            .collect())
    }

    /// Persists the message and fans it out to every participant as
    /// `receive_message`.
    pub fn send(
        conn: &mut PgConnection,
        ws: &WebSocketManager,
        ctx: &RequestContext,
        chat_id: Uuid,
        req: &SendMessageRequest,
    ) -> AppResult<MessageInfo> {
        Self::ensure_participant(conn, chat_id, ctx.user_id)?;
        validate_message(&req.body, &req.attachments)?;

        let message = ChatsRepo::insert_message(
            conn,
            &NewMessage {
                chat_id,
                sender_id: ctx.user_id,
                body: req.body.trim().to_string(),
                attachments: req.attachments.clone(),
            },
        )?;
        let info = MessageInfo {
            message,
            reactions: Vec::new(),
        };
        let participants = ChatsRepo::participant_ids(conn, chat_id)?;
        ws.send_to_users(participants, &ServerEvent::ReceiveMessage(info.clone()));
        Ok(info)
    }

    pub fn edit(
        conn: &mut PgConnection,
        ws: &WebSocketManager,
        ctx: &RequestContext,
        message_id: Uuid,
        req: &EditMessageRequest,
    ) -> AppResult<Message> {
        let message = Self::own_message(conn, ctx, message_id)?;
        // Text may only be cleared when attachments remain.
        validate_message(&req.body, &message.attachments)?;
        let body = req.body.trim();

        let edited = ChatsRepo::edit_message(conn, message.id, body)?;
        let participants = ChatsRepo::participant_ids(conn, edited.chat_id)?;
        ws.send_to_users(participants, &ServerEvent::MessageEdited(edited.clone()));
        Ok(edited)
    }

    pub fn delete(
        conn: &mut PgConnection,
        ws: &WebSocketManager,
        ctx: &RequestContext,
        message_id: Uuid,
    ) -> AppResult<()> {
        let message = Self::own_message(conn, ctx, message_id)?;
        ChatsRepo::soft_delete_message(conn, message.id)?;
        let participants = ChatsRepo::participant_ids(conn, message.chat_id)?;
        ws.send_to_users(
            participants,
            &ServerEvent::MessageDeleted {
                chat_id: message.chat_id,
                message_id: message.id,
            },
        );
        Ok(())
    }

    /// Adds the caller's reaction or takes it back, then broadcasts the
    /// message's full reaction set.
    pub fn toggle_reaction(
        conn: &mut PgConnection,
        ws: &WebSocketManager,
        ctx: &RequestContext,
        message_id: Uuid,
        emoji: &str,
    ) -> AppResult<Vec<ReactionSummary>> {
        validate_emoji(emoji)?;
        let message = ChatsRepo::find_message(conn, message_id)?
            .filter(|m| !m.is_deleted)
            .ok_or_else(|| AppError::not_found("message"))?;
        Self::ensure_participant(conn, message.chat_id, ctx.user_id)?;

        ChatsRepo::toggle_reaction(conn, message_id, ctx.user_id, emoji.trim())?;
        let reactions = summarize_reactions(&ChatsRepo::reactions_for(conn, &[message_id])?);

        let participants = ChatsRepo::participant_ids(conn, message.chat_id)?;
        ws.send_to_users(
            participants,
            &ServerEvent::ReactionUpdated {
                chat_id: message.chat_id,
                message_id,
                reactions: reactions.clone(),
            },
        );
        Ok(reactions)
    }

    fn own_message(conn: &mut PgConnection, ctx: &RequestContext, message_id: Uuid) -> AppResult<Message> {
        let message = ChatsRepo::find_message(conn, message_id)?
            .filter(|m| !m.is_deleted)
            .ok_or_else(|| AppError::not_found("message"))?;
        if message.sender_id != ctx.user_id {
            return Err(AppError::forbidden("You can only change your own messages"));
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reaction(user_id: Uuid, emoji: &str) -> Reaction {
        Reaction {
            message_id: Uuid::nil(),
            user_id,
            emoji: emoji.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn groups_reactions_in_first_seen_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let summary = summarize_reactions(&[reaction(a, "👍"), reaction(b, "🎉"), reaction(b, "👍")]);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].emoji, "👍");
        assert_eq!(summary[0].user_ids, vec![a, b]);
        assert_eq!(summary[1].user_ids, vec![b]);
    }

    #[test]
    fn no_reactions_no_summary() {
        assert!(summarize_reactions(&[]).is_empty());
    }
}
