use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::models::chat::{
    Chat, Message, NewChat, NewChatParticipant, NewMessage, Reaction,
};

pub struct ChatsRepo;

impl ChatsRepo {
    pub fn insert_chat(conn: &mut PgConnection, chat: &NewChat, participants: &[Uuid]) -> Result<Chat, diesel::result::Error> {
        let created: Chat = diesel::insert_into(crate::schema::chats::table)
            .values(chat)
            .returning(Chat::as_returning())
            .get_result(conn)?;
        let rows: Vec<NewChatParticipant> = participants
            .iter()
            .map(|user| NewChatParticipant {
                chat_id: created.id,
                user_id: *user,
            })
            .collect();
        diesel::insert_into(crate::schema::chat_participants::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(conn)?;
        Ok(created)
    }

    pub fn find_chat(conn: &mut PgConnection, chat_id: Uuid) -> Result<Option<Chat>, diesel::result::Error> {
        use crate::schema::chats::dsl::*;
        chats.filter(id.eq(chat_id)).select(Chat::as_select()).first(conn).optional()
    }

    /// An existing one-to-one chat between exactly these two users.
    pub fn find_direct_chat(conn: &mut PgConnection, a: Uuid, b: Uuid) -> Result<Option<Chat>, diesel::result::Error> {
        use crate::schema::chat_participants::dsl as cp;
        use crate::schema::chats::dsl::*;

        let with_a = cp::chat_participants.filter(cp::user_id.eq(a)).select(cp::chat_id);
        let candidates: Vec<Chat> = chats
            .filter(is_group.eq(false))
            .filter(id.eq_any(with_a))
            .select(Chat::as_select())
            .load(conn)?;

        for chat in candidates {
            let members = Self::participant_ids(conn, chat.id)?;
            if members.len() == 2 && members.contains(&b) {
                return Ok(Some(chat));
            }
        }
        Ok(None)
    }

    pub fn chats_for_user(conn: &mut PgConnection, user: Uuid) -> Result<Vec<Chat>, diesel::result::Error> {
        use crate::schema::chat_participants::dsl as cp;
        use crate::schema::chats::dsl::*;

        let mine = cp::chat_participants.filter(cp::user_id.eq(user)).select(cp::chat_id);
        chats
            .filter(id.eq_any(mine))
            .select(Chat::as_select())
            .order(created_at.desc())
            .load(conn)
    }

    pub fn participant_ids(conn: &mut PgConnection, target_chat: Uuid) -> Result<Vec<Uuid>, diesel::result::Error> {
        use crate::schema::chat_participants::dsl::*;
        chat_participants.filter(chat_id.eq(target_chat)).select(user_id).load(conn)
    }

    pub fn is_participant(conn: &mut PgConnection, target_chat: Uuid, user: Uuid) -> Result<bool, diesel::result::Error> {
        use crate::schema::chat_participants::dsl::*;
        diesel::select(diesel::dsl::exists(
            chat_participants.filter(chat_id.eq(target_chat)).filter(user_id.eq(user)),
        ))
        .get_result(conn)
    }

    pub fn insert_message(conn: &mut PgConnection, message: &NewMessage) -> Result<Message, diesel::result::Error> {
        diesel::insert_into(crate::schema::messages::table)
            .values(message)
            .returning(Message::as_returning())
            .get_result(conn)
    }

    pub fn find_message(conn: &mut PgConnection, message_id: Uuid) -> Result<Option<Message>, diesel::result::Error> {
        use crate::schema::messages::dsl::*;
        messages.filter(id.eq(message_id)).select(Message::as_select()).first(conn).optional()
    }

    pub fn messages_page(
        conn: &mut PgConnection,
        target_chat: Uuid,
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Message>, diesel::result::Error> {
        use crate::schema::messages::dsl::*;
        let mut query = messages
            .filter(chat_id.eq(target_chat))
            .select(Message::as_select())
            .into_boxed();
        if let Some(cursor) = before {
            query = query.filter(created_at.lt(cursor));
        }
        query.order(created_at.desc()).limit(limit).load(conn)
    }

    pub fn edit_message(conn: &mut PgConnection, message_id: Uuid, new_body: &str) -> Result<Message, diesel::result::Error> {
        use crate::schema::messages::dsl::*;
        diesel::update(messages.filter(id.eq(message_id)))
            .set((body.eq(new_body), is_edited.eq(true), updated_at.eq(Utc::now())))
            .returning(Message::as_returning())
            .get_result(conn)
    }

    pub fn soft_delete_message(conn: &mut PgConnection, message_id: Uuid) -> Result<Message, diesel::result::Error> {
        use crate::schema::messages::dsl::*;
        diesel::update(messages.filter(id.eq(message_id)))
            .set((is_deleted.eq(true), updated_at.eq(Utc::now())))
            .returning(Message::as_returning())
            .get_result(conn)
    }

    /// Adds the reaction, or removes it when it is already present.
    /// Returns true when the reaction now exists.
    pub fn toggle_reaction(conn: &mut PgConnection, target_message: Uuid, user: Uuid, reaction: &str) -> Result<bool, diesel::result::Error> {
        use crate::schema::message_reactions::dsl::*;
        let removed = diesel::delete(
            message_reactions
                .filter(message_id.eq(target_message))
                .filter(user_id.eq(user))
                .filter(emoji.eq(reaction)),
        )
        .execute(conn)?;
        if removed > 0 {
            return Ok(false);
        }
        diesel::insert_into(message_reactions)
            .values((message_id.eq(target_message), user_id.eq(user), emoji.eq(reaction)))
            .on_conflict_do_nothing()
            .execute(conn)?;
        Ok(true)
    }

    pub fn reactions_for(conn: &mut PgConnection, message_ids: &[Uuid]) -> Result<Vec<Reaction>, diesel::result::Error> {
        use crate::schema::message_reactions::dsl::*;
        message_reactions
            .filter(message_id.eq_any(message_ids))
            .select(Reaction::as_select())
            .order(created_at.asc())
            .load(conn)
    }
}
