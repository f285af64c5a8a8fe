use diesel::prelude::*;
use uuid::Uuid;

use crate::db::models::notification::{NewNotification, Notification};

pub struct NotificationsRepo;

impl NotificationsRepo {
    pub fn insert_many(conn: &mut PgConnection, rows: &[NewNotification]) -> Result<Vec<Notification>, diesel::result::Error> {
        diesel::insert_into(crate::schema::notifications::table)
            .values(rows)
            .returning(Notification::as_returning())
            .get_results(conn)
    }

    pub fn list_for_user(conn: &mut PgConnection, target_user: Uuid, unread_only: bool) -> Result<Vec<Notification>, diesel::result::Error> {
        use crate::schema::notifications::dsl::*;
        let mut query = notifications
            .filter(user_id.eq(target_user))
            .select(Notification::as_select())
            .into_boxed();
        if unread_only {
            query = query.filter(is_read.eq(false));
        }
        query.order(created_at.desc()).limit(200).load(conn)
    }

    pub fn mark_read(conn: &mut PgConnection, target_user: Uuid, notification_id: Uuid) -> Result<usize, diesel::result::Error> {
        use crate::schema::notifications::dsl::*;
        diesel::update(notifications.filter(id.eq(notification_id)).filter(user_id.eq(target_user)))
            .set(is_read.eq(true))
            .execute(conn)
    }

    pub fn mark_all_read(conn: &mut PgConnection, target_user: Uuid) -> Result<usize, diesel::result::Error> {
        use crate::schema::notifications::dsl::*;
        diesel::update(notifications.filter(user_id.eq(target_user)).filter(is_read.eq(false)))
            .set(is_read.eq(true))
            .execute(conn)
    }
}
