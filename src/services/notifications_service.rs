use diesel::prelude::*;
use uuid::Uuid;

use crate::db::models::{NewNotification, Notification};
use crate::db::repositories::NotificationsRepo;
use crate::error::{AppError, AppResult};
use crate::services::context::RequestContext;
use crate::websocket::{ServerEvent, WebSocketManager};

pub mod kinds {
    pub const TASK_ASSIGNED: &str = "TASK_ASSIGNED";
    pub const TICKET_ASSIGNED: &str = "TICKET_ASSIGNED";
    pub const TICKET_COMMENT: &str = "TICKET_COMMENT";
    pub const TICKET_STATUS: &str = "TICKET_STATUS";
    pub const MEETING_INVITE: &str = "MEETING_INVITE";
    pub const MEETING_CHANGED: &str = "MEETING_CHANGED";
}

pub struct NotificationsService;

impl NotificationsService {
    pub fn build(
        user_id: Uuid,
        kind: &str,
        title: impl Into<String>,
        body: Option<String>,
        link: Option<String>,
    ) -> NewNotification {
        NewNotification {
            user_id,
            kind: kind.to_string(),
            title: title.into(),
            body,
            link,
        }
    }

    /// Persists the notifications and pushes each one to its recipient's
    /// live sockets. Failures are logged and swallowed so they never undo
    /// the change that triggered them.
    pub fn notify(conn: &mut PgConnection, ws: &WebSocketManager, rows: Vec<NewNotification>) {
        if rows.is_empty() {
            return;
        }
        match NotificationsRepo::insert_many(conn, &rows) {
            Ok(saved) => {
                for notification in saved {
                    let recipient = notification.user_id;
                    ws.send_to_user(recipient, &ServerEvent::Notification(notification));
                }
            }
            Err(e) => tracing::warn!(error = %e, count = rows.len(), "Failed to store notifications"),
        }
    }

    pub fn list(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        unread_only: bool,
    ) -> AppResult<Vec<Notification>> {
        Ok(NotificationsRepo::list_for_user(conn, ctx.user_id, unread_only)?)
    }

    pub fn mark_read(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        notification_id: Uuid,
    ) -> AppResult<()> {
        if NotificationsRepo::mark_read(conn, ctx.user_id, notification_id)? == 0 {
            return Err(AppError::not_found("notification"));
        }
        Ok(())
    }

    pub fn mark_all_read(conn: &mut PgConnection, ctx: &RequestContext) -> AppResult<usize> {
        Ok(NotificationsRepo::mark_all_read(conn, ctx.user_id)?)
    }
}
