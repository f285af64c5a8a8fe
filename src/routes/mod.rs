pub mod auth;
pub mod chats;
pub mod health;
pub mod meetings;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod tickets;
pub mod users;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{MethodRouter, delete, get, post, put},
};
use std::sync::Arc;

use crate::{
    AppState,
    middleware::{auth::auth_middleware, rbac},
    rbac::Action,
    websocket,
};

/// Puts a route behind the role policy entry for `action`.
fn guarded(route: MethodRouter<Arc<AppState>>, action: Action) -> MethodRouter<Arc<AppState>> {
    route.route_layer(from_fn_with_state(action, rbac::enforce))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh));

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/users/me", put(auth::update_profile))
        // Users
        .route(
            "/users",
            guarded(get(users::list_users), Action::UsersView)
                .merge(guarded(post(users::create_user), Action::UsersManage)),
        )
        .route(
            "/users/:user_id",
            guarded(get(users::get_user), Action::UsersView)
                .merge(guarded(put(users::update_user), Action::UsersManage))
                .merge(guarded(delete(users::deactivate_user), Action::UsersManage)),
        )
        // Projects
        .route(
            "/projects",
            guarded(get(projects::list_projects), Action::ProjectsView)
                .merge(guarded(post(projects::create_project), Action::ProjectsCreate)),
        )
        .route(
            "/projects/:project_id",
            guarded(get(projects::get_project), Action::ProjectsView)
                .merge(guarded(put(projects::update_project), Action::ProjectsUpdate))
                .merge(guarded(delete(projects::delete_project), Action::ProjectsDelete)),
        )
        .route(
            "/projects/:project_id/members",
            guarded(put(projects::set_members), Action::ProjectsUpdate),
        )
        .route(
            "/projects/:project_id/summary",
            guarded(get(projects::project_summary), Action::ProjectsView),
        )
        // Tasks
        .route(
            "/projects/:project_id/tasks",
            guarded(get(tasks::list_tasks), Action::TasksView)
                .merge(guarded(post(tasks::create_task), Action::TasksCreate)),
        )
        .route(
            "/tasks/:task_id",
            guarded(get(tasks::get_task), Action::TasksView)
                .merge(guarded(put(tasks::update_task), Action::TasksUpdate))
                .merge(guarded(delete(tasks::delete_task), Action::TasksDelete)),
        )
        .route(
            "/tasks/:task_id/time-logs",
            guarded(get(tasks::list_time_logs), Action::TimeLogsView)
                .merge(guarded(post(tasks::log_time), Action::TimeLogsCreate)),
        )
        // Tickets
        .route(
            "/tickets",
            guarded(get(tickets::list_tickets), Action::TicketsView)
                .merge(guarded(post(tickets::create_ticket), Action::TicketsCreate)),
        )
        .route(
            "/tickets/:ticket_id",
            guarded(get(tickets::get_ticket), Action::TicketsView)
                .merge(guarded(put(tickets::update_ticket), Action::TicketsUpdate))
                .merge(guarded(delete(tickets::delete_ticket), Action::TicketsDelete)),
        )
        .route(
            "/tickets/:ticket_id/assign",
            guarded(post(tickets::assign_ticket), Action::TicketsAssign),
        )
        .route(
            "/tickets/:ticket_id/comments",
            guarded(post(tickets::comment_ticket), Action::TicketsComment),
        )
        // Rooms
        .route(
            "/rooms",
            guarded(get(meetings::list_rooms), Action::RoomsView)
                .merge(guarded(post(meetings::create_room), Action::RoomsManage)),
        )
        .route(
            "/rooms/available",
            guarded(get(meetings::available_rooms), Action::RoomsView),
        )
        .route(
            "/rooms/:room_id",
            guarded(put(meetings::update_room), Action::RoomsManage)
                .merge(guarded(delete(meetings::delete_room), Action::RoomsManage)),
        )
        .route(
            "/rooms/:room_id/blocks",
            guarded(post(meetings::block_slot), Action::RoomsManage),
        )
        .route(
            "/rooms/:room_id/schedule",
            guarded(get(meetings::room_schedule), Action::RoomsView),
        )
        // Meetings
        .route(
            "/meetings",
            guarded(get(meetings::list_meetings), Action::MeetingsView)
                .merge(guarded(post(meetings::create_meeting), Action::MeetingsCreate)),
        )
        .route(
            "/meetings/:meeting_id",
            guarded(put(meetings::update_meeting), Action::MeetingsManage)
                .merge(guarded(delete(meetings::delete_meeting), Action::MeetingsManage)),
        )
        // Chats
        .route(
            "/chats",
            guarded(get(chats::list_chats), Action::ChatsUse)
                .merge(guarded(post(chats::create_chat), Action::ChatsUse)),
        )
        .route(
            "/chats/:chat_id/messages",
            guarded(get(chats::list_messages), Action::ChatsUse)
                .merge(guarded(post(chats::send_message), Action::ChatsUse)),
        )
        .route(
            "/messages/:message_id",
            guarded(put(chats::edit_message), Action::ChatsUse)
                .merge(guarded(delete(chats::delete_message), Action::ChatsUse)),
        )
        .route(
            "/messages/:message_id/reactions",
            guarded(post(chats::toggle_reaction), Action::ChatsUse),
        )
        // Notifications
        .route(
            "/notifications",
            guarded(get(notifications::list_notifications), Action::NotificationsView),
        )
        .route(
            "/notifications/read-all",
            guarded(post(notifications::mark_all_read), Action::NotificationsView),
        )
        .route(
            "/notifications/:notification_id/read",
            guarded(post(notifications::mark_read), Action::NotificationsView),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    // The socket lives beside the REST API rather than under its prefix.
    let ws_routes = websocket::upgrade_routes().merge(
        websocket::protected_routes()
            .route_layer(from_fn_with_state(state.clone(), auth_middleware)),
    );

    Router::new()
        .nest("/api/v1", public_routes.merge(protected_routes))
        .merge(ws_routes)
        .with_state(state)
}
