//! Real-time channel: chat fan-out, typing indicators, call signaling relay
//! and the support bot, all over one authenticated socket per tab.

pub mod auth;
pub mod events;
pub mod handler;
pub mod manager;

pub use events::{ClientEvent, EventError, ServerEvent};
pub use manager::{ConnectedUser, WebSocketManager, start_connection_cleanup_task};

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::AppState;

/// The upgrade authenticates through `?token=`, so it sits outside the
/// bearer middleware.
pub fn upgrade_routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(handler::websocket_handler))
}

pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws/online", get(handler::online_users))
}
