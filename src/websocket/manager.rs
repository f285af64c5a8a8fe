use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::enums::UserRole;
use crate::websocket::events::ServerEvent;

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct ConnectedUser {
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub connected_at: DateTime<Utc>,
    pub last_ping: DateTime<Utc>,
    pub rooms: HashSet<Uuid>,
}

impl ConnectedUser {
    pub fn new(user_id: Uuid, name: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            name,
            role,
            connected_at: now,
            last_ping: now,
            rooms: HashSet::new(),
        }
    }
}

/// Who a frame is for.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipients {
    /// Every connection of these users.
    Users(HashSet<Uuid>),
    /// Exactly these connections.
    Connections(HashSet<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(Arc<str>),
    /// Tells the addressed connections to hang up.
    Close,
}

/// One frame on the shared channel. Every connection task sees every
/// delivery and keeps only the ones addressed to it.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub to: Recipients,
    pub payload: Payload,
}

impl Delivery {
    pub fn is_for(&self, connection_id: &str, user_id: Uuid) -> bool {
        match &self.to {
            Recipients::Users(users) => users.contains(&user_id),
            Recipients::Connections(connections) => connections.contains(connection_id),
        }
    }
}

#[derive(Clone)]
pub struct WebSocketManager {
    connections: Arc<RwLock<HashMap<String, ConnectedUser>>>,
    // chat id -> connection ids currently viewing it
    rooms: Arc<RwLock<HashMap<Uuid, HashSet<String>>>>,
    broadcast_tx: broadcast::Sender<Delivery>,
}

impl Default for WebSocketManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSocketManager {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            rooms: Arc::new(RwLock::new(HashMap::new())),
            broadcast_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.broadcast_tx.subscribe()
    }

    pub async fn add_connection(&self, connection_id: String, user: ConnectedUser) {
        info!(user_id = %user.user_id, connection_id = %connection_id, "WebSocket connected");
        self.connections.write().await.insert(connection_id, user);
    }

    pub async fn remove_connection(&self, connection_id: &str) -> Option<ConnectedUser> {
        let removed = self.connections.write().await.remove(connection_id);
        if let Some(user) = &removed {
            let mut rooms = self.rooms.write().await;
            for chat_id in &user.rooms {
                if let Some(members) = rooms.get_mut(chat_id) {
                    members.remove(connection_id);
                    if members.is_empty() {
                        rooms.remove(chat_id);
                    }
                }
            }
            info!(user_id = %user.user_id, connection_id = %connection_id, "WebSocket disconnected");
        }
        removed
    }

    pub async fn join_room(&self, connection_id: &str, chat_id: Uuid) {
        let mut connections = self.connections.write().await;
        if let Some(user) = connections.get_mut(connection_id) {
            user.rooms.insert(chat_id);
            self.rooms
                .write()
                .await
                .entry(chat_id)
                .or_default()
                .insert(connection_id.to_string());
        }
    }

    pub async fn leave_room(&self, connection_id: &str, chat_id: Uuid) {
        if let Some(user) = self.connections.write().await.get_mut(connection_id) {
            user.rooms.remove(&chat_id);
        }
        let mut rooms = self.rooms.write().await;
        if let Some(members) = rooms.get_mut(&chat_id) {
            members.remove(connection_id);
            if members.is_empty() {
                rooms.remove(&chat_id);
            }
        }
    }

    pub async fn room_connections(&self, chat_id: Uuid) -> HashSet<String> {
        self.rooms
            .read()
            .await
            .get(&chat_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn get_connection(&self, connection_id: &str) -> Option<ConnectedUser> {
        self.connections.read().await.get(connection_id).cloned()
    }

    pub async fn update_ping(&self, connection_id: &str) {
        if let Some(user) = self.connections.write().await.get_mut(connection_id) {
            user.last_ping = Utc::now();
        }
    }

    pub async fn is_online(&self, user_id: Uuid) -> bool {
        self.connections
            .read()
            .await
            .values()
            .any(|user| user.user_id == user_id)
    }

    /// Distinct online users, sorted for stable output.
    pub async fn online_user_ids(&self) -> Vec<Uuid> {
        let connections = self.connections.read().await;
        let mut ids: Vec<Uuid> = connections
            .values()
            .map(|user| user.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        ids.sort();
        ids
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    fn publish(&self, to: Recipients, payload: Payload) {
        // An error only means no connection task is listening right now.
        if self.broadcast_tx.send(Delivery { to, payload }).is_err() {
            debug!("No live connections to deliver to");
        }
    }

    fn encode(event: &ServerEvent) -> Option<Arc<str>> {
        match event.encode() {
            Ok(text) => Some(Arc::from(text)),
            Err(e) => {
                warn!(error = %e, "Failed to encode server event");
                None
            }
        }
    }

    pub fn send_to_users<I>(&self, users: I, event: &ServerEvent)
    where
        I: IntoIterator<Item = Uuid>,
    {
        let users: HashSet<Uuid> = users.into_iter().collect();
        if users.is_empty() {
            return;
        }
        if let Some(text) = Self::encode(event) {
            self.publish(Recipients::Users(users), Payload::Text(text));
        }
    }

    pub fn send_to_user(&self, user_id: Uuid, event: &ServerEvent) {
        self.send_to_users([user_id], event);
    }

    pub fn send_to_connection(&self, connection_id: &str, event: &ServerEvent) {
        if let Some(text) = Self::encode(event) {
            self.publish(
                Recipients::Connections(HashSet::from([connection_id.to_string()])),
                Payload::Text(text),
            );
        }
    }

    /// Sends to every connection in the chat room except `except`.
    pub async fn send_to_room(&self, chat_id: Uuid, except: Option<&str>, event: &ServerEvent) {
        let mut targets = self.room_connections(chat_id).await;
        if let Some(skip) = except {
            targets.remove(skip);
        }
        if targets.is_empty() {
            return;
        }
        if let Some(text) = Self::encode(event) {
            self.publish(Recipients::Connections(targets), Payload::Text(text));
        }
    }

    /// Forwards a signaling frame to `to`. Returns false when `to` has no
    /// live connection; nothing is queued for later.
    pub async fn relay(&self, to: Uuid, event: &ServerEvent) -> bool {
        if !self.is_online(to).await {
            return false;
        }
        self.send_to_user(to, event);
        true
    }

    /// Drops connections that have not pinged within `timeout_minutes` and
    /// tells their tasks to close. Returns how many were removed.
    pub async fn cleanup_stale_connections(&self, timeout_minutes: i64) -> usize {
        let cutoff_time = Utc::now() - chrono::Duration::minutes(timeout_minutes);
        let stale: Vec<String> = self
            .connections
            .read()
            .await
            .iter()
            .filter(|(_, user)| user.last_ping < cutoff_time)
            .map(|(id, _)| id.clone())
            .collect();

        for connection_id in &stale {
            if let Some(user) = self.remove_connection(connection_id).await {
                warn!(user_id = %user.user_id, connection_id = %connection_id, "Removed stale connection");
            }
        }
        if !stale.is_empty() {
            self.publish(
                Recipients::Connections(stale.iter().cloned().collect()),
                Payload::Close,
            );
        }
        stale.len()
    }

    #[cfg(test)]
    pub(crate) async fn backdate_ping(&self, connection_id: &str, minutes: i64) {
        if let Some(user) = self.connections.write().await.get_mut(connection_id) {
            user.last_ping = Utc::now() - chrono::Duration::minutes(minutes);
        }
    }
}

/// Sweeps stale connections every five minutes; a connection is stale after
/// ten minutes without a ping.
pub async fn start_connection_cleanup_task(ws_manager: WebSocketManager) {
    let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
    loop {
        interval.tick().await;
        let removed = ws_manager.cleanup_stale_connections(10).await;
        debug!(removed, "WebSocket connection cleanup finished");
    }
}
