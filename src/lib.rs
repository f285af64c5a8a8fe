pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod rbac;
pub mod routes;
pub mod scheduling;
pub mod schema;
pub mod services;
pub mod support_bot;
pub mod validation;
pub mod websocket;

use crate::cache::AuthCache;
use crate::config::{Config, LoggingConfig};
use crate::db::DbPool;
use crate::middleware::auth::TokenService;
use crate::websocket::WebSocketManager;
use std::sync::Arc;
use tracing::Level;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub tokens: TokenService,
    pub auth_cache: AuthCache,
    pub ws: WebSocketManager,
}

impl AppState {
    pub fn new(db: DbPool, redis: redis::Client, config: Config) -> Self {
        let auth = config.auth();
        let tokens = TokenService::new(&auth);
        let auth_cache = AuthCache::new(redis, auth.cache_ttl);
        Self {
            db,
            config: Arc::new(config),
            tokens,
            auth_cache,
            ws: WebSocketManager::new(),
        }
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

pub fn init_tracing(config: &LoggingConfig) {
    let level = parse_level(&config.level);
    match config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_max_level(level)
                .with_current_span(false)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_max_level(level).init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_levels_fall_back_to_info() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }
}
