use redis::{AsyncCommands, RedisResult};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::context::RequestContext;

const AUTH_CONTEXT_PREFIX: &str = "auth_ctx:";
const REVOKED_TOKEN_PREFIX: &str = "revoked_jti:";

/// Redis-backed store for resolved request contexts and revoked token ids.
#[derive(Clone)]
pub struct AuthCache {
    redis_client: redis::Client,
    ttl: u64,
}

impl AuthCache {
    pub fn new(redis_client: redis::Client, ttl: u64) -> Self {
        Self { redis_client, ttl }
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        Ok(self.redis_client.get_multiplexed_async_connection().await?)
    }

    pub async fn get_context(&self, user_id: Uuid) -> Result<Option<RequestContext>, AppError> {
        let mut conn = self.get_connection().await?;
        let key = format!("{}{}", AUTH_CONTEXT_PREFIX, user_id);

        let cached: Option<String> = conn.get(&key).await?;
        match cached {
            Some(json) => match serde_json::from_str(&json) {
                Ok(ctx) => Ok(Some(ctx)),
                Err(e) => {
                    tracing::warn!(user_id = %user_id, error = %e, "Dropping unreadable auth cache entry");
                    let _: RedisResult<i32> = conn.del(&key).await;
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub async fn put_context(&self, ctx: &RequestContext) -> Result<(), AppError> {
        if self.ttl == 0 {
            return Ok(());
        }
        let mut conn = self.get_connection().await?;
        let key = format!("{}{}", AUTH_CONTEXT_PREFIX, ctx.user_id);
        let json = serde_json::to_string(ctx)
            .map_err(|e| AppError::internal(format!("Failed to serialize auth context: {}", e)))?;

        let _: () = conn.set_ex(&key, json, self.ttl).await?;
        Ok(())
    }

    /// Drops the cached context so the next request reloads role and
    /// campus access from the database.
    pub async fn invalidate(&self, user_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.get_connection().await?;
        let key = format!("{}{}", AUTH_CONTEXT_PREFIX, user_id);
        let _: i32 = conn.del(&key).await?;
        Ok(())
    }

    /// Marks a token id as revoked for the rest of its lifetime.
    pub async fn revoke(&self, jti: &str, remaining_secs: u64) -> Result<(), AppError> {
        if remaining_secs == 0 {
            return Ok(());
        }
        let mut conn = self.get_connection().await?;
        let key = format!("{}{}", REVOKED_TOKEN_PREFIX, jti);
        let _: () = conn.set_ex(&key, "1", remaining_secs).await?;
        Ok(())
    }

    pub async fn is_revoked(&self, jti: &str) -> Result<bool, AppError> {
        let mut conn = self.get_connection().await?;
        let key = format!("{}{}", REVOKED_TOKEN_PREFIX, jti);
        Ok(conn.exists(&key).await?)
    }

    pub async fn health_check(&self) -> Result<bool, AppError> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::UserRole;

    fn cache(url: &str) -> AuthCache {
        AuthCache::new(redis::Client::open(url).unwrap(), 60)
    }

    fn context() -> RequestContext {
        RequestContext {
            user_id: Uuid::new_v4(),
            name: "Dana".into(),
            email: "dana@example.com".into(),
            role: UserRole::Manager,
            department: None,
            campus_access: vec!["North".into()],
        }
    }

    #[tokio::test]
    async fn invalidate_reports_redis_failures() {
        let unreachable = cache("redis://127.0.0.1:1/");
        let result = unreachable.invalidate(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Redis(_))));
    }

    #[tokio::test]
    #[ignore = "requires running redis"]
    async fn invalidate_drops_cached_context() {
        let cache = cache("redis://127.0.0.1:6379/");
        let ctx = context();
        cache.put_context(&ctx).await.unwrap();
        assert_eq!(cache.get_context(ctx.user_id).await.unwrap(), Some(ctx.clone()));

        cache.invalidate(ctx.user_id).await.unwrap();
        assert_eq!(cache.get_context(ctx.user_id).await.unwrap(), None);
        assert!(cache.health_check().await.unwrap());
    }
}
