//! Redis 刷新令牌黑名单
//!
//! 每个被拉黑的 jti 对应一个带过期时间的键，令牌自然过期后键随之消失。

use application::token::{TokenBlacklist, TokenError};
use async_trait::async_trait;
use domain::Timestamp;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::{info, warn};
use uuid::Uuid;

pub struct RedisTokenBlacklist {
    connection: ConnectionManager,
    prefix: String,
}

impl RedisTokenBlacklist {
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_connection_manager().await?;
        Ok(Self {
            connection,
            prefix: "token_blacklist:".to_owned(),
        })
    }

    fn key(&self, jti: Uuid) -> String {
        format!("{}{}", self.prefix, jti)
    }
}

fn blacklist_error(err: redis::RedisError) -> TokenError {
    TokenError::Blacklist(err.to_string())
}

#[async_trait]
impl TokenBlacklist for RedisTokenBlacklist {
    async fn insert(&self, jti: Uuid, expires_at: Timestamp) -> Result<bool, TokenError> {
        let ttl = (expires_at - Timestamp::now_utc()).whole_seconds();
        if ttl <= 0 {
            warn!(%jti, "token already expired, not blacklisting");
            return Ok(true);
        }

        let mut conn = self.connection.clone();
        // SET NX EX：只有首次拉黑成功
        let inserted: Option<String> = redis::cmd("SET")
            .arg(self.key(jti))
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(ttl)
            .query_async(&mut conn)
            .await
            .map_err(blacklist_error)?;

        if inserted.is_some() {
            info!(%jti, ttl, "token blacklisted");
        }
        Ok(inserted.is_some())
    }

    async fn contains(&self, jti: Uuid) -> Result<bool, TokenError> {
        let mut conn = self.connection.clone();
        conn.exists(self.key(jti)).await.map_err(blacklist_error)
    }
}
