//! 访问令牌 / 刷新令牌抽象以及刷新令牌黑名单
//!
//! 令牌的具体编码由基础设施层实现（HS256 JWT），这里只定义契约。

use std::collections::HashMap;

use async_trait::async_trait;
use domain::{Timestamp, UserId};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TokenError {
    /// 签名错误、格式错误或类型不符
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("token has expired")]
    Expired,
    #[error("failed to encode token: {0}")]
    Encode(String),
    #[error("token blacklist unavailable: {0}")]
    Blacklist(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// 解码后的令牌内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    /// 令牌唯一标识，用于黑名单
    pub jti: Uuid,
    pub kind: TokenKind,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub trait TokenService: Send + Sync {
    fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, TokenError>;

    fn issue_access(&self, user_id: UserId) -> Result<String, TokenError>;

    /// 校验签名、有效期和令牌类型。类型不符时返回 `TokenError::Invalid`。
    fn decode(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, TokenError>;
}

#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// 拉黑直到 `expires_at`。返回 `false` 表示此前已在黑名单中。
    async fn insert(&self, jti: Uuid, expires_at: Timestamp) -> Result<bool, TokenError>;

    async fn contains(&self, jti: Uuid) -> Result<bool, TokenError>;
}

/// 进程内黑名单。未配置 Redis 时使用。
#[derive(Debug, Default)]
pub struct InMemoryTokenBlacklist {
    entries: RwLock<HashMap<Uuid, Timestamp>>,
}

impl InMemoryTokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryTokenBlacklist {
    async fn insert(&self, jti: Uuid, expires_at: Timestamp) -> Result<bool, TokenError> {
        let now = Timestamp::now_utc();
        let mut entries = self.entries.write().await;
        entries.retain(|_, expiry| *expiry > now);
        Ok(entries.insert(jti, expires_at).is_none())
    }

    async fn contains(&self, jti: Uuid) -> Result<bool, TokenError> {
        let now = Timestamp::now_utc();
        let entries = self.entries.read().await;
        Ok(entries.get(&jti).is_some_and(|expiry| *expiry > now))
    }
}
