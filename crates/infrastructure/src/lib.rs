//! 基础设施层实现。
//!
//! 提供 PostgreSQL 仓储、bcrypt 密码哈希、JWT 令牌、令牌黑名单和 reCAPTCHA 客户端，
//! 实现应用层定义的接口。

pub mod blacklist;
pub mod builder;
pub mod captcha;
pub mod migrations;
pub mod password;
pub mod repository;
pub mod token;

pub use blacklist::RedisTokenBlacklist;
pub use builder::{Infrastructure, InfrastructureConfig, InfrastructureError};
pub use captcha::RecaptchaVerifier;
pub use migrations::MIGRATOR;
pub use password::BcryptPasswordHasher;
pub use repository::{
    create_pg_pool, PgMessageRepository, PgRoomRepository, PgStorage, PgTopicRepository,
    PgUserRepository,
};
pub use token::{JwtConfig, JwtTokenService};
