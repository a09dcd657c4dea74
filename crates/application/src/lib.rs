//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务，处理输入校验、所有权检查，
//! 以及对外部适配器（密码哈希、令牌签发、人机校验）的抽象。

pub mod avatar;
pub mod captcha;
pub mod clock;
pub mod dto;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod password;
pub mod repository;
pub mod services;
pub mod token;

pub use avatar::AvatarUrlPolicy;
pub use captcha::{CaptchaError, CaptchaGate, CaptchaVerifier};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ApplicationError;
pub use password::{DefaultPasswordPolicy, PasswordHasher, PasswordHasherError, PasswordPolicy};
pub use repository::{
    MessageRepository, PageRequest, RoomRepository, TopicRepository, UserRepository,
};
pub use token::{
    InMemoryTokenBlacklist, TokenBlacklist, TokenClaims, TokenError, TokenKind, TokenPair,
    TokenService,
};
