use domain::{DomainError, RepositoryError};
use thiserror::Error;

use crate::{captcha::CaptchaError, password::PasswordHasherError, token::TokenError};

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("repository error: {0:?}")]
    Repository(RepositoryError),
    #[error("password error: {0}")]
    Password(#[from] PasswordHasherError),
    #[error("token error: {0}")]
    Token(#[from] TokenError),
    #[error("captcha error: {0}")]
    Captcha(#[from] CaptchaError),
    #[error("reCAPTCHA verification failed")]
    CaptchaRejected,
    #[error("password fields didn't match")]
    PasswordMismatch,
    #[error("password rejected: {}", reasons.join("; "))]
    WeakPassword { reasons: Vec<String> },
    /// 登录时邮箱不存在。与 `WrongPassword` 区分是有意为之的可用性选择。
    #[error("no account found with this email address")]
    UnknownEmail,
    #[error("the password you entered is incorrect")]
    WrongPassword,
    #[error("account is disabled")]
    AccountDisabled,
    /// 客户端提交的令牌无法使用（格式错误、已失效或已拉黑）
    #[error("token rejected: {0}")]
    TokenRejected(String),
    #[error("authentication failed: {0}")]
    Unauthenticated(String),
}

impl ApplicationError {
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        ApplicationError::Unauthenticated(reason.into())
    }
}

/// 唯一约束冲突按列名翻译成带字段信息的领域错误。
impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match &value {
            RepositoryError::Conflict { field } => match field.as_str() {
                "username" => ApplicationError::Domain(DomainError::UsernameTaken),
                "email" => ApplicationError::Domain(DomainError::EmailTaken),
                "topic" => ApplicationError::Domain(DomainError::TopicNameTaken),
                _ => ApplicationError::Repository(value),
            },
            _ => ApplicationError::Repository(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violations_become_field_errors() {
        let err = ApplicationError::from(RepositoryError::conflict("email"));
        assert!(matches!(err, ApplicationError::Domain(DomainError::EmailTaken)));

        let err = ApplicationError::from(RepositoryError::conflict("username"));
        assert!(matches!(err, ApplicationError::Domain(DomainError::UsernameTaken)));

        let err = ApplicationError::from(RepositoryError::conflict("other"));
        assert!(matches!(err, ApplicationError::Repository(RepositoryError::Conflict { .. })));
    }
}
