//! 人机校验
//!
//! 仅在配置启用时生效；关闭时注册和登录不需要提交令牌。

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::error::ApplicationError;

#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("verification request failed: {0}")]
    Transport(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// 向校验服务提交客户端令牌，返回服务端判定结果。
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError>;
}

#[derive(Clone, Default)]
pub struct CaptchaGate {
    verifier: Option<Arc<dyn CaptchaVerifier>>,
}

impl CaptchaGate {
    pub fn disabled() -> Self {
        Self { verifier: None }
    }

    pub fn enabled(verifier: Arc<dyn CaptchaVerifier>) -> Self {
        Self {
            verifier: Some(verifier),
        }
    }

    pub async fn check(&self, token: Option<&str>) -> Result<(), ApplicationError> {
        let Some(verifier) = &self.verifier else {
            return Ok(());
        };
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApplicationError::CaptchaRejected)?;

        if verifier.verify(token).await? {
            Ok(())
        } else {
            warn!("captcha verification rejected");
            Err(ApplicationError::CaptchaRejected)
        }
    }
}
