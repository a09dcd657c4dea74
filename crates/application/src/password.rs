//! 密码哈希与密码强度策略

use async_trait::async_trait;
use domain::PasswordHash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordHasherError {
    #[error("hash error: {0}")]
    Hash(String),
    #[error("verify error: {0}")]
    Verify(String),
}

impl PasswordHasherError {
    pub fn hash_error(message: impl Into<String>) -> Self {
        Self::Hash(message.into())
    }

    pub fn verify_error(message: impl Into<String>) -> Self {
        Self::Verify(message.into())
    }
}

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError>;
    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError>;
}

/// 注册时的密码强度校验。返回全部未通过的原因。
pub trait PasswordPolicy: Send + Sync {
    fn check(&self, password: &str, username: &str, email: &str) -> Result<(), Vec<String>>;
}

const COMMON_PASSWORDS: &[&str] = &[
    "123456", "12345678", "123456789", "1234567890", "password", "password1", "password123",
    "qwerty", "qwerty123", "qwertyuiop", "abc123", "111111", "123123", "letmein", "welcome",
    "iloveyou", "admin", "admin123", "monkey", "dragon", "football", "baseball", "sunshine",
    "princess", "trustno1", "superman", "1q2w3e4r", "zaq12wsx", "passw0rd", "master",
];

/// 默认策略：最小长度、不能全为数字、不能是常见密码、不能与用户名或邮箱过于相似。
#[derive(Debug, Clone)]
pub struct DefaultPasswordPolicy {
    min_length: usize,
}

impl DefaultPasswordPolicy {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Default for DefaultPasswordPolicy {
    fn default() -> Self {
        Self::new(8)
    }
}

impl PasswordPolicy for DefaultPasswordPolicy {
    fn check(&self, password: &str, username: &str, email: &str) -> Result<(), Vec<String>> {
        let mut reasons = Vec::new();
        let lowered = password.to_lowercase();

        if password.chars().count() < self.min_length {
            reasons.push(format!(
                "This password is too short. It must contain at least {} characters.",
                self.min_length
            ));
        }
        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            reasons.push("This password is entirely numeric.".to_owned());
        }
        if COMMON_PASSWORDS.contains(&lowered.as_str()) {
            reasons.push("This password is too common.".to_owned());
        }

        let local_part = email.split('@').next().unwrap_or_default();
        for (attribute, value) in [("username", username), ("email address", local_part)] {
            if too_similar(&lowered, &value.to_lowercase()) {
                reasons.push(format!("The password is too similar to the {attribute}."));
            }
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(reasons)
        }
    }
}

fn too_similar(password: &str, attribute: &str) -> bool {
    if attribute.chars().count() < 3 || password.is_empty() {
        return false;
    }
    password.contains(attribute) || attribute.contains(password)
}
