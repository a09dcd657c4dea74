//! Google reCAPTCHA 校验客户端

use std::time::Duration;

use application::captcha::{CaptchaError, CaptchaVerifier};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: String,
    verify_url: String,
}

impl RecaptchaVerifier {
    pub fn new(secret: impl Into<String>, verify_url: impl Into<String>) -> Result<Self, CaptchaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|err| CaptchaError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            secret: secret.into(),
            verify_url: verify_url.into(),
        })
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError> {
        let response = self
            .client
            .post(&self.verify_url)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await
            .map_err(|err| CaptchaError::Transport(err.to_string()))?
            .error_for_status()
            .map_err(|err| CaptchaError::Transport(err.to_string()))?;

        let body: SiteVerifyResponse = response
            .json()
            .await
            .map_err(|err| CaptchaError::Transport(err.to_string()))?;

        if !body.success {
            warn!(error_codes = ?body.error_codes, "reCAPTCHA rejected token");
        }
        Ok(body.success)
    }
}
