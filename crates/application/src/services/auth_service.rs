use std::sync::Arc;

use domain::{User, UserEmail, UserId, Username};
use tracing::{info, warn};

use crate::{
    captcha::CaptchaGate,
    clock::Clock,
    error::ApplicationError,
    password::{PasswordHasher, PasswordPolicy},
    repository::UserRepository,
    token::{TokenBlacklist, TokenError, TokenKind, TokenPair, TokenService},
};

#[derive(Debug, Clone, Default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub password: String,
    pub confirm_password: String,
    pub captcha_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub captcha_token: Option<String>,
}

/// 注册或登录成功后的会话
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub tokens: TokenPair,
}

pub struct AuthServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub password_policy: Arc<dyn PasswordPolicy>,
    pub token_service: Arc<dyn TokenService>,
    pub token_blacklist: Arc<dyn TokenBlacklist>,
    pub captcha: CaptchaGate,
    pub clock: Arc<dyn Clock>,
}

pub struct AuthService {
    deps: AuthServiceDependencies,
}

impl AuthService {
    pub fn new(deps: AuthServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, ApplicationError> {
        self.deps
            .captcha
            .check(request.captcha_token.as_deref())
            .await?;

        let username = Username::parse(request.username)?;
        let email = UserEmail::parse(request.email)?;
        let name = request.name.trim().to_owned();
        if name.is_empty() {
            return Err(domain::DomainError::invalid_argument("name", "cannot be empty").into());
        }
        if request.password != request.confirm_password {
            return Err(ApplicationError::PasswordMismatch);
        }
        self.deps
            .password_policy
            .check(&request.password, username.as_str(), email.as_str())
            .map_err(|reasons| ApplicationError::WeakPassword { reasons })?;

        let users = &self.deps.user_repository;
        if users.find_by_username(&username).await?.is_some() {
            return Err(domain::DomainError::UsernameTaken.into());
        }
        if users.find_by_email(&email).await?.is_some() {
            return Err(domain::DomainError::EmailTaken.into());
        }

        let password = self.deps.password_hasher.hash(&request.password).await?;
        let user = User::register(
            UserId::generate(),
            username,
            email,
            Some(name),
            request.bio.unwrap_or_default(),
            password,
            self.deps.clock.now(),
        );
        let user = users.create(user).await?;
        let tokens = self.deps.token_service.issue_pair(user.id)?;

        info!(user_id = %user.id, username = %user.username.as_str(), "user registered");
        Ok(AuthSession { user, tokens })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession, ApplicationError> {
        self.deps
            .captcha
            .check(request.captcha_token.as_deref())
            .await?;

        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(domain::DomainError::invalid_argument(
                "credentials",
                "both email and password are required",
            )
            .into());
        }

        // 格式非法的邮箱不可能对应任何账号
        let email = UserEmail::parse(request.email).map_err(|_| ApplicationError::UnknownEmail)?;
        let user = self
            .deps
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or(ApplicationError::UnknownEmail)?;

        if !self
            .deps
            .password_hasher
            .verify(&request.password, &user.password)
            .await?
        {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(ApplicationError::WrongPassword);
        }
        if !user.is_active() {
            warn!(user_id = %user.id, status = %user.status, "login rejected: account disabled");
            return Err(ApplicationError::AccountDisabled);
        }

        let tokens = self.deps.token_service.issue_pair(user.id)?;
        info!(user_id = %user.id, "user logged in");
        Ok(AuthSession { user, tokens })
    }

    /// 拉黑刷新令牌直到其自然过期。
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApplicationError> {
        let claims = self
            .deps
            .token_service
            .decode(refresh_token, TokenKind::Refresh)
            .map_err(reject_token)?;

        let inserted = self
            .deps
            .token_blacklist
            .insert(claims.jti, claims.expires_at)
            .await?;
        if !inserted {
            return Err(ApplicationError::TokenRejected(
                "token is blacklisted".to_owned(),
            ));
        }

        info!(user_id = %claims.user_id, "refresh token revoked");
        Ok(())
    }

    /// 用刷新令牌换取新的访问令牌。
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ApplicationError> {
        let claims = self
            .deps
            .token_service
            .decode(refresh_token, TokenKind::Refresh)
            .map_err(unauthenticated)?;

        if self.deps.token_blacklist.contains(claims.jti).await? {
            return Err(ApplicationError::unauthenticated("token is blacklisted"));
        }

        let user = self
            .deps
            .user_repository
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| ApplicationError::unauthenticated("user not found"))?;
        if !user.is_active() {
            return Err(ApplicationError::unauthenticated("user is inactive"));
        }

        Ok(self.deps.token_service.issue_access(user.id)?)
    }

    /// 解析访问令牌并加载对应的用户。
    pub async fn authenticate(&self, access_token: &str) -> Result<User, ApplicationError> {
        let claims = self
            .deps
            .token_service
            .decode(access_token, TokenKind::Access)
            .map_err(unauthenticated)?;

        let user = self
            .deps
            .user_repository
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| ApplicationError::unauthenticated("user not found"))?;
        if !user.is_active() {
            return Err(ApplicationError::AccountDisabled);
        }
        Ok(user)
    }
}

fn reject_token(err: TokenError) -> ApplicationError {
    match err {
        TokenError::Invalid(_) | TokenError::Expired => {
            ApplicationError::TokenRejected(err.to_string())
        }
        other => ApplicationError::Token(other),
    }
}

fn unauthenticated(err: TokenError) -> ApplicationError {
    match err {
        TokenError::Invalid(_) | TokenError::Expired => {
            ApplicationError::unauthenticated(err.to_string())
        }
        other => ApplicationError::Token(other),
    }
}
