use std::sync::Arc;

use domain::{DomainError, ProfileChanges, User, UserEmail, UserId, Username};
use tracing::info;

use crate::{
    clock::Clock,
    error::ApplicationError,
    repository::{PageRequest, UserRepository},
};

/// 个人资料的部分更新请求，字段缺省表示不修改
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    /// 已上传到外部存储的头像引用
    pub avatar: Option<String>,
}

pub struct UserServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct UserService {
    deps: UserServiceDependencies,
}

impl UserService {
    pub fn new(deps: UserServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn list_users(&self, page: PageRequest) -> Result<Vec<User>, ApplicationError> {
        Ok(self.deps.user_repository.list(page).await?)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, ApplicationError> {
        self.deps
            .user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound.into())
    }

    pub async fn update_profile(
        &self,
        actor_id: UserId,
        request: UpdateProfileRequest,
    ) -> Result<User, ApplicationError> {
        let users = &self.deps.user_repository;
        let mut user = users
            .find_by_id(actor_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        let username = request.username.map(Username::parse).transpose()?;
        let email = request.email.map(UserEmail::parse).transpose()?;

        if let Some(username) = &username {
            if let Some(existing) = users.find_by_username(username).await? {
                if existing.id != user.id {
                    return Err(DomainError::UsernameTaken.into());
                }
            }
        }
        if let Some(email) = &email {
            if let Some(existing) = users.find_by_email(email).await? {
                if existing.id != user.id {
                    return Err(DomainError::EmailTaken.into());
                }
            }
        }

        let changes = ProfileChanges {
            username,
            email,
            name: request.name.map(|name| name.trim().to_owned()),
            bio: request.bio,
            avatar: request.avatar.filter(|avatar| !avatar.trim().is_empty()),
        };
        user.update_profile(changes, self.deps.clock.now());
        let user = users.update(user).await?;

        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }
}
