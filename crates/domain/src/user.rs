use std::{fmt, str::FromStr};

use crate::errors::DomainError;
use crate::value_objects::{PasswordHash, Timestamp, UserEmail, UserId, Username};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "suspended" => Ok(UserStatus::Suspended),
            other => Err(DomainError::invalid_argument(
                "status",
                format!("unknown user status `{other}`"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: UserEmail,
    pub name: Option<String>,
    pub bio: String,
    /// 头像在外部存储中的引用（路径或完整 URL）
    pub avatar: Option<String>,
    #[serde(skip_serializing)] // 密码字段不暴露给客户端
    pub password: PasswordHash,
    pub status: UserStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// 个人资料的部分更新，`None` 表示保持原值。
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<Username>,
    pub email: Option<UserEmail>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl User {
    pub fn register(
        id: UserId,
        username: Username,
        email: UserEmail,
        name: Option<String>,
        bio: String,
        password: PasswordHash,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            username,
            email,
            name,
            bio,
            avatar: None,
            password,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn deactivate(&mut self, now: Timestamp) {
        self.status = UserStatus::Inactive;
        self.updated_at = now;
    }

    pub fn activate(&mut self, now: Timestamp) {
        self.status = UserStatus::Active;
        self.updated_at = now;
    }

    /// 应用资料变更。新头像引用直接替换旧引用，旧文件不做清理。
    pub fn update_profile(&mut self, changes: ProfileChanges, now: Timestamp) {
        if let Some(username) = changes.username {
            self.username = username;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(name) = changes.name {
            self.name = Some(name);
        }
        if let Some(bio) = changes.bio {
            self.bio = bio;
        }
        if let Some(avatar) = changes.avatar {
            self.avatar = Some(avatar);
        }
        self.updated_at = now;
    }

    pub fn set_password(&mut self, password: PasswordHash, now: Timestamp) {
        self.password = password;
        self.updated_at = now;
    }
}
