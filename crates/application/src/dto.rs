use domain::{Room, Timestamp, Topic, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::avatar::AvatarUrlPolicy;

/// 对外公开的用户信息，不包含密码和状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub bio: String,
    /// 已按头像策略渲染的地址
    pub avatar: Option<String>,
}

impl UserDto {
    pub fn render(user: &User, avatars: &AvatarUrlPolicy) -> Self {
        Self {
            id: Uuid::from(user.id),
            username: user.username.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            name: user.name.clone(),
            bio: user.bio.clone(),
            avatar: avatars.render(user.avatar.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicDto {
    pub id: Uuid,
    pub name: String,
}

impl From<&Topic> for TopicDto {
    fn from(topic: &Topic) -> Self {
        Self {
            id: Uuid::from(topic.id),
            name: topic.name.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub host: UserDto,
    pub topic: TopicDto,
    pub participants: Vec<UserDto>,
    #[serde(with = "time::serde::rfc3339")]
    pub created: Timestamp,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: Timestamp,
}

/// 消息中嵌入的房间摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRefDto {
    pub id: Uuid,
    pub name: String,
}

impl From<&Room> for RoomRefDto {
    fn from(room: &Room) -> Self {
        Self {
            id: Uuid::from(room.id),
            name: room.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub body: String,
    pub user: UserDto,
    pub room: RoomRefDto,
    #[serde(with = "time::serde::rfc3339")]
    pub created: Timestamp,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultsDto {
    pub rooms: Vec<RoomDto>,
    pub topics: Vec<TopicDto>,
    pub messages: Vec<MessageDto>,
}

/// 注册和登录成功后的返回体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSessionDto {
    pub user: UserDto,
    pub refresh: String,
    pub access: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenDto {
    pub access: String,
}
