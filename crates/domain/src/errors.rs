//! 领域模型错误定义
//!
//! `DomainError` 描述业务规则层面的失败，`RepositoryError` 描述存储层的失败。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 字段缺失或格式错误
    #[error("invalid argument {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("this username is already taken")]
    UsernameTaken,

    #[error("this email is already registered")]
    EmailTaken,

    #[error("topic name already exists")]
    TopicNameTaken,

    #[error("user not found")]
    UserNotFound,

    #[error("room not found")]
    RoomNotFound,

    #[error("message not found")]
    MessageNotFound,

    #[error("topic not found")]
    TopicNotFound,

    /// 只有房主可以修改或删除房间
    #[error("you are not the host of this room")]
    NotRoomHost,

    /// 只有作者可以删除自己的消息
    #[error("you can only delete your own messages")]
    NotMessageAuthor,
}

impl DomainError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 存储层错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    /// 唯一约束冲突，`field` 为冲突的列
    #[error("unique constraint violated on {field}")]
    Conflict { field: String },

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn conflict(field: impl Into<String>) -> Self {
        Self::Conflict {
            field: field.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
