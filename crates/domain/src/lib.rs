//! 自习室系统核心领域模型
//!
//! 包含用户、话题、自习室、消息等实体，以及所有权判断和错误定义。

pub mod access;
pub mod errors;
pub mod message;
pub mod room;
pub mod topic;
pub mod user;
pub mod value_objects;

pub use access::{can_delete_message, can_modify_room};
pub use errors::{DomainError, RepositoryError};
pub use message::Message;
pub use room::Room;
pub use topic::Topic;
pub use user::{ProfileChanges, User, UserStatus};
pub use value_objects::{
    MessageBody, MessageId, PasswordHash, RoomId, Timestamp, TopicId, TopicName, UserEmail,
    UserId, Username,
};
