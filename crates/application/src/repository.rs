use async_trait::async_trait;
use domain::{
    Message, MessageId, RepositoryError, Room, RoomId, Topic, TopicId, TopicName, User, UserEmail,
    UserId, Username,
};

/// 列表分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u32 = 100;
    pub const MAX_LIMIT: u32 = 500;

    /// 缺省 100 条，上限 500 条。
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT);
        Self {
            limit,
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User, RepositoryError>;
    async fn update(&self, user: User) -> Result<User, RepositoryError>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &UserEmail) -> Result<Option<User>, RepositoryError>;
    async fn find_by_username(&self, username: &Username)
        -> Result<Option<User>, RepositoryError>;
    /// 批量读取，返回顺序不保证，缺失的 id 直接忽略
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError>;
    async fn list(&self, page: PageRequest) -> Result<Vec<User>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// 名称重复时返回 `RepositoryError::Conflict { field: "topic" }`
    async fn create(&self, topic: Topic) -> Result<Topic, RepositoryError>;
    async fn find_by_name(&self, name: &TopicName) -> Result<Option<Topic>, RepositoryError>;
    async fn find_by_ids(&self, ids: &[TopicId]) -> Result<Vec<Topic>, RepositoryError>;
    /// 按名称排序
    async fn list(&self, page: PageRequest) -> Result<Vec<Topic>, RepositoryError>;
    async fn search(&self, query: &str) -> Result<Vec<Topic>, RepositoryError>;
}

/// 房间仓储。读取时 `participants` 一并加载。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create(&self, room: Room) -> Result<Room, RepositoryError>;
    /// 只更新名称、描述、话题和更新时间
    async fn update(&self, room: Room) -> Result<Room, RepositoryError>;
    /// 级联删除房间的消息和参与者记录
    async fn delete(&self, id: RoomId) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: RoomId) -> Result<Option<Room>, RepositoryError>;
    async fn find_by_ids(&self, ids: &[RoomId]) -> Result<Vec<Room>, RepositoryError>;
    /// 最近更新的在前
    async fn list(&self, page: PageRequest) -> Result<Vec<Room>, RepositoryError>;
    /// 按房间名、描述、话题名或房主用户名做不区分大小写的子串匹配
    async fn search(&self, query: &str) -> Result<Vec<Room>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 在同一事务内写入消息并把作者加入房间参与者
    async fn create_with_participant(&self, message: Message) -> Result<Message, RepositoryError>;
    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError>;
    async fn delete(&self, id: MessageId) -> Result<(), RepositoryError>;
    /// 最近更新的在前
    async fn list(&self, page: PageRequest) -> Result<Vec<Message>, RepositoryError>;
    async fn list_for_room(
        &self,
        room_id: RoomId,
        page: PageRequest,
    ) -> Result<Vec<Message>, RepositoryError>;
    /// 按正文、所属房间名或作者用户名匹配
    async fn search(&self, query: &str) -> Result<Vec<Message>, RepositoryError>;
}
