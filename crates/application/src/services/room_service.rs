use std::sync::Arc;

use domain::{
    can_delete_message, can_modify_room, DomainError, Message, MessageBody, MessageId,
    RepositoryError, Room, RoomId, TopicName, User, UserId,
};
use tracing::info;

use crate::{
    clock::Clock,
    error::ApplicationError,
    repository::{MessageRepository, PageRequest, RoomRepository, UserRepository},
    services::topic_service::TopicService,
};

#[derive(Debug, Clone)]
pub struct CreateRoomRequest {
    pub host_id: UserId,
    pub name: String,
    pub description: Option<String>,
    /// 话题名，不存在时自动创建
    pub topic: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateRoomRequest {
    pub room_id: RoomId,
    pub actor_id: UserId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostMessageRequest {
    pub room_id: RoomId,
    pub author_id: UserId,
    pub body: String,
}

pub struct RoomServiceDependencies {
    pub room_repository: Arc<dyn RoomRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub topics: Arc<TopicService>,
    pub clock: Arc<dyn Clock>,
}

/// 自习室和消息的增删改查，带房主 / 作者权限检查
pub struct RoomService {
    deps: RoomServiceDependencies,
}

impl RoomService {
    pub fn new(deps: RoomServiceDependencies) -> Self {
        Self { deps }
    }

    async fn load_actor(&self, id: UserId) -> Result<User, ApplicationError> {
        self.deps
            .user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::unauthenticated("user not found"))
    }

    async fn load_room(&self, id: RoomId) -> Result<Room, ApplicationError> {
        self.deps
            .room_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::RoomNotFound.into())
    }

    async fn load_message(&self, id: MessageId) -> Result<Message, ApplicationError> {
        self.deps
            .message_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::MessageNotFound.into())
    }

    pub async fn list_rooms(&self, page: PageRequest) -> Result<Vec<Room>, ApplicationError> {
        Ok(self.deps.room_repository.list(page).await?)
    }

    pub async fn get_room(&self, id: RoomId) -> Result<Room, ApplicationError> {
        self.load_room(id).await
    }

    /// 所有校验在写入话题之前完成，非法请求不会留下孤立话题。
    pub async fn create_room(&self, request: CreateRoomRequest) -> Result<Room, ApplicationError> {
        let host = self.load_actor(request.host_id).await?;
        let topic_name = match request.topic.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => TopicName::parse(name)?,
            _ => return Err(DomainError::invalid_argument("topic", "topic is required").into()),
        };
        let name = Room::validate_name(request.name)?;

        let topic = self.deps.topics.resolve(topic_name).await?;
        let room = Room::new(
            RoomId::generate(),
            host.id,
            topic.id,
            name,
            request.description,
            self.deps.clock.now(),
        )?;
        let room = self.deps.room_repository.create(room).await?;

        info!(room_id = %room.id, host_id = %host.id, topic = %topic.name.as_str(), "room created");
        Ok(room)
    }

    pub async fn update_room(&self, request: UpdateRoomRequest) -> Result<Room, ApplicationError> {
        let mut room = self.load_room(request.room_id).await?;
        let actor = self.load_actor(request.actor_id).await?;
        if !can_modify_room(&actor, &room) {
            return Err(DomainError::NotRoomHost.into());
        }

        let topic_name = request.topic.map(TopicName::parse).transpose()?;
        let name = request.name.map(Room::validate_name).transpose()?;

        let now = self.deps.clock.now();
        if let Some(topic_name) = topic_name {
            let topic = self.deps.topics.resolve(topic_name).await?;
            room.retopic(topic.id, now);
        }
        if let Some(name) = name {
            room.rename(name, now)?;
        }
        if let Some(description) = request.description {
            room.describe(Some(description), now);
        }

        let room = self.deps.room_repository.update(room).await?;
        info!(room_id = %room.id, "room updated");
        Ok(room)
    }

    /// 删除房间，连带删除其全部消息。话题保留。
    pub async fn delete_room(&self, actor_id: UserId, room_id: RoomId) -> Result<(), ApplicationError> {
        let room = self.load_room(room_id).await?;
        let actor = self.load_actor(actor_id).await?;
        if !can_modify_room(&actor, &room) {
            return Err(DomainError::NotRoomHost.into());
        }

        self.deps.room_repository.delete(room.id).await?;
        info!(room_id = %room.id, host_id = %actor.id, "room deleted");
        Ok(())
    }

    /// 发消息的同时把作者登记为参与者。写入时房间已被删除同样返回房间不存在。
    pub async fn post_message(&self, request: PostMessageRequest) -> Result<Message, ApplicationError> {
        let room = self.load_room(request.room_id).await?;
        let author = self.load_actor(request.author_id).await?;
        let body = MessageBody::new(request.body)?;

        let message = Message::new(
            MessageId::generate(),
            room.id,
            author.id,
            body,
            self.deps.clock.now(),
        );
        let message = self
            .deps
            .message_repository
            .create_with_participant(message)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => ApplicationError::from(DomainError::RoomNotFound),
                other => other.into(),
            })?;

        info!(message_id = %message.id, room_id = %room.id, user_id = %author.id, "message posted");
        Ok(message)
    }

    pub async fn list_messages(&self, page: PageRequest) -> Result<Vec<Message>, ApplicationError> {
        Ok(self.deps.message_repository.list(page).await?)
    }

    pub async fn list_room_messages(
        &self,
        room_id: RoomId,
        page: PageRequest,
    ) -> Result<Vec<Message>, ApplicationError> {
        let room = self.load_room(room_id).await?;
        Ok(self
            .deps
            .message_repository
            .list_for_room(room.id, page)
            .await?)
    }

    pub async fn get_message(&self, id: MessageId) -> Result<Message, ApplicationError> {
        self.load_message(id).await
    }

    pub async fn delete_message(
        &self,
        actor_id: UserId,
        message_id: MessageId,
    ) -> Result<(), ApplicationError> {
        let message = self.load_message(message_id).await?;
        let actor = self.load_actor(actor_id).await?;
        if !can_delete_message(&actor, &message) {
            return Err(DomainError::NotMessageAuthor.into());
        }

        self.deps.message_repository.delete(message.id).await?;
        info!(message_id = %message.id, user_id = %actor.id, "message deleted");
        Ok(())
    }
}
