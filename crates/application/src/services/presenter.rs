use std::{collections::HashMap, sync::Arc};

use domain::{Message, RepositoryError, Room, RoomId, Topic, TopicId, User, UserId};
use tracing::warn;

use crate::{
    avatar::AvatarUrlPolicy,
    dto::{MessageDto, RoomDto, RoomRefDto, SearchResultsDto, TopicDto, UserDto},
    error::ApplicationError,
    repository::{RoomRepository, TopicRepository, UserRepository},
    services::search_service::SearchResults,
};

pub struct PresenterDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub topic_repository: Arc<dyn TopicRepository>,
    pub room_repository: Arc<dyn RoomRepository>,
    pub avatars: AvatarUrlPolicy,
}

/// 把领域实体组装成嵌套的响应结构。
///
/// 关联实体按批次一次性读取，避免逐条查询。列表中关联已被并发删除的条目直接跳过，
/// 单个实体的渲染则要求关联完整。
pub struct Presenter {
    deps: PresenterDependencies,
}

impl Presenter {
    pub fn new(deps: PresenterDependencies) -> Self {
        Self { deps }
    }

    pub fn user(&self, user: &User) -> UserDto {
        UserDto::render(user, &self.deps.avatars)
    }

    pub fn users(&self, users: &[User]) -> Vec<UserDto> {
        users.iter().map(|user| self.user(user)).collect()
    }

    pub fn topics(&self, topics: &[Topic]) -> Vec<TopicDto> {
        topics.iter().map(TopicDto::from).collect()
    }

    pub async fn room(&self, room: &Room) -> Result<RoomDto, ApplicationError> {
        let mut rooms = self.rooms(std::slice::from_ref(room)).await?;
        rooms
            .pop()
            .ok_or_else(|| dangling("room", room.id.to_string()))
    }

    pub async fn rooms(&self, rooms: &[Room]) -> Result<Vec<RoomDto>, ApplicationError> {
        let user_ids: Vec<UserId> = rooms
            .iter()
            .flat_map(|room| std::iter::once(room.host_id).chain(room.participants.iter().copied()))
            .collect();
        let topic_ids: Vec<TopicId> = rooms.iter().map(|room| room.topic_id).collect();

        let users = self.user_map(&user_ids).await?;
        let topics: HashMap<TopicId, Topic> = self
            .deps
            .topic_repository
            .find_by_ids(&dedup(topic_ids))
            .await?
            .into_iter()
            .map(|topic| (topic.id, topic))
            .collect();

        Ok(rooms
            .iter()
            .filter_map(|room| {
                let (Some(host), Some(topic)) = (users.get(&room.host_id), topics.get(&room.topic_id))
                else {
                    warn!(room_id = %room.id, "skipping room with missing host or topic");
                    return None;
                };
                let participants = room
                    .participants
                    .iter()
                    .filter_map(|id| users.get(id))
                    .map(|user| self.user(user))
                    .collect();

                Some(RoomDto {
                    id: room.id.into(),
                    name: room.name.clone(),
                    description: room.description.clone(),
                    host: self.user(host),
                    topic: TopicDto::from(topic),
                    participants,
                    created: room.created_at,
                    updated: room.updated_at,
                })
            })
            .collect())
    }

    pub async fn message(&self, message: &Message) -> Result<MessageDto, ApplicationError> {
        let mut messages = self.messages(std::slice::from_ref(message)).await?;
        messages
            .pop()
            .ok_or_else(|| dangling("message", message.id.to_string()))
    }

    pub async fn messages(&self, messages: &[Message]) -> Result<Vec<MessageDto>, ApplicationError> {
        let user_ids: Vec<UserId> = messages.iter().map(|message| message.user_id).collect();
        let room_ids: Vec<RoomId> = messages.iter().map(|message| message.room_id).collect();

        let users = self.user_map(&user_ids).await?;
        let rooms: HashMap<RoomId, Room> = self
            .deps
            .room_repository
            .find_by_ids(&dedup(room_ids))
            .await?
            .into_iter()
            .map(|room| (room.id, room))
            .collect();

        Ok(messages
            .iter()
            .filter_map(|message| {
                let (Some(author), Some(room)) =
                    (users.get(&message.user_id), rooms.get(&message.room_id))
                else {
                    warn!(message_id = %message.id, "skipping message with missing author or room");
                    return None;
                };

                Some(MessageDto {
                    id: message.id.into(),
                    body: message.body.as_str().to_owned(),
                    user: self.user(author),
                    room: RoomRefDto::from(room),
                    created: message.created_at,
                    updated: message.updated_at,
                })
            })
            .collect())
    }

    pub async fn search_results(
        &self,
        results: &SearchResults,
    ) -> Result<SearchResultsDto, ApplicationError> {
        Ok(SearchResultsDto {
            rooms: self.rooms(&results.rooms).await?,
            topics: self.topics(&results.topics),
            messages: self.messages(&results.messages).await?,
        })
    }

    async fn user_map(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>, ApplicationError> {
        let ids = dedup(ids.to_vec());
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .deps
            .user_repository
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect())
    }
}

fn dedup<T: Ord>(mut ids: Vec<T>) -> Vec<T> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn dangling(kind: &str, id: String) -> ApplicationError {
    ApplicationError::Repository(RepositoryError::storage(format!(
        "dangling reference to {kind} {id}"
    )))
}
