use std::sync::Arc;

use domain::{Message, Room, Topic};

use crate::{
    error::ApplicationError,
    repository::{MessageRepository, RoomRepository, TopicRepository},
};

#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub rooms: Vec<Room>,
    pub topics: Vec<Topic>,
    pub messages: Vec<Message>,
}

pub struct SearchServiceDependencies {
    pub room_repository: Arc<dyn RoomRepository>,
    pub topic_repository: Arc<dyn TopicRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
}

pub struct SearchService {
    deps: SearchServiceDependencies,
}

impl SearchService {
    pub fn new(deps: SearchServiceDependencies) -> Self {
        Self { deps }
    }

    /// 不区分大小写的子串搜索，查询串原样使用。空查询匹配全部记录。
    pub async fn search(&self, query: &str) -> Result<SearchResults, ApplicationError> {
        let (rooms, topics, messages) = tokio::try_join!(
            self.deps.room_repository.search(query),
            self.deps.topic_repository.search(query),
            self.deps.message_repository.search(query),
        )?;
        Ok(SearchResults {
            rooms,
            topics,
            messages,
        })
    }
}
