use std::sync::Arc;

use domain::{DomainError, RepositoryError, Topic, TopicId, TopicName};
use tracing::{info, warn};

use crate::{
    clock::Clock,
    error::ApplicationError,
    repository::{PageRequest, TopicRepository},
};

pub struct TopicServiceDependencies {
    pub topic_repository: Arc<dyn TopicRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct TopicService {
    deps: TopicServiceDependencies,
}

impl TopicService {
    pub fn new(deps: TopicServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn list_topics(&self, page: PageRequest) -> Result<Vec<Topic>, ApplicationError> {
        Ok(self.deps.topic_repository.list(page).await?)
    }

    /// 按名称查找话题，不存在时创建。
    pub async fn resolve_topic(&self, name: &str) -> Result<Topic, ApplicationError> {
        let name = TopicName::parse(name)?;
        self.resolve(name).await
    }

    pub(crate) async fn resolve(&self, name: TopicName) -> Result<Topic, ApplicationError> {
        let topics = &self.deps.topic_repository;
        if let Some(topic) = topics.find_by_name(&name).await? {
            return Ok(topic);
        }

        let topic = Topic::new(TopicId::generate(), name.clone(), self.deps.clock.now());
        match topics.create(topic).await {
            Ok(topic) => {
                info!(topic_id = %topic.id, name = %topic.name.as_str(), "topic created");
                Ok(topic)
            }
            // 并发创建同名话题，读取胜出的那一行
            Err(RepositoryError::Conflict { .. }) => {
                warn!(name = %name.as_str(), "topic created concurrently, reusing existing row");
                topics
                    .find_by_name(&name)
                    .await?
                    .ok_or_else(|| DomainError::TopicNotFound.into())
            }
            Err(err) => Err(err.into()),
        }
    }
}
