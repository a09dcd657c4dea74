use crate::errors::DomainError;
use crate::value_objects::{RoomId, Timestamp, TopicId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Room {
    pub id: RoomId,
    /// 房主，创建后不可变更
    pub host_id: UserId,
    pub topic_id: TopicId,
    pub name: String,
    pub description: Option<String>,
    /// 参与者集合，按加入顺序保存，只增不减
    pub participants: Vec<UserId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Room {
    pub const MAX_NAME_LEN: usize = 200;

    pub fn new(
        id: RoomId,
        host_id: UserId,
        topic_id: TopicId,
        name: impl Into<String>,
        description: Option<String>,
        created_at: Timestamp,
    ) -> Result<Self, DomainError> {
        let name = Self::validate_name(name.into())?;
        Ok(Self {
            id,
            host_id,
            topic_id,
            name,
            description: normalize_description(description),
            participants: Vec::new(),
            created_at,
            updated_at: created_at,
        })
    }

    pub fn rename(&mut self, name: impl Into<String>, now: Timestamp) -> Result<(), DomainError> {
        self.name = Self::validate_name(name.into())?;
        self.updated_at = now;
        Ok(())
    }

    pub fn describe(&mut self, description: Option<String>, now: Timestamp) {
        self.description = normalize_description(description);
        self.updated_at = now;
    }

    pub fn retopic(&mut self, topic_id: TopicId, now: Timestamp) {
        self.topic_id = topic_id;
        self.updated_at = now;
    }

    /// 幂等加入。返回 `true` 表示本次新增了参与者。
    pub fn add_participant(&mut self, user_id: UserId) -> bool {
        if self.has_participant(user_id) {
            return false;
        }
        self.participants.push(user_id);
        true
    }

    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.participants.contains(&user_id)
    }

    pub fn validate_name(name: String) -> Result<String, DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_argument("name", "cannot be empty"));
        }
        if trimmed.chars().count() > Self::MAX_NAME_LEN {
            return Err(DomainError::invalid_argument("name", "too long"));
        }
        Ok(trimmed.to_owned())
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|text| !text.trim().is_empty())
}
