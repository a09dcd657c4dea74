use crate::value_objects::{Timestamp, TopicId, TopicName};

/// 话题标签。首次被房间引用时隐式创建，之后不会被删除。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub name: TopicName,
    pub created_at: Timestamp,
}

impl Topic {
    pub fn new(id: TopicId, name: TopicName, created_at: Timestamp) -> Self {
        Self {
            id,
            name,
            created_at,
        }
    }
}
