use crate::value_objects::{MessageBody, MessageId, RoomId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    /// 作者
    pub user_id: UserId,
    pub body: MessageBody,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Message {
    /// 展示用的简短形式所保留的字符数
    pub const SUMMARY_CHARS: usize = 50;

    pub fn new(
        id: MessageId,
        room_id: RoomId,
        user_id: UserId,
        body: MessageBody,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            room_id,
            user_id,
            body,
            created_at,
            updated_at: created_at,
        }
    }

    /// 正文前 50 个字符。
    pub fn summary(&self) -> &str {
        let body = self.body.as_str();
        match body.char_indices().nth(Self::SUMMARY_CHARS) {
            Some((cut, _)) => &body[..cut],
            None => body,
        }
    }
}
