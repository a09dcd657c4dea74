//! 内存实现的仓储和测试替身
//!
//! 与 PostgreSQL 实现保持相同的约束语义：用户名 / 邮箱 / 话题名唯一，
//! 删除房间级联删除消息，发消息与登记参与者在同一把写锁内完成。

use std::sync::Arc;

use async_trait::async_trait;
use domain::{
    Message, MessageId, PasswordHash, RepositoryError, Room, RoomId, Timestamp, Topic, TopicId,
    TopicName, User, UserEmail, UserId, Username,
};
use time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    password::{PasswordHasher, PasswordHasherError},
    repository::{MessageRepository, PageRequest, RoomRepository, TopicRepository, UserRepository},
    token::{TokenClaims, TokenError, TokenKind, TokenPair, TokenService},
};

#[derive(Default)]
struct State {
    users: Vec<User>,
    topics: Vec<Topic>,
    rooms: Vec<Room>,
    messages: Vec<Message>,
}

impl State {
    fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    fn topic(&self, id: TopicId) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.id == id)
    }

    fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    fn check_user_unique(&self, candidate: &User) -> Result<(), RepositoryError> {
        for other in self.users.iter().filter(|user| user.id != candidate.id) {
            if other.username == candidate.username {
                return Err(RepositoryError::conflict("username"));
            }
            if other.email == candidate.email {
                return Err(RepositoryError::conflict("email"));
            }
        }
        Ok(())
    }
}

/// 四类仓储共享同一份状态，便于跨表的搜索和级联删除。
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (Timestamp, Timestamp)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let mut state = self.state.write().await;
        if state.user(user.id).is_some() {
            return Err(RepositoryError::conflict("id"));
        }
        state.check_user_unique(&user)?;
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let mut state = self.state.write().await;
        state.check_user_unique(&user)?;
        let slot = state
            .users
            .iter_mut()
            .find(|existing| existing.id == user.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.state.read().await.user(id).cloned())
    }

    async fn find_by_email(&self, email: &UserEmail) -> Result<Option<User>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|user| &user.email == email).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|user| &user.username == username)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, RepositoryError> {
        let state = self.state.read().await;
        let mut users = state.users.clone();
        users.sort_by(|a, b| a.username.as_str().cmp(b.username.as_str()));
        Ok(paginate(users, page))
    }
}

#[async_trait]
impl TopicRepository for InMemoryStore {
    async fn create(&self, topic: Topic) -> Result<Topic, RepositoryError> {
        let mut state = self.state.write().await;
        if state.topics.iter().any(|existing| existing.name == topic.name) {
            return Err(RepositoryError::conflict("topic"));
        }
        state.topics.push(topic.clone());
        Ok(topic)
    }

    async fn find_by_name(&self, name: &TopicName) -> Result<Option<Topic>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.topics.iter().find(|topic| &topic.name == name).cloned())
    }

    async fn find_by_ids(&self, ids: &[TopicId]) -> Result<Vec<Topic>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .topics
            .iter()
            .filter(|topic| ids.contains(&topic.id))
            .cloned()
            .collect())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Topic>, RepositoryError> {
        let state = self.state.read().await;
        let mut topics = state.topics.clone();
        topics.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        Ok(paginate(topics, page))
    }

    async fn search(&self, query: &str) -> Result<Vec<Topic>, RepositoryError> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;
        let mut topics: Vec<Topic> = state
            .topics
            .iter()
            .filter(|topic| contains(topic.name.as_str(), &needle))
            .cloned()
            .collect();
        topics.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        Ok(topics)
    }
}

#[async_trait]
impl RoomRepository for InMemoryStore {
    async fn create(&self, room: Room) -> Result<Room, RepositoryError> {
        let mut state = self.state.write().await;
        if state.user(room.host_id).is_none() || state.topic(room.topic_id).is_none() {
            return Err(RepositoryError::storage("foreign key violation on rooms"));
        }
        state.rooms.push(room.clone());
        Ok(room)
    }

    async fn update(&self, room: Room) -> Result<Room, RepositoryError> {
        let mut state = self.state.write().await;
        if state.topic(room.topic_id).is_none() {
            return Err(RepositoryError::storage("foreign key violation on rooms"));
        }
        let slot = state
            .rooms
            .iter_mut()
            .find(|existing| existing.id == room.id)
            .ok_or(RepositoryError::NotFound)?;
        slot.name = room.name;
        slot.description = room.description;
        slot.topic_id = room.topic_id;
        slot.updated_at = room.updated_at;
        Ok(slot.clone())
    }

    async fn delete(&self, id: RoomId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let before = state.rooms.len();
        state.rooms.retain(|room| room.id != id);
        if state.rooms.len() == before {
            return Err(RepositoryError::NotFound);
        }
        state.messages.retain(|message| message.room_id != id);
        Ok(())
    }

    async fn find_by_id(&self, id: RoomId) -> Result<Option<Room>, RepositoryError> {
        Ok(self.state.read().await.room(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[RoomId]) -> Result<Vec<Room>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .rooms
            .iter()
            .filter(|room| ids.contains(&room.id))
            .cloned()
            .collect())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Room>, RepositoryError> {
        let state = self.state.read().await;
        let mut rooms = state.rooms.clone();
        newest_first(&mut rooms, |room| (room.updated_at, room.created_at));
        Ok(paginate(rooms, page))
    }

    async fn search(&self, query: &str) -> Result<Vec<Room>, RepositoryError> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;
        let mut rooms: Vec<Room> = state
            .rooms
            .iter()
            .filter(|room| {
                contains(&room.name, &needle)
                    || room
                        .description
                        .as_deref()
                        .is_some_and(|text| contains(text, &needle))
                    || state
                        .topic(room.topic_id)
                        .is_some_and(|topic| contains(topic.name.as_str(), &needle))
                    || state
                        .user(room.host_id)
                        .is_some_and(|host| contains(host.username.as_str(), &needle))
            })
            .cloned()
            .collect();
        newest_first(&mut rooms, |room| (room.updated_at, room.created_at));
        Ok(rooms)
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn create_with_participant(&self, message: Message) -> Result<Message, RepositoryError> {
        let mut state = self.state.write().await;
        if state.user(message.user_id).is_none() {
            return Err(RepositoryError::storage("foreign key violation on messages"));
        }
        let room = state
            .rooms
            .iter_mut()
            .find(|room| room.id == message.room_id)
            .ok_or(RepositoryError::NotFound)?;
        room.add_participant(message.user_id);
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.messages.iter().find(|message| message.id == id).cloned())
    }

    async fn delete(&self, id: MessageId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let before = state.messages.len();
        state.messages.retain(|message| message.id != id);
        if state.messages.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Message>, RepositoryError> {
        let state = self.state.read().await;
        let mut messages = state.messages.clone();
        newest_first(&mut messages, |message| (message.updated_at, message.created_at));
        Ok(paginate(messages, page))
    }

    async fn list_for_room(
        &self,
        room_id: RoomId,
        page: PageRequest,
    ) -> Result<Vec<Message>, RepositoryError> {
        let state = self.state.read().await;
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|message| message.room_id == room_id)
            .cloned()
            .collect();
        newest_first(&mut messages, |message| (message.updated_at, message.created_at));
        Ok(paginate(messages, page))
    }

    async fn search(&self, query: &str) -> Result<Vec<Message>, RepositoryError> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|message| {
                contains(message.body.as_str(), &needle)
                    || state
                        .room(message.room_id)
                        .is_some_and(|room| contains(&room.name, &needle))
                    || state
                        .user(message.user_id)
                        .is_some_and(|author| contains(author.username.as_str(), &needle))
            })
            .cloned()
            .collect();
        newest_first(&mut messages, |message| (message.updated_at, message.created_at));
        Ok(messages)
    }
}

/// 不做任何哈希的密码处理器，只用于测试。
#[derive(Debug, Default)]
pub struct PlainPasswordHasher;

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError> {
        PasswordHash::new(format!("plain${plaintext}"))
            .map_err(|err| PasswordHasherError::hash_error(err.to_string()))
    }

    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        Ok(hashed.as_str() == format!("plain${plaintext}"))
    }
}

/// 可读的假令牌：`kind.user_id.jti.expires_unix`，不签名。
#[derive(Debug, Clone)]
pub struct FakeTokenService {
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl Default for FakeTokenService {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(5),
            refresh_ttl: Duration::days(1),
        }
    }
}

impl FakeTokenService {
    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    fn encode(&self, user_id: UserId, kind: TokenKind) -> String {
        let expires = Timestamp::now_utc() + self.ttl(kind);
        format!(
            "{}.{}.{}.{}",
            kind.as_str(),
            user_id,
            Uuid::new_v4(),
            expires.unix_timestamp()
        )
    }
}

impl TokenService for FakeTokenService {
    fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.encode(user_id, TokenKind::Access),
            refresh: self.encode(user_id, TokenKind::Refresh),
        })
    }

    fn issue_access(&self, user_id: UserId) -> Result<String, TokenError> {
        Ok(self.encode(user_id, TokenKind::Access))
    }

    fn decode(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, TokenError> {
        let invalid = || TokenError::Invalid("malformed token".to_owned());
        let mut parts = token.split('.');
        let (Some(kind), Some(user), Some(jti), Some(expires), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(invalid());
        };

        if kind != expected.as_str() {
            return Err(TokenError::Invalid("token has wrong type".to_owned()));
        }
        let user_id = Uuid::parse_str(user).map_err(|_| invalid())?;
        let jti = Uuid::parse_str(jti).map_err(|_| invalid())?;
        let expires = expires.parse::<i64>().map_err(|_| invalid())?;
        let expires_at = Timestamp::from_unix_timestamp(expires).map_err(|_| invalid())?;
        if expires_at <= Timestamp::now_utc() {
            return Err(TokenError::Expired);
        }

        Ok(TokenClaims {
            user_id: UserId::from(user_id),
            jti,
            kind: expected,
            issued_at: expires_at - self.ttl(expected),
            expires_at,
        })
    }
}
