use std::{collections::HashMap, sync::Arc};

use application::repository::{
    MessageRepository, PageRequest, RoomRepository, TopicRepository, UserRepository,
};
use async_trait::async_trait;
use domain::{
    Message, MessageBody, MessageId, PasswordHash, RepositoryError, Room, RoomId, Topic, TopicId,
    TopicName, User, UserEmail, UserId, UserStatus, Username,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use time::OffsetDateTime;
use tracing::error;
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// 唯一约束冲突映射为带字段名的 `Conflict`，其余错误统一视为存储故障。
fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let field = match db.constraint() {
                Some("users_username_key") => "username",
                Some("users_email_key") => "email",
                Some("topics_name_key") => "topic",
                Some(other) => other,
                None => "unknown",
            };
            return RepositoryError::conflict(field);
        }
    }
    error!(error = %err, "database operation failed");
    RepositoryError::storage(err.to_string())
}

fn violates_foreign_key(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db)
            if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
                && db.constraint() == Some(constraint)
    )
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

/// `ILIKE` 子串模式，转义通配符
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn uuids<T: Copy + Into<Uuid>>(ids: &[T]) -> Vec<Uuid> {
    ids.iter().map(|id| (*id).into()).collect()
}

#[derive(Debug, FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    name: Option<String>,
    bio: String,
    avatar: Option<String>,
    password_hash: String,
    status: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<UserRecord> for User {
    type Error = RepositoryError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        let username =
            Username::parse(value.username).map_err(|err| invalid_data(err.to_string()))?;
        let email = UserEmail::parse(value.email).map_err(|err| invalid_data(err.to_string()))?;
        let password =
            PasswordHash::new(value.password_hash).map_err(|err| invalid_data(err.to_string()))?;
        let status: UserStatus = value
            .status
            .parse()
            .map_err(|err: domain::DomainError| invalid_data(err.to_string()))?;

        Ok(User {
            id: UserId::from(value.id),
            username,
            email,
            name: value.name,
            bio: value.bio,
            avatar: value.avatar,
            password,
            status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, username, email, name, bio, avatar, password_hash, status, created_at, updated_at";

#[derive(Debug, FromRow)]
struct TopicRecord {
    id: Uuid,
    name: String,
    created_at: OffsetDateTime,
}

impl TryFrom<TopicRecord> for Topic {
    type Error = RepositoryError;

    fn try_from(value: TopicRecord) -> Result<Self, Self::Error> {
        let name = TopicName::parse(value.name).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Topic::new(TopicId::from(value.id), name, value.created_at))
    }
}

#[derive(Debug, FromRow)]
struct RoomRecord {
    id: Uuid,
    host_id: Uuid,
    topic_id: Uuid,
    name: String,
    description: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl RoomRecord {
    fn into_room(self, participants: Vec<UserId>) -> Room {
        Room {
            id: RoomId::from(self.id),
            host_id: UserId::from(self.host_id),
            topic_id: TopicId::from(self.topic_id),
            name: self.name,
            description: self.description,
            participants,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const ROOM_COLUMNS: &str = "id, host_id, topic_id, name, description, created_at, updated_at";

#[derive(Debug, FromRow)]
struct ParticipantRecord {
    room_id: Uuid,
    user_id: Uuid,
}

#[derive(Debug, FromRow)]
struct MessageRecord {
    id: Uuid,
    room_id: Uuid,
    user_id: Uuid,
    body: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<MessageRecord> for Message {
    type Error = RepositoryError;

    fn try_from(value: MessageRecord) -> Result<Self, Self::Error> {
        let body = MessageBody::new(value.body).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Message {
            id: MessageId::from(value.id),
            room_id: RoomId::from(value.room_id),
            user_id: UserId::from(value.user_id),
            body,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

const MESSAGE_COLUMNS: &str = "id, room_id, user_id, body, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        value: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause} = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        record.map(User::try_from).transpose()
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::from(user.id))
            .bind(user.username.as_str())
            .bind(user.email.as_str())
            .bind(user.name.as_deref())
            .bind(&user.bio)
            .bind(user.avatar.as_deref())
            .bind(user.password.as_str())
            .bind(user.status.as_str())
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        User::try_from(record)
    }

    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE users SET username = $2, email = $3, name = $4, bio = $5, avatar = $6, \
             password_hash = $7, status = $8, updated_at = $9 WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::from(user.id))
            .bind(user.username.as_str())
            .bind(user.email.as_str())
            .bind(user.name.as_deref())
            .bind(&user.bio)
            .bind(user.avatar.as_deref())
            .bind(user.password.as_str())
            .bind(user.status.as_str())
            .bind(user.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .ok_or(RepositoryError::NotFound)?;

        User::try_from(record)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        record.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &UserEmail) -> Result<Option<User>, RepositoryError> {
        self.fetch_one_where("email", email.as_str()).await
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        self.fetch_one_where("username", username.as_str()).await
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        let records = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(uuids(ids))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        records.into_iter().map(User::try_from).collect()
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username LIMIT $1 OFFSET $2");
        let records = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        records.into_iter().map(User::try_from).collect()
    }
}

#[derive(Clone)]
pub struct PgTopicRepository {
    pool: PgPool,
}

impl PgTopicRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TopicRepository for PgTopicRepository {
    async fn create(&self, topic: Topic) -> Result<Topic, RepositoryError> {
        let record = sqlx::query_as::<_, TopicRecord>(
            r#"
            INSERT INTO topics (id, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::from(topic.id))
        .bind(topic.name.as_str())
        .bind(topic.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Topic::try_from(record)
    }

    async fn find_by_name(&self, name: &TopicName) -> Result<Option<Topic>, RepositoryError> {
        let record = sqlx::query_as::<_, TopicRecord>(
            r#"SELECT id, name, created_at FROM topics WHERE name = $1"#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        record.map(Topic::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[TopicId]) -> Result<Vec<Topic>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let records = sqlx::query_as::<_, TopicRecord>(
            r#"SELECT id, name, created_at FROM topics WHERE id = ANY($1)"#,
        )
        .bind(uuids(ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        records.into_iter().map(Topic::try_from).collect()
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Topic>, RepositoryError> {
        let records = sqlx::query_as::<_, TopicRecord>(
            r#"SELECT id, name, created_at FROM topics ORDER BY name LIMIT $1 OFFSET $2"#,
        )
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        records.into_iter().map(Topic::try_from).collect()
    }

    async fn search(&self, query: &str) -> Result<Vec<Topic>, RepositoryError> {
        let records = sqlx::query_as::<_, TopicRecord>(
            r#"SELECT id, name, created_at FROM topics WHERE name ILIKE $1 ORDER BY name"#,
        )
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        records.into_iter().map(Topic::try_from).collect()
    }
}

#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 为一批房间加载参与者，按加入顺序排列。
    async fn attach_participants(
        &self,
        records: Vec<RoomRecord>,
    ) -> Result<Vec<Room>, RepositoryError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let room_ids: Vec<Uuid> = records.iter().map(|record| record.id).collect();
        let rows = sqlx::query_as::<_, ParticipantRecord>(
            r#"
            SELECT room_id, user_id FROM room_participants
            WHERE room_id = ANY($1)
            ORDER BY joined_at, user_id
            "#,
        )
        .bind(&room_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let mut participants: HashMap<Uuid, Vec<UserId>> = HashMap::new();
        for row in rows {
            participants
                .entry(row.room_id)
                .or_default()
                .push(UserId::from(row.user_id));
        }

        Ok(records
            .into_iter()
            .map(|record| {
                let members = participants.remove(&record.id).unwrap_or_default();
                record.into_room(members)
            })
            .collect())
    }

    async fn fetch_rooms(&self, sql: &str, pattern: &str) -> Result<Vec<Room>, RepositoryError> {
        let records = sqlx::query_as::<_, RoomRecord>(sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        self.attach_participants(records).await
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn create(&self, room: Room) -> Result<Room, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let sql = format!(
            "INSERT INTO rooms ({ROOM_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ROOM_COLUMNS}"
        );
        let record = sqlx::query_as::<_, RoomRecord>(&sql)
            .bind(Uuid::from(room.id))
            .bind(Uuid::from(room.host_id))
            .bind(Uuid::from(room.topic_id))
            .bind(&room.name)
            .bind(room.description.as_deref())
            .bind(room.created_at)
            .bind(room.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        for participant in &room.participants {
            sqlx::query(
                r#"
                INSERT INTO room_participants (room_id, user_id, joined_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (room_id, user_id) DO NOTHING
                "#,
            )
            .bind(record.id)
            .bind(Uuid::from(*participant))
            .bind(room.created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(record.into_room(room.participants))
    }

    async fn update(&self, room: Room) -> Result<Room, RepositoryError> {
        let sql = format!(
            "UPDATE rooms SET name = $2, description = $3, topic_id = $4, updated_at = $5 \
             WHERE id = $1 RETURNING {ROOM_COLUMNS}"
        );
        let record = sqlx::query_as::<_, RoomRecord>(&sql)
            .bind(Uuid::from(room.id))
            .bind(&room.name)
            .bind(room.description.as_deref())
            .bind(Uuid::from(room.topic_id))
            .bind(room.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .ok_or(RepositoryError::NotFound)?;

        let mut rooms = self.attach_participants(vec![record]).await?;
        rooms.pop().ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: RoomId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM rooms WHERE id = $1"#)
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: RoomId) -> Result<Option<Room>, RepositoryError> {
        let sql = format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1");
        let record = sqlx::query_as::<_, RoomRecord>(&sql)
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        match record {
            Some(record) => Ok(self.attach_participants(vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: &[RoomId]) -> Result<Vec<Room>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ANY($1)");
        let records = sqlx::query_as::<_, RoomRecord>(&sql)
            .bind(uuids(ids))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        self.attach_participants(records).await
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Room>, RepositoryError> {
        let sql = format!(
            "SELECT {ROOM_COLUMNS} FROM rooms ORDER BY updated_at DESC, created_at DESC \
             LIMIT $1 OFFSET $2"
        );
        let records = sqlx::query_as::<_, RoomRecord>(&sql)
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        self.attach_participants(records).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Room>, RepositoryError> {
        self.fetch_rooms(
            r#"
            SELECT r.id, r.host_id, r.topic_id, r.name, r.description, r.created_at, r.updated_at
            FROM rooms r
            JOIN topics t ON t.id = r.topic_id
            JOIN users u ON u.id = r.host_id
            WHERE r.name ILIKE $1
               OR r.description ILIKE $1
               OR t.name ILIKE $1
               OR u.username ILIKE $1
            ORDER BY r.updated_at DESC, r.created_at DESC
            "#,
            &like_pattern(query),
        )
        .await
    }
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    /// 房间在写入前被删除时返回 `NotFound`
    async fn create_with_participant(&self, message: Message) -> Result<Message, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let sql = format!(
            "INSERT INTO messages ({MESSAGE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {MESSAGE_COLUMNS}"
        );
        let record = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(Uuid::from(message.id))
            .bind(Uuid::from(message.room_id))
            .bind(Uuid::from(message.user_id))
            .bind(message.body.as_str())
            .bind(message.created_at)
            .bind(message.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| {
                if violates_foreign_key(&err, "messages_room_id_fkey") {
                    RepositoryError::NotFound
                } else {
                    map_sqlx_err(err)
                }
            })?;

        sqlx::query(
            r#"
            INSERT INTO room_participants (room_id, user_id, joined_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (room_id, user_id) DO NOTHING
            "#,
        )
        .bind(record.room_id)
        .bind(record.user_id)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;
        Message::try_from(record)
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1");
        let record = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        record.map(Message::try_from).transpose()
    }

    async fn delete(&self, id: MessageId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM messages WHERE id = $1"#)
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Message>, RepositoryError> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY updated_at DESC, created_at DESC \
             LIMIT $1 OFFSET $2"
        );
        let records = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        records.into_iter().map(Message::try_from).collect()
    }

    async fn list_for_room(
        &self,
        room_id: RoomId,
        page: PageRequest,
    ) -> Result<Vec<Message>, RepositoryError> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE room_id = $1 \
             ORDER BY updated_at DESC, created_at DESC LIMIT $2 OFFSET $3"
        );
        let records = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(Uuid::from(room_id))
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        records.into_iter().map(Message::try_from).collect()
    }

    async fn search(&self, query: &str) -> Result<Vec<Message>, RepositoryError> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT m.id, m.room_id, m.user_id, m.body, m.created_at, m.updated_at
            FROM messages m
            JOIN rooms r ON r.id = m.room_id
            JOIN users u ON u.id = m.user_id
            WHERE m.body ILIKE $1
               OR r.name ILIKE $1
               OR u.username ILIKE $1
            ORDER BY m.updated_at DESC, m.created_at DESC
            "#,
        )
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        records.into_iter().map(Message::try_from).collect()
    }
}

#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
    pub user_repository: Arc<PgUserRepository>,
    pub topic_repository: Arc<PgTopicRepository>,
    pub room_repository: Arc<PgRoomRepository>,
    pub message_repository: Arc<PgMessageRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            user_repository: Arc::new(PgUserRepository::new(pool.clone())),
            topic_repository: Arc::new(PgTopicRepository::new(pool.clone())),
            room_repository: Arc::new(PgRoomRepository::new(pool.clone())),
            message_repository: Arc::new(PgMessageRepository::new(pool.clone())),
            pool,
        }
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
