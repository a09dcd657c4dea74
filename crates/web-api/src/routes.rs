use axum::{
    extract::{FromRequest, FromRequestParts, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use application::{
    dto::{AccessTokenDto, AuthSessionDto, MessageDto, RoomDto, SearchResultsDto, TopicDto, UserDto},
    services::{
        AuthSession, CreateRoomRequest, LoginRequest, PostMessageRequest, RegisterRequest,
        UpdateProfileRequest, UpdateRoomRequest,
    },
    PageRequest,
};
use domain::{MessageId, RoomId, UserId};

use crate::{
    auth::{AuthUser, ListingAccess},
    error::ApiError,
    state::AppState,
};

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
struct ApiJson<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
struct ApiPath<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
struct ApiQuery<T>(T);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegisterPayload {
    username: String,
    email: String,
    name: String,
    bio: Option<String>,
    password1: String,
    password2: String,
    recaptcha_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginPayload {
    email: String,
    password: String,
    recaptcha_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RefreshPayload {
    refresh: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateProfilePayload {
    username: Option<String>,
    email: Option<String>,
    name: Option<String>,
    bio: Option<String>,
    avatar: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateRoomPayload {
    name: String,
    description: Option<String>,
    topic: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateRoomPayload {
    name: Option<String>,
    description: Option<String>,
    topic: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MessagePayload {
    body: String,
}

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        PageRequest::new(query.limit, query.offset)
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

const ROUTES: &[&str] = &[
    "GET /api",
    "GET /api/topics",
    "GET /api/search?q=",
    "POST /api/rooms/create",
    "GET /api/rooms",
    "GET /api/rooms/:id",
    "PUT /api/rooms/:id",
    "DELETE /api/rooms/:id",
    "GET /api/rooms/:id/messages",
    "POST /api/rooms/:id/messages",
    "GET /api/messages",
    "GET /api/messages/:id",
    "DELETE /api/messages/:id",
    "GET /api/users",
    "GET /api/users/:id",
    "PUT /api/users/update",
    "POST /api/token/refresh",
    "POST /api/register",
    "POST /api/login",
    "POST /api/logout",
];

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api", get(route_index))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/token/refresh", post(refresh_token))
        .route("/api/users", get(list_users))
        .route("/api/users/update", put(update_profile))
        .route("/api/users/{id}", get(get_user))
        .route("/api/topics", get(list_topics))
        .route("/api/search", get(search))
        .route("/api/rooms", get(list_rooms))
        .route("/api/rooms/create", post(create_room))
        .route(
            "/api/rooms/{id}",
            get(get_room).put(update_room).delete(delete_room),
        )
        .route(
            "/api/rooms/{id}/messages",
            get(list_room_messages).post(create_message),
        )
        .route("/api/messages", get(list_messages))
        .route("/api/messages/{id}", get(get_message).delete(delete_message))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn route_index() -> Json<&'static [&'static str]> {
    Json(ROUTES)
}

fn session_dto(state: &AppState, session: AuthSession) -> AuthSessionDto {
    AuthSessionDto {
        user: state.presenter.user(&session.user),
        refresh: session.tokens.refresh,
        access: session.tokens.access,
    }
}

async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterPayload>,
) -> Result<(StatusCode, Json<AuthSessionDto>), ApiError> {
    let session = state
        .auth_service
        .register(RegisterRequest {
            username: payload.username,
            email: payload.email,
            name: payload.name,
            bio: payload.bio,
            password: payload.password1,
            confirm_password: payload.password2,
            captcha_token: payload.recaptcha_token,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(session_dto(&state, session))))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> Result<Json<AuthSessionDto>, ApiError> {
    let session = state
        .auth_service
        .login(LoginRequest {
            email: payload.email,
            password: payload.password,
            captcha_token: payload.recaptcha_token,
        })
        .await?;

    Ok(Json(session_dto(&state, session)))
}

async fn logout(
    State(state): State<AppState>,
    _caller: AuthUser,
    ApiJson(payload): ApiJson<RefreshPayload>,
) -> Result<StatusCode, ApiError> {
    state.auth_service.logout(&payload.refresh).await?;
    Ok(StatusCode::RESET_CONTENT)
}

async fn refresh_token(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshPayload>,
) -> Result<Json<AccessTokenDto>, ApiError> {
    let access = state.auth_service.refresh(&payload.refresh).await?;
    Ok(Json(AccessTokenDto { access }))
}

async fn list_users(
    State(state): State<AppState>,
    _access: ListingAccess,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.user_service.list_users(page.into()).await?;
    Ok(Json(state.presenter.users(&users)))
}

async fn get_user(
    State(state): State<AppState>,
    _access: ListingAccess,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state.user_service.get_user(UserId::from(id)).await?;
    Ok(Json(state.presenter.user(&user)))
}

async fn update_profile(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ApiJson(payload): ApiJson<UpdateProfilePayload>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state
        .user_service
        .update_profile(
            caller.id,
            UpdateProfileRequest {
                username: payload.username,
                email: payload.email,
                name: payload.name,
                bio: payload.bio,
                avatar: payload.avatar,
            },
        )
        .await?;

    Ok(Json(state.presenter.user(&user)))
}

async fn list_topics(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<Json<Vec<TopicDto>>, ApiError> {
    let topics = state.topic_service.list_topics(page.into()).await?;
    Ok(Json(state.presenter.topics(&topics)))
}

async fn search(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<SearchResultsDto>, ApiError> {
    let results = state.search_service.search(&query.q).await?;
    Ok(Json(state.presenter.search_results(&results).await?))
}

async fn list_rooms(
    State(state): State<AppState>,
    _access: ListingAccess,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<Json<Vec<RoomDto>>, ApiError> {
    let rooms = state.room_service.list_rooms(page.into()).await?;
    Ok(Json(state.presenter.rooms(&rooms).await?))
}

async fn get_room(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<RoomDto>, ApiError> {
    let room = state.room_service.get_room(RoomId::from(id)).await?;
    Ok(Json(state.presenter.room(&room).await?))
}

async fn create_room(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ApiJson(payload): ApiJson<CreateRoomPayload>,
) -> Result<(StatusCode, Json<RoomDto>), ApiError> {
    let room = state
        .room_service
        .create_room(CreateRoomRequest {
            host_id: caller.id,
            name: payload.name,
            description: payload.description,
            topic: payload.topic,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(state.presenter.room(&room).await?)))
}

async fn update_room(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateRoomPayload>,
) -> Result<Json<RoomDto>, ApiError> {
    let room = state
        .room_service
        .update_room(UpdateRoomRequest {
            room_id: RoomId::from(id),
            actor_id: caller.id,
            name: payload.name,
            description: payload.description,
            topic: payload.topic,
        })
        .await?;

    Ok(Json(state.presenter.room(&room).await?))
}

async fn delete_room(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .room_service
        .delete_room(caller.id, RoomId::from(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_room_messages(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let messages = state
        .room_service
        .list_room_messages(RoomId::from(id), page.into())
        .await?;
    Ok(Json(state.presenter.messages(&messages).await?))
}

async fn create_message(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<MessagePayload>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let message = state
        .room_service
        .post_message(PostMessageRequest {
            room_id: RoomId::from(id),
            author_id: caller.id,
            body: payload.body,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(state.presenter.message(&message).await?)))
}

async fn list_messages(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let messages = state.room_service.list_messages(page.into()).await?;
    Ok(Json(state.presenter.messages(&messages).await?))
}

async fn get_message(
    State(state): State<AppState>,
    _caller: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageDto>, ApiError> {
    let message = state.room_service.get_message(MessageId::from(id)).await?;
    Ok(Json(state.presenter.message(&message).await?))
}

async fn delete_message(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .room_service
        .delete_message(caller.id, MessageId::from(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
