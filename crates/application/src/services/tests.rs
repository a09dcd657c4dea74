//! 应用层服务测试
//!
//! 基于内存仓储驱动完整的注册、建房、发消息、搜索流程。

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use domain::{
    DomainError, MessageId, RepositoryError, Room, RoomId, Timestamp, Topic, TopicId, TopicName,
    User, UserId, UserStatus,
};

use crate::{
    avatar::AvatarUrlPolicy,
    captcha::CaptchaGate,
    clock::{Clock, ManualClock},
    error::ApplicationError,
    memory::{FakeTokenService, InMemoryStore, PlainPasswordHasher},
    password::DefaultPasswordPolicy,
    repository::{
        MockMessageRepository, MockRoomRepository, MockTopicRepository, PageRequest,
        UserRepository,
    },
    services::*,
    token::InMemoryTokenBlacklist,
};

const PASSWORD: &str = "study-hard-42";

struct Harness {
    store: InMemoryStore,
    auth: AuthService,
    users: UserService,
    topics: Arc<TopicService>,
    rooms: RoomService,
    search: SearchService,
    presenter: Presenter,
}

fn harness() -> Harness {
    let store = InMemoryStore::new();
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::starting_at(Timestamp::now_utc()));

    let auth = AuthService::new(AuthServiceDependencies {
        user_repository: Arc::new(store.clone()),
        password_hasher: Arc::new(PlainPasswordHasher),
        password_policy: Arc::new(DefaultPasswordPolicy::default()),
        token_service: Arc::new(FakeTokenService::default()),
        token_blacklist: Arc::new(InMemoryTokenBlacklist::new()),
        captcha: CaptchaGate::disabled(),
        clock: clock.clone(),
    });
    let users = UserService::new(UserServiceDependencies {
        user_repository: Arc::new(store.clone()),
        clock: clock.clone(),
    });
    let topics = Arc::new(TopicService::new(TopicServiceDependencies {
        topic_repository: Arc::new(store.clone()),
        clock: clock.clone(),
    }));
    let rooms = RoomService::new(RoomServiceDependencies {
        room_repository: Arc::new(store.clone()),
        message_repository: Arc::new(store.clone()),
        user_repository: Arc::new(store.clone()),
        topics: topics.clone(),
        clock,
    });
    let search = SearchService::new(SearchServiceDependencies {
        room_repository: Arc::new(store.clone()),
        topic_repository: Arc::new(store.clone()),
        message_repository: Arc::new(store.clone()),
    });
    let presenter = Presenter::new(PresenterDependencies {
        user_repository: Arc::new(store.clone()),
        topic_repository: Arc::new(store.clone()),
        room_repository: Arc::new(store.clone()),
        avatars: AvatarUrlPolicy::default(),
    });

    Harness {
        store,
        auth,
        users,
        topics,
        rooms,
        search,
        presenter,
    }
}

fn register_request(username: &str, email: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_owned(),
        email: email.to_owned(),
        name: format!("{username} name"),
        bio: None,
        password: PASSWORD.to_owned(),
        confirm_password: PASSWORD.to_owned(),
        captcha_token: None,
    }
}

impl Harness {
    async fn register(&self, username: &str) -> AuthSession {
        self.auth
            .register(register_request(username, &format!("{username}@example.com")))
            .await
            .unwrap()
    }

    async fn room(&self, host: &User, name: &str, topic: &str) -> domain::Room {
        self.rooms
            .create_room(CreateRoomRequest {
                host_id: host.id,
                name: name.to_owned(),
                description: None,
                topic: Some(topic.to_owned()),
            })
            .await
            .unwrap()
    }

    async fn post(&self, author: &User, room: &domain::Room, body: &str) -> domain::Message {
        self.rooms
            .post_message(PostMessageRequest {
                room_id: room.id,
                author_id: author.id,
                body: body.to_owned(),
            })
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_register_normalizes_email_and_issues_tokens() {
    let h = harness();
    let session = h
        .auth
        .register(register_request("alice", "Alice@Example.COM"))
        .await
        .unwrap();

    assert_eq!(session.user.email.as_str(), "alice@example.com");
    assert_eq!(session.user.status, UserStatus::Active);
    assert_ne!(session.tokens.access, session.tokens.refresh);

    let authenticated = h.auth.authenticate(&session.tokens.access).await.unwrap();
    assert_eq!(authenticated.id, session.user.id);
}

#[tokio::test]
async fn test_register_reports_taken_fields() {
    let h = harness();
    h.register("alice").await;

    let err = h
        .auth
        .register(register_request("alice", "other@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::UsernameTaken)));

    let err = h
        .auth
        .register(register_request("bob", "ALICE@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::EmailTaken)));
}

#[tokio::test]
async fn test_register_validates_passwords_before_writing() {
    let h = harness();

    let mut request = register_request("carol", "carol@example.com");
    request.confirm_password = "something-else-1".to_owned();
    let err = h.auth.register(request).await.unwrap_err();
    assert!(matches!(err, ApplicationError::PasswordMismatch));

    let mut request = register_request("carol", "carol@example.com");
    request.password = "1234".to_owned();
    request.confirm_password = "1234".to_owned();
    let err = h.auth.register(request).await.unwrap_err();
    assert!(matches!(err, ApplicationError::WeakPassword { ref reasons } if reasons.len() >= 2));

    let users: Arc<dyn UserRepository> = Arc::new(h.store.clone());
    assert!(users.list(PageRequest::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_distinguishes_failures() {
    let h = harness();
    h.register("dave").await;

    let login = |email: &str, password: &str| LoginRequest {
        email: email.to_owned(),
        password: password.to_owned(),
        captcha_token: None,
    };

    let err = h.auth.login(login("nobody@example.com", PASSWORD)).await.unwrap_err();
    assert!(matches!(err, ApplicationError::UnknownEmail));

    let err = h.auth.login(login("dave@example.com", "wrong-pass-9")).await.unwrap_err();
    assert!(matches!(err, ApplicationError::WrongPassword));

    let err = h.auth.login(login("", "")).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::InvalidArgument { .. })));

    let session = h.auth.login(login("DAVE@example.com", PASSWORD)).await.unwrap();
    assert_eq!(session.user.username.as_str(), "dave");
}

#[tokio::test]
async fn test_login_rejects_disabled_account() {
    let h = harness();
    let session = h.register("erin").await;

    let users: Arc<dyn UserRepository> = Arc::new(h.store.clone());
    let mut user = session.user;
    user.deactivate(Timestamp::now_utc());
    users.update(user).await.unwrap();

    let err = h
        .auth
        .login(LoginRequest {
            email: "erin@example.com".to_owned(),
            password: PASSWORD.to_owned(),
            captcha_token: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::AccountDisabled));

    let err = h.auth.refresh(&session.tokens.refresh).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Unauthenticated(_)));
}

#[tokio::test]
async fn test_logout_blacklists_refresh_token_once() {
    let h = harness();
    let session = h.register("frank").await;

    let access = h.auth.refresh(&session.tokens.refresh).await.unwrap();
    assert!(h.auth.authenticate(&access).await.is_ok());

    h.auth.logout(&session.tokens.refresh).await.unwrap();

    let err = h.auth.logout(&session.tokens.refresh).await.unwrap_err();
    assert!(matches!(err, ApplicationError::TokenRejected(_)));

    let err = h.auth.refresh(&session.tokens.refresh).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Unauthenticated(_)));
}

#[tokio::test]
async fn test_token_types_are_not_interchangeable() {
    let h = harness();
    let session = h.register("grace").await;

    let err = h.auth.refresh(&session.tokens.access).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Unauthenticated(_)));

    let err = h.auth.authenticate(&session.tokens.refresh).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Unauthenticated(_)));

    let err = h.auth.logout("garbage").await.unwrap_err();
    assert!(matches!(err, ApplicationError::TokenRejected(_)));
}

#[tokio::test]
async fn test_create_room_reuses_existing_topic() {
    let h = harness();
    let host = h.register("host").await.user;

    let first = h.room(&host, "Python Study Group", "Programming").await;
    let second = h.room(&host, "Rust Study Group", "  Programming ").await;

    assert_eq!(first.topic_id, second.topic_id);
    let topics = h.topics.list_topics(PageRequest::default()).await.unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].name.as_str(), "Programming");
}

#[tokio::test]
async fn test_create_room_validates_before_creating_topic() {
    let h = harness();
    let host = h.register("host").await.user;

    let err = h
        .rooms
        .create_room(CreateRoomRequest {
            host_id: host.id,
            name: "Room".to_owned(),
            description: None,
            topic: Some("   ".to_owned()),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidArgument { ref field, .. }) if field == "topic"
    ));

    let err = h
        .rooms
        .create_room(CreateRoomRequest {
            host_id: host.id,
            name: "  ".to_owned(),
            description: None,
            topic: Some("Orphan".to_owned()),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidArgument { ref field, .. }) if field == "name"
    ));

    assert!(h.topics.list_topics(PageRequest::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_only_host_updates_and_deletes_room() {
    let h = harness();
    let host = h.register("host").await.user;
    let other = h.register("other").await.user;
    let room = h.room(&host, "Original", "T1").await;

    let update = |actor_id| UpdateRoomRequest {
        room_id: room.id,
        actor_id,
        name: Some("Renamed".to_owned()),
        description: Some("new description".to_owned()),
        topic: Some("T2".to_owned()),
    };

    let err = h.rooms.update_room(update(other.id)).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::NotRoomHost)));
    let err = h.rooms.delete_room(other.id, room.id).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::NotRoomHost)));

    let updated = h.rooms.update_room(update(host.id)).await.unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.description.as_deref(), Some("new description"));
    assert_ne!(updated.topic_id, room.topic_id);
    assert!(updated.updated_at > room.updated_at);
}

#[tokio::test]
async fn test_post_message_enrolls_author_once() {
    let h = harness();
    let host = h.register("host").await.user;
    let guest = h.register("guest").await.user;
    let room = h.room(&host, "Room1", "T1").await;

    h.post(&guest, &room, "hello").await;
    h.post(&guest, &room, "hello again").await;

    let room = h.rooms.get_room(room.id).await.unwrap();
    assert_eq!(room.participants, vec![guest.id]);

    let err = h
        .rooms
        .post_message(PostMessageRequest {
            room_id: domain::RoomId::generate(),
            author_id: guest.id,
            body: "hi".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::RoomNotFound)));
}

#[tokio::test]
async fn test_delete_room_cascades_messages_but_keeps_topic() {
    let h = harness();
    let host = h.register("host").await.user;
    let room = h.room(&host, "Doomed", "Survivor").await;
    let message = h.post(&host, &room, "bye").await;

    h.rooms.delete_room(host.id, room.id).await.unwrap();

    let err = h.rooms.get_message(message.id).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::MessageNotFound)));
    let err = h.rooms.get_room(room.id).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::RoomNotFound)));
    assert_eq!(h.topics.list_topics(PageRequest::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_only_author_deletes_message() {
    let h = harness();
    let host = h.register("host").await.user;
    let author = h.register("author").await.user;
    let room = h.room(&host, "Room", "T").await;
    let message = h.post(&author, &room, "mine").await;

    let err = h.rooms.delete_message(host.id, message.id).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::NotMessageAuthor)));

    h.rooms.delete_message(author.id, message.id).await.unwrap();
    assert!(h.rooms.list_messages(PageRequest::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listings_are_newest_first() {
    let h = harness();
    let host = h.register("host").await.user;
    let older = h.room(&host, "Older", "T").await;
    let newer = h.room(&host, "Newer", "T").await;

    let rooms = h.rooms.list_rooms(PageRequest::default()).await.unwrap();
    assert_eq!(rooms.iter().map(|r| r.id).collect::<Vec<_>>(), vec![newer.id, older.id]);

    h.rooms
        .update_room(UpdateRoomRequest {
            room_id: older.id,
            actor_id: host.id,
            name: None,
            description: Some("touched".to_owned()),
            topic: None,
        })
        .await
        .unwrap();
    let rooms = h.rooms.list_rooms(PageRequest::new(Some(1), None)).await.unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, older.id);
}

#[tokio::test]
async fn test_search_spans_rooms_topics_and_messages() {
    let h = harness();
    let host = h.register("host").await.user;
    let room = h.room(&host, "Python Study Group", "Programming").await;
    let message = h.post(&host, &room, "Hi Python fans").await;

    let results = h.search.search("python").await.unwrap();
    assert_eq!(results.rooms.len(), 1);
    assert_eq!(results.rooms[0].id, room.id);
    assert!(results.topics.is_empty());
    assert_eq!(results.messages.len(), 1);
    assert_eq!(results.messages[0].id, message.id);

    let results = h.search.search("programming").await.unwrap();
    assert_eq!(results.rooms.len(), 1);
    assert_eq!(results.topics.len(), 1);

    let results = h.search.search("no such thing").await.unwrap();
    assert!(results.rooms.is_empty() && results.topics.is_empty() && results.messages.is_empty());

    let results = h.search.search("").await.unwrap();
    assert_eq!(results.rooms.len(), 1);
    assert_eq!(results.topics.len(), 1);
    assert_eq!(results.messages.len(), 1);
}

#[tokio::test]
async fn test_update_profile_is_partial_and_checks_uniqueness() {
    let h = harness();
    let alice = h.register("alice").await.user;
    h.register("bob").await;

    let err = h
        .users
        .update_profile(
            alice.id,
            UpdateProfileRequest {
                username: Some("bob".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::UsernameTaken)));

    let updated = h
        .users
        .update_profile(
            alice.id,
            UpdateProfileRequest {
                bio: Some("likes rust".to_owned()),
                avatar: Some("avatars/alice.png".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.username.as_str(), "alice");
    assert_eq!(updated.bio, "likes rust");
    assert_eq!(updated.avatar.as_deref(), Some("avatars/alice.png"));

    let err = h.users.get_user(domain::UserId::generate()).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::UserNotFound)));
}

#[tokio::test]
async fn test_presenter_nests_related_entities() {
    let h = harness();
    let host = h.register("host").await.user;
    let guest = h.register("guest").await.user;
    let room = h.room(&host, "Room1", "T1").await;
    let message = h.post(&guest, &room, "hello").await;

    let room = h.rooms.get_room(room.id).await.unwrap();
    let dto = h.presenter.room(&room).await.unwrap();
    assert_eq!(dto.host.username, "host");
    assert_eq!(dto.topic.name, "T1");
    assert_eq!(dto.participants.len(), 1);
    assert_eq!(dto.participants[0].username, "guest");

    let dto = h.presenter.message(&message).await.unwrap();
    assert_eq!(dto.user.username, "guest");
    assert_eq!(dto.room.name, "Room1");

    let json = serde_json::to_value(&dto).unwrap();
    assert!(json["created"].as_str().is_some());
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let h = harness();
    let a = h.register("user_a").await.user;
    let room = h.room(&a, "Room1", "T1").await;
    h.post(&a, &room, "hello").await;

    let room = h.rooms.get_room(room.id).await.unwrap();
    assert!(room.has_participant(a.id));
    assert_eq!(h.rooms.list_messages(PageRequest::default()).await.unwrap().len(), 1);
    let topics = h.topics.list_topics(PageRequest::default()).await.unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].name.as_str(), "T1");
}

#[tokio::test]
async fn test_resolve_topic_recovers_from_concurrent_create() {
    let winner = Topic::new(
        TopicId::generate(),
        TopicName::parse("Race").unwrap(),
        Timestamp::now_utc(),
    );
    let expected = winner.clone();
    let lookups = Arc::new(AtomicUsize::new(0));

    let mut repository = MockTopicRepository::new();
    let counter = lookups.clone();
    repository.expect_find_by_name().returning(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(None)
        } else {
            Ok(Some(winner.clone()))
        }
    });
    repository
        .expect_create()
        .times(1)
        .returning(|_| Err(RepositoryError::conflict("topic")));

    let service = TopicService::new(TopicServiceDependencies {
        topic_repository: Arc::new(repository),
        clock: Arc::new(ManualClock::starting_at(Timestamp::now_utc())),
    });

    let topic = service.resolve_topic("Race").await.unwrap();
    assert_eq!(topic, expected);
    assert_eq!(lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrent_topic_resolution_creates_one_row() {
    let h = harness();

    let attempts = (0..16).map(|_| h.topics.resolve_topic("Concurrency"));
    let resolved = futures::future::join_all(attempts).await;

    let ids: Vec<TopicId> = resolved.into_iter().map(|topic| topic.unwrap().id).collect();
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(h.topics.list_topics(PageRequest::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_post_message_rejects_blank_body() {
    let h = harness();
    let host = h.register("host").await.user;
    let guest = h.register("guest").await.user;
    let room = h.room(&host, "Room", "T").await;

    let err = h
        .rooms
        .post_message(PostMessageRequest {
            room_id: room.id,
            author_id: guest.id,
            body: " \t\n ".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidArgument { ref field, .. }) if field == "body"
    ));

    assert!(h.rooms.list_messages(PageRequest::default()).await.unwrap().is_empty());
    assert!(h.rooms.get_room(room.id).await.unwrap().participants.is_empty());
}

#[tokio::test]
async fn test_update_room_rejects_blank_topic() {
    let h = harness();
    let host = h.register("host").await.user;
    let room = h.room(&host, "Room", "Original").await;

    let err = h
        .rooms
        .update_room(UpdateRoomRequest {
            room_id: room.id,
            actor_id: host.id,
            name: Some("Renamed".to_owned()),
            description: None,
            topic: Some("   ".to_owned()),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidArgument { ref field, .. }) if field == "topic"
    ));

    let stored = h.rooms.get_room(room.id).await.unwrap();
    assert_eq!(stored.name, "Room");
    assert_eq!(stored.topic_id, room.topic_id);
    assert_eq!(h.topics.list_topics(PageRequest::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_rooms_and_messages_are_not_found() {
    let h = harness();
    let host = h.register("host").await.user;

    let err = h
        .rooms
        .update_room(UpdateRoomRequest {
            room_id: RoomId::generate(),
            actor_id: host.id,
            name: Some("Anything".to_owned()),
            description: None,
            topic: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::RoomNotFound)));

    let err = h.rooms.delete_room(host.id, RoomId::generate()).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::RoomNotFound)));

    let err = h
        .rooms
        .delete_message(host.id, MessageId::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::MessageNotFound)));
}

#[tokio::test]
async fn test_empty_room_update_keeps_timestamp() {
    let h = harness();
    let host = h.register("host").await.user;
    let room = h.room(&host, "Quiet", "T").await;

    let unchanged = h
        .rooms
        .update_room(UpdateRoomRequest {
            room_id: room.id,
            actor_id: host.id,
            name: None,
            description: None,
            topic: None,
        })
        .await
        .unwrap();
    assert_eq!(unchanged.updated_at, room.updated_at);
    assert_eq!(unchanged.name, "Quiet");
}

#[tokio::test]
async fn test_post_message_to_room_deleted_mid_write() {
    let h = harness();
    let host = h.register("host").await.user;
    let room = h.room(&host, "Fleeting", "T").await;

    let mut messages = MockMessageRepository::new();
    messages
        .expect_create_with_participant()
        .times(1)
        .returning(|_| Err(RepositoryError::NotFound));

    let rooms = RoomService::new(RoomServiceDependencies {
        room_repository: Arc::new(h.store.clone()),
        message_repository: Arc::new(messages),
        user_repository: Arc::new(h.store.clone()),
        topics: h.topics.clone(),
        clock: Arc::new(ManualClock::starting_at(Timestamp::now_utc())),
    });

    let err = rooms
        .post_message(PostMessageRequest {
            room_id: room.id,
            author_id: host.id,
            body: "anyone here?".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::RoomNotFound)));
}

#[tokio::test]
async fn test_presenter_skips_rows_with_vanished_references() {
    let h = harness();
    let host = h.register("host").await.user;
    let room = h.room(&host, "Kept", "T").await;
    let message = h.post(&host, &room, "still here").await;

    // 房间在查询和渲染之间被删除
    let mut vanished = MockRoomRepository::new();
    vanished.expect_find_by_ids().returning(|_| Ok(Vec::new()));
    let presenter = Presenter::new(PresenterDependencies {
        user_repository: Arc::new(h.store.clone()),
        topic_repository: Arc::new(h.store.clone()),
        room_repository: Arc::new(vanished),
        avatars: AvatarUrlPolicy::default(),
    });

    assert!(presenter.messages(std::slice::from_ref(&message)).await.unwrap().is_empty());
    let err = presenter.message(&message).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Repository(RepositoryError::Storage { .. })));

    let ghost = Room::new(
        RoomId::generate(),
        UserId::generate(),
        room.topic_id,
        "Ghost",
        None,
        Timestamp::now_utc(),
    )
    .unwrap();
    let rendered = h.presenter.rooms(&[ghost, room.clone()]).await.unwrap();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].name, "Kept");
}

#[tokio::test]
async fn test_search_uses_query_verbatim() {
    let h = harness();
    let host = h.register("host").await.user;
    let room = h.room(&host, "Rust", "Systems").await;
    h.post(&host, &room, "ownership").await;

    let results = h.search.search("rust").await.unwrap();
    assert_eq!(results.rooms.len(), 1);

    let results = h.search.search("rust ").await.unwrap();
    assert!(results.rooms.is_empty() && results.topics.is_empty() && results.messages.is_empty());

    let results = h.search.search(" ").await.unwrap();
    assert!(results.rooms.is_empty() && results.topics.is_empty() && results.messages.is_empty());
}
