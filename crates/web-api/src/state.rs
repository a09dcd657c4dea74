use std::sync::Arc;

use application::{
    services::{
        AuthService, AuthServiceDependencies, Presenter, PresenterDependencies, RoomService,
        RoomServiceDependencies, SearchService, SearchServiceDependencies, TopicService,
        TopicServiceDependencies, UserService, UserServiceDependencies,
    },
    AvatarUrlPolicy, CaptchaGate, Clock, MessageRepository, PasswordHasher, PasswordPolicy,
    RoomRepository, TokenBlacklist, TokenService, TopicRepository, UserRepository,
};

/// 组装全部用例服务所需的适配器
pub struct AppDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub topic_repository: Arc<dyn TopicRepository>,
    pub room_repository: Arc<dyn RoomRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub password_policy: Arc<dyn PasswordPolicy>,
    pub token_service: Arc<dyn TokenService>,
    pub token_blacklist: Arc<dyn TokenBlacklist>,
    pub captcha: CaptchaGate,
    pub clock: Arc<dyn Clock>,
    pub avatars: AvatarUrlPolicy,
    /// 为真时用户列表、用户详情和房间列表需要登录
    pub listings_require_auth: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub topic_service: Arc<TopicService>,
    pub room_service: Arc<RoomService>,
    pub search_service: Arc<SearchService>,
    pub presenter: Arc<Presenter>,
    pub listings_require_auth: bool,
}

impl AppState {
    pub fn new(deps: AppDependencies) -> Self {
        let topic_service = Arc::new(TopicService::new(TopicServiceDependencies {
            topic_repository: deps.topic_repository.clone(),
            clock: deps.clock.clone(),
        }));

        let auth_service = AuthService::new(AuthServiceDependencies {
            user_repository: deps.user_repository.clone(),
            password_hasher: deps.password_hasher,
            password_policy: deps.password_policy,
            token_service: deps.token_service,
            token_blacklist: deps.token_blacklist,
            captcha: deps.captcha,
            clock: deps.clock.clone(),
        });

        let user_service = UserService::new(UserServiceDependencies {
            user_repository: deps.user_repository.clone(),
            clock: deps.clock.clone(),
        });

        let room_service = RoomService::new(RoomServiceDependencies {
            room_repository: deps.room_repository.clone(),
            message_repository: deps.message_repository.clone(),
            user_repository: deps.user_repository.clone(),
            topics: topic_service.clone(),
            clock: deps.clock,
        });

        let search_service = SearchService::new(SearchServiceDependencies {
            room_repository: deps.room_repository.clone(),
            topic_repository: deps.topic_repository.clone(),
            message_repository: deps.message_repository,
        });

        let presenter = Presenter::new(PresenterDependencies {
            user_repository: deps.user_repository,
            topic_repository: deps.topic_repository,
            room_repository: deps.room_repository,
            avatars: deps.avatars,
        });

        Self {
            auth_service: Arc::new(auth_service),
            user_service: Arc::new(user_service),
            topic_service,
            room_service: Arc::new(room_service),
            search_service: Arc::new(search_service),
            presenter: Arc::new(presenter),
            listings_require_auth: deps.listings_require_auth,
        }
    }
}
