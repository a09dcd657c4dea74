mod auth_service;
mod presenter;
mod room_service;
mod search_service;
mod topic_service;
mod user_service;

#[cfg(test)]
mod tests;

pub use auth_service::{
    AuthService, AuthServiceDependencies, AuthSession, LoginRequest, RegisterRequest,
};
pub use presenter::{Presenter, PresenterDependencies};
pub use room_service::{
    CreateRoomRequest, PostMessageRequest, RoomService, RoomServiceDependencies,
    UpdateRoomRequest,
};
pub use search_service::{SearchResults, SearchService, SearchServiceDependencies};
pub use topic_service::{TopicService, TopicServiceDependencies};
pub use user_service::{UpdateProfileRequest, UserService, UserServiceDependencies};
