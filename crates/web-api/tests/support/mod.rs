use std::sync::Arc;

use application::{
    memory::{FakeTokenService, InMemoryStore, PlainPasswordHasher},
    AvatarUrlPolicy, CaptchaGate, DefaultPasswordPolicy, InMemoryTokenBlacklist, ManualClock,
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use domain::Timestamp;
use serde_json::{json, Value};
use tower::ServiceExt;
use web_api::{router, AppDependencies, AppState};

pub const PASSWORD: &str = "study-hard-42";

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryStore,
}

pub fn build_app(listings_require_auth: bool) -> TestApp {
    let store = InMemoryStore::new();
    let state = AppState::new(AppDependencies {
        user_repository: Arc::new(store.clone()),
        topic_repository: Arc::new(store.clone()),
        room_repository: Arc::new(store.clone()),
        message_repository: Arc::new(store.clone()),
        password_hasher: Arc::new(PlainPasswordHasher),
        password_policy: Arc::new(DefaultPasswordPolicy::default()),
        token_service: Arc::new(FakeTokenService::default()),
        token_blacklist: Arc::new(InMemoryTokenBlacklist::new()),
        captcha: CaptchaGate::disabled(),
        clock: Arc::new(ManualClock::starting_at(Timestamp::now_utc())),
        avatars: AvatarUrlPolicy::new(None, false),
        listings_require_auth,
    });

    TestApp {
        router: router(state),
        store,
    }
}

pub async fn send_request(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

/// 注册并返回 `(user_id, access, refresh)`
pub async fn register(router: &Router, username: &str) -> (String, String, String) {
    let (status, body) = send_request(
        router,
        Method::POST,
        "/api/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "name": username,
            "password1": PASSWORD,
            "password2": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

    (
        body["user"]["id"].as_str().expect("user id").to_owned(),
        body["access"].as_str().expect("access").to_owned(),
        body["refresh"].as_str().expect("refresh").to_owned(),
    )
}
