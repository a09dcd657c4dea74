//! 主应用程序入口
//!
//! 加载配置、连接基础设施并启动 Axum Web API 服务。

use std::sync::Arc;

use anyhow::Context;
use application::{AvatarUrlPolicy, DefaultPasswordPolicy, SystemClock};
use axum::http::HeaderValue;
use config::AppConfig;
use infrastructure::{Infrastructure, InfrastructureConfig};
use time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppDependencies, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    tracing::info!(database = %config.redacted_database_url(), "connecting to database");

    let infrastructure = Infrastructure::connect(infrastructure_config(&config))
        .await
        .context("failed to initialise infrastructure")?;

    let state = build_state(&config, &infrastructure);
    let app = router(state)
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config.server.cors_origins)?)
        .layer(TraceLayer::new_for_http());

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!(%address, "study room server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn infrastructure_config(config: &AppConfig) -> InfrastructureConfig {
    InfrastructureConfig {
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        bcrypt_cost: config.password.bcrypt_cost,
        jwt_secret: config.jwt.secret.clone(),
        access_ttl: Duration::minutes(config.jwt.access_ttl_minutes),
        refresh_ttl: Duration::days(config.jwt.refresh_ttl_days),
        redis_url: config.redis.url.clone(),
        captcha: config
            .captcha
            .enabled
            .then(|| (config.captcha.secret.clone(), config.captcha.verify_url.clone())),
    }
}

fn build_state(config: &AppConfig, infrastructure: &Infrastructure) -> AppState {
    let storage = &infrastructure.storage;
    AppState::new(AppDependencies {
        user_repository: storage.user_repository.clone(),
        topic_repository: storage.topic_repository.clone(),
        room_repository: storage.room_repository.clone(),
        message_repository: storage.message_repository.clone(),
        password_hasher: infrastructure.password_hasher_trait(),
        password_policy: Arc::new(DefaultPasswordPolicy::new(config.password.min_length)),
        token_service: infrastructure.token_service.clone(),
        token_blacklist: infrastructure.token_blacklist.clone(),
        captcha: infrastructure.captcha.clone(),
        clock: Arc::new(SystemClock),
        avatars: AvatarUrlPolicy::new(
            config.avatar.avatar_base_url.clone(),
            config.avatar.external_origin_required,
        ),
        listings_require_auth: config.access.listings_require_auth,
    })
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid cors origin `{origin}`"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
