use std::sync::Arc;

use account_service::config::Config;
use account_service::config::StorageBackend;
use account_service::domain::user::errors::RepositoryInitError;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::LazyUserRepository;
use account_service::outbound::repositories::PostgresUserRepository;
use account_service::outbound::repositories::RedisUserRepository;
use auth::Authenticator;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        storage_backend = ?config.storage.backend,
        "Configuration loaded"
    );

    let user_repository = build_repository(&config).await?;

    let authenticator = Arc::new(Authenticator::new(config.jwt.secret.as_bytes()));
    let user_service = Arc::new(UserService::new(user_repository));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, authenticator);

    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

/// Wrap the configured backend so it is built exactly once, then build it
/// eagerly so a misconfigured store stops the process at startup.
async fn build_repository(
    config: &Config,
) -> Result<Arc<dyn UserRepository>, RepositoryInitError> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let url = config.database.url.clone();
            let max_connections = config.database.max_connections;

            let repository = LazyUserRepository::new(move || {
                let url = url.clone();
                async move { PostgresUserRepository::connect(&url, max_connections).await }
            });
            repository.initialize().await?;

            Ok(Arc::new(repository))
        }
        StorageBackend::Redis => {
            let url = config.redis.url.clone();

            let repository = LazyUserRepository::new(move || {
                let url = url.clone();
                async move { RedisUserRepository::connect(&url).await }
            });
            repository.initialize().await?;

            Ok(Arc::new(repository))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received");
}
