use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use restyle_api::config::ServerConfig;
use restyle_api::router::build_app_router;
use restyle_api::state::AppState;
use restyle_events::{EmailConfig, EmailDelivery, Notifier, NotificationDispatcher};
use restyle_imagegen::{ImageGenConfig, OpenAiImageClient};
use restyle_pipeline::{PgJobStore, Pipeline};
use restyle_storage::StorageConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "restyle_api=debug,restyle_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = restyle_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    restyle_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    restyle_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Object storage ---
    let storage_config = StorageConfig::from_env().expect("Invalid storage configuration");
    let objects = restyle_storage::connect(&storage_config)
        .await
        .expect("Failed to initialise object storage");
    tracing::info!(backend = ?storage_config.backend, "Object storage ready");

    // --- Image generation ---
    let imagegen_config = ImageGenConfig::from_env().expect("OPENAI_API_KEY must be set");
    tracing::info!(model = %imagegen_config.model, "Image generation client configured");
    let transformer = Arc::new(OpenAiImageClient::new(imagegen_config));

    // --- Notifications ---
    let notifier: Option<Arc<dyn Notifier>> = match EmailConfig::from_env() {
        Some(email_config) => Some(Arc::new(
            EmailDelivery::new(email_config).expect("Failed to build email client"),
        )),
        None => {
            tracing::warn!("RESEND_API_KEY not set, preview emails are disabled");
            None
        }
    };
    let notifications = NotificationDispatcher::new(notifier);

    // --- Pipeline ---
    let pipeline = Pipeline::new(
        Arc::new(PgJobStore::new(pool.clone())),
        objects,
        transformer,
        notifications.clone(),
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        pipeline: Arc::new(pipeline),
    };
    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!(
        in_flight = notifications.in_flight(),
        "Server stopped accepting connections, waiting for notifications"
    );
    notifications
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
