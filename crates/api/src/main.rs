use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kolorit_api::config::ServerConfig;
use kolorit_api::router::build_router;
use kolorit_api::state::AppState;
use kolorit_pipeline::StorageLayout;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kolorit=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = kolorit_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    kolorit_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    kolorit_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // Sweep work orphaned by the previous process lifetime before
    // accepting any new requests.
    kolorit_pipeline::recover_interrupted(&pool)
        .await
        .expect("Recovery sweep failed");

    let storage = StorageLayout::from_env();
    storage
        .ensure_dirs()
        .await
        .expect("Failed to create media directories");

    let config = ServerConfig::from_env();
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST"),
        config.port,
    );

    let state = AppState {
        pool,
        config: Arc::new(config),
        storage,
    };
    let app = build_router(state);

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
