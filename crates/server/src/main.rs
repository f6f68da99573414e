//! Folio server entry point.

use std::sync::Arc;

use anyhow::Context;
use axum::{Router, middleware};
use folio_api::{AppState, router as api_router};
use folio_common::{Config, FileStorage, LocalStorage};
use folio_core::{ContentService, SearchService, TaglinkService};
use folio_db::repositories::{ContentRepository, TaglinkRepository};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err).context("Failed to read .env");
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting folio server...");

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Connect to database
    let db = folio_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    folio_db::migrate(&db).await?;
    info!("Migrations completed");

    let storage = Arc::new(LocalStorage::from_config(&config.storage));
    for dir in [&config.storage.image_dir, &config.storage.media_dir] {
        if let Err(err) = tokio::fs::create_dir_all(dir).await {
            warn!(dir = %dir.display(), error = %err, "Could not create upload directory");
        }
    }

    // Initialize repositories and services
    let db = Arc::new(db);
    let content_repo = ContentRepository::new(Arc::clone(&db));
    let taglinks = TaglinkService::new(TaglinkRepository::new(Arc::clone(&db)));
    let storage: Arc<dyn FileStorage> = storage;

    let state = AppState {
        content_service: ContentService::new(
            content_repo.clone(),
            taglinks.clone(),
            Arc::clone(&storage),
        ),
        search_service: SearchService::new(content_repo, taglinks, &config.site),
        storage,
        site: config.site.clone(),
    };

    // Build router
    let mut app = Router::new().nest("/api", api_router());

    // Uploads are only served here when they live under a local path
    let uploads = config.storage.base_url.trim_end_matches('/');
    if uploads.starts_with('/') {
        app = app
            .nest_service(
                &format!("{uploads}/image"),
                ServeDir::new(&config.storage.image_dir),
            )
            .nest_service(
                &format!("{uploads}/media"),
                ServeDir::new(&config.storage.media_dir),
            );
    }

    let app = app
        .layer(middleware::from_fn(folio_api::middleware::log_request))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
