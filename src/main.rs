//! Campus Trees Backend
//!
//! REST backend for a campus tree catalog with SQLite persistence, local
//! object storage for tree photos, and token-based admin sessions.

mod api;
mod auth;
mod config;
mod db;
mod directory;
mod errors;
mod images;
mod mapper;
mod models;
mod repository;
mod seed;
mod storage;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::AdminGuard;
use config::Config;
use db::Store;
use directory::SharedDirectory;
use images::ImagePipeline;
use repository::TreeRepository;
use storage::{ObjectStorage, STORAGE_ROUTE, TREES_BUCKET};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: TreeRepository,
    pub directory: Arc<SharedDirectory>,
    pub admin: Arc<AdminGuard>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Campus Trees Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Storage path: {:?}", config.storage_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_username.is_none() || config.admin_password.is_none() {
        tracing::warn!(
            "No bootstrap admin configured (TREES_ADMIN_USERNAME / TREES_ADMIN_PASSWORD)"
        );
    }

    let state = build_state(config.clone()).await?;

    // Warm the directory; an unreachable store only delays the first listing
    tracing::info!("Loading tree directory...");
    if let Err(e) = state.directory.refresh(&state.repo).await {
        tracing::warn!("Initial directory load failed: {}", e);
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the database, storage and session file, and bootstrap the admin.
pub async fn build_state(config: Config) -> Result<AppState, Box<dyn std::error::Error>> {
    let pool = db::init_database(&config.db_path).await?;
    let store = Store::new(pool);

    let storage =
        ObjectStorage::open(&config.storage_dir, TREES_BUCKET, &config.public_base_url).await?;
    let images = ImagePipeline::new(store.clone(), storage, config.max_image_bytes);
    let repo = TreeRepository::new(store.clone(), images);

    let admin = AdminGuard::load(store, &config.session_file, config.session_ttl_hours).await;
    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        admin.bootstrap_admin(username, password).await?;
    }

    Ok(AppState {
        repo,
        directory: Arc::new(SharedDirectory::new()),
        admin: Arc::new(admin),
        config: Arc::new(config),
    })
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Oversize images must reach the validator to get its message
    let body_limit = DefaultBodyLimit::max(body_limit_for(state.config.max_image_bytes));
    // Timeouts are answered with the error envelope
    let timeout = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(errors::handle_middleware_error))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_secs,
        )));

    let guard = state.admin.clone();

    // Admin routes
    let admin_routes = Router::new()
        .route("/trees", post(api::create_tree))
        .route("/trees/predefined", post(api::add_predefined_trees))
        .route("/trees/{id}", delete(api::delete_tree))
        .route("/trees/{id}/image", post(api::replace_tree_image))
        .route_layer(middleware::from_fn(move |req, next| {
            auth::admin_guard_layer(guard.clone(), req, next)
        }));

    // API routes
    let api_routes = Router::new()
        // Trees
        .route("/trees", get(api::list_trees))
        .route("/trees/{id}", get(api::get_tree))
        .route("/trees/{id}/signage", get(api::get_signage))
        // Images
        .route("/images/preview", post(api::preview_image))
        // Auth
        .route("/auth/login", post(api::login))
        .route("/auth/session", get(api::get_session))
        .route("/auth/logout", post(api::logout))
        .nest("/admin", admin_routes);

    // Health check and stored photos (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .nest_service(STORAGE_ROUTE, ServeDir::new(&state.config.storage_dir));

    Router::new()
        .nest("/api", api_routes)
        .merge(public_routes)
        .layer(body_limit)
        .layer(timeout)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Request body ceiling: twice the image ceiling, so oversize images reach
/// the validator instead of being cut off by the extractor.
fn body_limit_for(max_image_bytes: usize) -> usize {
    max_image_bytes.saturating_mul(2)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
