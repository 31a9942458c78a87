//! Purchase launch server
//!
//! Turns pending purchase orders into launched inventory units for a phone
//! resale shop: plans launch rows, keeps drafts, validates identifiers,
//! submits batches and reverts them.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod drafts;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;

use drafts::FileDraftStore;
use gateway::PgLaunchGateway;
use services::LaunchService;

/// Launch service as wired in production
pub type PgLaunchService = LaunchService<PgLaunchGateway, FileDraftStore>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub launch: Arc<PgLaunchService>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: Config) -> Self {
        let launch = LaunchService::new(
            PgLaunchGateway::new(db.clone()),
            FileDraftStore::new(config.drafts.directory.clone()),
            config.row_defaults(),
        );
        Self {
            db,
            config: Arc::new(config),
            launch: Arc::new(launch),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Purchase Launch API v1.0"
}
