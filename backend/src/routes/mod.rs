//! Route definitions for the purchase launch server

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - purchase stock launch
        .nest("/purchases", purchase_routes(state))
}

/// Purchase launch routes (protected)
fn purchase_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/launch-options", get(handlers::get_launch_options))
        .route(
            "/:order_id/launch",
            get(handlers::open_launch).post(handlers::submit_launch),
        )
        .route("/:order_id/launch/draft", put(handlers::save_launch_draft))
        .route(
            "/:order_id/launch/rows/:index/edit",
            post(handlers::edit_launch_row),
        )
        .route("/:order_id/launch/apply-all", post(handlers::apply_to_all_rows))
        .route("/:order_id/launch/revert", post(handlers::revert_launch))
        .route("/:order_id/stock-status", get(handlers::get_stock_status))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
