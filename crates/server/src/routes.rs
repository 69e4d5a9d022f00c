//! Route configuration.

use crate::auth::auth_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check (intentionally unauthenticated for probes)
        .route("/health", get(handlers::health_check))
        // Item CRUD
        .route(
            "/json",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/json/{id}",
            get(handlers::get_item)
                .put(handlers::replace_item)
                .patch(handlers::update_item)
                .delete(handlers::delete_item),
        )
        // Auth runs on matched routes only, so unmatched mutations still
        // answer 404 rather than 401.
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .fallback(handlers::not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
