//! HTTP routes
//!
//! Thin transport over the vehicle controller. `create_router` assembles the
//! full application with its middleware stack.

pub mod admin_routes;
pub mod health_routes;
pub mod vehicle_routes;

use axum::{extract::DefaultBodyLimit, http::StatusCode, Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::UPLOADS_URL_PREFIX;
use crate::middleware::cors_for;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();
    let uploads = ServeDir::new(&config.storage.uploads_dir);

    Router::new()
        .nest("/api/health", health_routes::create_health_router())
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/api/admin", admin_routes::create_admin_router())
        .nest_service(UPLOADS_URL_PREFIX, uploads)
        .fallback(endpoint_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_for(&config.cors_origins))
                .layer(TimeoutLayer::new(config.request_timeout))
                .layer(DefaultBodyLimit::max(config.storage.max_request_bytes())),
        )
        .with_state(state)
}

async fn endpoint_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Endpoint not found" })),
    )
}
