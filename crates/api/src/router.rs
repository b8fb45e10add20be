//! Router assembly: routes plus the middleware stack (trace, timeout,
//! CORS).

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.cors_origins);
    let timeout = TimeoutLayer::new(Duration::from_secs(state.config.request_timeout_secs));

    let api = Router::new()
        .route("/scenes", post(handlers::scenes::create_scene))
        .route(
            "/scenes/{id}",
            get(handlers::scenes::get_scene).delete(handlers::scenes::delete_scene),
        )
        .route(
            "/scenes/{id}/regenerate",
            post(handlers::scenes::regenerate_scene),
        )
        .route("/scenes/{id}/jobs", get(handlers::scenes::list_scene_jobs))
        .route("/scenes/{id}/review", put(handlers::scenes::review_scene))
        .route(
            "/scenes/{id}/versions",
            get(handlers::versions::list_versions),
        )
        .route("/versions/{id}", delete(handlers::versions::delete_version))
        .route("/projects/{id}/scenes", get(handlers::scenes::list_scenes));

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let origins: Vec<axum::http::HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE])
}
