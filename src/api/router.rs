//! HTTP router

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::state::AppState;
use super::{datasets, health, models, projects, runs, validations};

/// Build the full application router.
///
/// The storage root is served verbatim under `/static`, mirroring the
/// `static_url` fields returned by the file and result endpoints.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let static_root = state.artifacts.root().to_path_buf();

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/api/projects/{project_id}/datasets",
            get(datasets::list_datasets).post(datasets::create_dataset),
        )
        .route(
            "/api/datasets/{dataset_id}/files",
            get(datasets::list_files).post(datasets::upload_files),
        )
        .route("/api/models", get(models::list_models))
        .route("/api/inference-runs", post(runs::create_run))
        .route("/api/inference-runs/{run_id}", get(runs::get_run))
        .route(
            "/api/inference-runs/{run_id}/results",
            get(runs::list_results),
        )
        .route("/api/validations", post(validations::create_validation))
        .route(
            "/api/inference-runs/{run_id}/validations",
            get(validations::list_validations),
        )
        .nest_service("/static", ServeDir::new(static_root))
        .with_state(state)
        .layer(build_cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return cors.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(parsed)
}
