use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use service::{directory::DirectoryService, file::profile_store::ProfileStore};

use crate::openapi::ApiDoc;

pub mod tutors;

/// Directory backed by the JSON profile file.
pub type Directory = DirectoryService<ProfileStore>;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<Directory>,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let store = state.directory.load_source().await.as_str().to_string();
    Json(Health { status: "ok", store })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tutors", post(tutors::register).get(tutors::list_all))
        .route("/tutors/search", get(tutors::search))
        .route("/tutors/:email", get(tutors::lookup))
        .route("/stats", get(tutors::stats))
        .route("/catalog", get(tutors::catalog))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
