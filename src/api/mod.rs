pub mod health;
pub mod reports;

use crate::orchestration::ReportRunner;
use crate::store::Repository;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub runner: ReportRunner,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, runner: ReportRunner) -> Self {
        Self { repo, runner }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/v1/generate", post(reports::generate))
        .route("/v1/status", get(reports::status))
        .route("/v1/report", get(reports::report))
        .route("/v1/clear", post(reports::clear))
        .layer(cors)
        .with_state(state)
}
