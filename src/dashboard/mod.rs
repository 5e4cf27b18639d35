// Public API - what other modules can use
pub use refresh::{refresh_once, start_refresh_task};
pub use service::{DashboardService, TrendView};

// Internal modules
pub mod handlers;
mod refresh;
mod service;

use axum::{
    routing::{get, post},
    Router,
};

use crate::shared::AppState;

/// Routes for the four dashboard reads plus health and cache maintenance
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/games/latest", get(handlers::latest_games))
        .route("/winners", get(handlers::winners))
        .route("/trend", get(handlers::trend))
        .route("/questions", get(handlers::questions))
        .route("/questions/:clue_index", get(handlers::question_info))
        .route("/cache/invalidate", post(handlers::invalidate_cache))
        .with_state(state)
}
