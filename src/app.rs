use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/drink", post(handlers::drink))
        .route("/refresh", post(handlers::refresh))
        .route("/tag", post(handlers::select_tag))
        .route("/tags", get(handlers::tags_page))
        .route("/analytics", get(handlers::analytics_page))
        .route("/settings", get(handlers::settings_page).post(handlers::save_settings))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/recent", get(handlers::get_recent))
        .route("/api/weekly", get(handlers::get_weekly))
        .route("/api/tags", get(handlers::get_tags))
        .route("/api/drink", post(handlers::post_drink))
        .with_state(state)
}
