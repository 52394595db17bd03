use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scan", get(handlers::scan_page))
        .route("/scan/action", post(handlers::page_action))
        .route("/scan/back", get(handlers::back))
        .route("/api/session", get(handlers::get_session))
        .route("/api/action", post(handlers::action))
        .route("/api/scan", post(handlers::scan))
        .route("/api/scan/error", post(handlers::scan_error))
        .route("/api/focus", post(handlers::focus))
        .with_state(state)
}
