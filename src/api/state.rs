use super::ApiState;
use crate::query::display_time;
use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;
use std::sync::Arc;

/// Current box state as polled by dashboards
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub status: &'static str,
    pub stanje_skatle: String,
    /// Time of this query
    pub cas_prejema: String,
    /// Time the state was reported by the controller
    pub cas_spremembe: String,
}

/// Create current-state router
pub fn create_state_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/state", get(get_state))
        .route("/stanje", get(get_state))
        .with_state(state)
}

/// GET /state (alias /stanje)
async fn get_state(State(state): State<Arc<ApiState>>) -> Json<StateResponse> {
    let view = state.query.current_state_view();

    Json(StateResponse {
        status: view.status,
        stanje_skatle: view.label,
        cas_prejema: display_time(&view.queried_at),
        cas_spremembe: display_time(&view.observed_at),
    })
}
