use super::{render, ApiError, ApiState};
use crate::query::HistoryOrder;
use axum::{
    extract::{Query, State},
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query parameters for the JSON history listing
#[derive(Deserialize)]
pub struct HistoryParams {
    /// `newest` (default) or `oldest`
    pub order: Option<HistoryOrder>,
}

/// One history row
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub timestamp: String,
    pub label: String,
}

/// History listing with the state it was taken alongside
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub status: &'static str,
    pub current: EntryResponse,
    pub order: HistoryOrder,
    pub entries: Vec<EntryResponse>,
}

/// Create history router
pub fn create_history_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/zgodovina", get(get_history_page))
        .route("/api/history", get(get_history))
        .with_state(state)
}

/// GET /zgodovina
///
/// HTML table of every committed state, newest first.
async fn get_history_page(State(state): State<Arc<ApiState>>) -> Result<Html<String>, ApiError> {
    let view = state.query.history_view(HistoryOrder::NewestFirst);
    let page = render::history_page(&view, state.refresh_seconds)?;
    Ok(Html(page))
}

/// GET /api/history?order=newest|oldest
async fn get_history(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<HistoryParams>,
) -> Json<HistoryResponse> {
    let view = state.query.history_view(params.order.unwrap_or_default());

    Json(HistoryResponse {
        status: "OK",
        current: EntryResponse {
            timestamp: view.current.observed_at.to_rfc3339(),
            label: view.current.label,
        },
        order: view.order,
        entries: view
            .entries
            .into_iter()
            .map(|entry| EntryResponse {
                timestamp: entry.timestamp.to_rfc3339(),
                label: entry.label,
            })
            .collect(),
    })
}
