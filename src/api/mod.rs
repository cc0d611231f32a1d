// HTTP query surface over the query service

pub mod history;
pub mod render;
pub mod state;

use crate::query::QueryService;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Router,
};
use std::fmt;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

/// Shared state for all query routes
pub struct ApiState {
    pub query: QueryService,
    /// Auto-refresh interval of the history page (seconds)
    pub refresh_seconds: u64,
}

/// Build the complete query router
pub fn create_router(app_state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(state::create_state_router(Arc::clone(&app_state)))
        .merge(history::create_history_router(app_state))
        .layer(CorsLayer::permissive())
}

/// Failures while building a response
#[derive(Debug)]
pub enum ApiError {
    Render(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Render(detail) => write!(f, "failed to render page: {}", detail),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<fmt::Error> for ApiError {
    fn from(e: fmt::Error) -> Self {
        ApiError::Render(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self, "Query rendering failed");

        let body = format!(
            "<h1>Internal Server Error (500)</h1>\n\
             <p>The page could not be generated.</p>\n\
             <pre>{}</pre>\n",
            render::escape_html(&self.to_string())
        );

        (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
    }
}
