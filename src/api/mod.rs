//! REST API endpoints.
//!
//! Axum-based HTTP API for browsing fixtures, drafting and saving lineups,
//! and proxying event statistics.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::lineup::LineupError;
use crate::models::Scope;
use crate::stats::StatsError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Lineup(#[from] LineupError),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Upstream answer relayed with its own status and body
    #[error("Upstream responded with {status}")]
    Proxy { status: StatusCode, body: Value },
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

fn lineup_status(err: &LineupError) -> (StatusCode, &'static str) {
    match err {
        LineupError::InvalidRole { .. } => (StatusCode::BAD_REQUEST, "INVALID_ROLE"),
        LineupError::IneligiblePlayer(_) => (StatusCode::BAD_REQUEST, "INELIGIBLE_PLAYER"),
        LineupError::DuplicateAssignment { .. } => {
            (StatusCode::BAD_REQUEST, "DUPLICATE_ASSIGNMENT")
        }
        LineupError::CaptainNotSelected(_) => (StatusCode::BAD_REQUEST, "CAPTAIN_NOT_SELECTED"),
        LineupError::UnknownMatch(_) => (StatusCode::NOT_FOUND, "UNKNOWN_MATCH"),
        LineupError::UnknownPlayer(_) => (StatusCode::NOT_FOUND, "UNKNOWN_PLAYER"),
        LineupError::IncompleteLineup { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INCOMPLETE_LINEUP")
        }
        LineupError::OverBudget { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "OVER_BUDGET"),
        LineupError::Repository(_) => (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Lineup(e) => lineup_status(e),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Proxy { status, body } => {
                return (*status, Json(body.clone())).into_response();
            }
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        let status = err.status_code();
        match err {
            StatsError::Upstream { body, .. } => ApiError::Proxy { status, body },
            other => ApiError::Proxy {
                status,
                body: json!({ "error": other.to_string() }),
            },
        }
    }
}

/// Pagination parameters.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(50).clamp(1, 100),
        }
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1) * self.page_size
    }

    /// The slice of `items` on this page, plus its metadata.
    pub fn apply<'a, T>(&self, items: &'a [T]) -> (&'a [T], PaginationMeta) {
        let meta = PaginationMeta::new(self, items.len() as u32);
        let start = (self.offset() as usize).min(items.len());
        let end = (start + self.page_size as usize).min(items.len());
        (&items[start..end], meta)
    }
}

/// Pagination metadata in responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u32) -> Self {
        let total_pages = total_items.div_ceil(pagination.page_size);
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            total_items,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}

/// Parse an optional `scope` query value. Missing means day; anything
/// unrecognised widens to event.
pub fn resolve_scope(raw: Option<&str>) -> Scope {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("Invalid CORS origin '{}', allowing any", origin);
            layer.allow_origin(Any)
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/api/health", get(routes::meta::health))
        .route("/api/events", get(routes::events::list_events))
        .route("/api/events/:id", get(routes::events::get_event))
        .route("/api/events/:id/matches", get(routes::events::list_event_matches))
        .route("/api/matches/:id", get(routes::matches::get_match))
        .route("/api/matches/:id/players", get(routes::matches::list_match_players))
        .route(
            "/api/lineups",
            get(routes::lineups::list_lineups).post(routes::lineups::create_lineup),
        )
        .route("/api/lineups/preview", post(routes::lineups::preview_lineup))
        .route("/api/event", post(routes::stats::event_stats))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
