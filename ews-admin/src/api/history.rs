//! Message history endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use ews_common::db::{MessageHistoryRecord, MessageStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::history;
use crate::extract::{ApiPath, ApiQuery};
use crate::pagination::PAGE_SIZE;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// "sent", "delivered", "failed"; absent or "all" lists everything
    pub status: Option<String>,

    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct HistoryPage {
    pub messages: Vec<MessageHistoryRecord>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

fn parse_status_filter(raw: Option<&str>) -> ApiResult<Option<MessageStatus>> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(ApiError::BadRequest),
    }
}

/// GET /api/history
pub async fn list_history(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Json<HistoryPage>> {
    let status = parse_status_filter(query.status.as_deref())?;
    let (messages, total, pagination) = history::list(&state.db, status, query.page).await?;

    Ok(Json(HistoryPage {
        messages,
        total,
        page: pagination.page,
        page_size: PAGE_SIZE,
        total_pages: pagination.total_pages,
    }))
}

/// DELETE /api/history/:id
pub async fn delete_history(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    history::delete(&state.db, id).await?;
    tracing::info!(history_id = %id, "History record deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/api/history", get(list_history))
        .route("/api/history/:id", delete(delete_history))
}
