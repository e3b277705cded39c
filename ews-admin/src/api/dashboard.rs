//! Dashboard statistics

use axum::{extract::State, routing::get, Json, Router};
use ews_common::db::MessageStatus;
use serde::Serialize;

use crate::{db, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_members: i64,
    pub active_members: i64,
    pub total_groups: i64,
    pub total_dialects: i64,
    /// Every history row, whatever its status
    pub messages_sent: i64,
    pub messages_delivered: i64,
}

/// GET /api/dashboard
///
/// The counts are independent, so they are fetched concurrently.
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    let pool = &state.db;

    let (
        total_members,
        active_members,
        total_groups,
        total_dialects,
        messages_sent,
        messages_delivered,
    ) = tokio::try_join!(
        db::members::count(pool),
        db::members::count_active(pool),
        db::groups::count(pool),
        db::dialects::count(pool),
        db::history::count(pool, None),
        db::history::count(pool, Some(MessageStatus::Delivered)),
    )?;

    Ok(Json(DashboardStats {
        total_members,
        active_members,
        total_groups,
        total_dialects,
        messages_sent,
        messages_delivered,
    }))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/api/dashboard", get(get_dashboard))
}
