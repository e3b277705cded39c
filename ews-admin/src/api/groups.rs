//! Group management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use ews_common::db::Group;
use tracing::info;
use uuid::Uuid;

use crate::db::groups::{self, GroupInput};
use crate::extract::{ApiJson, ApiPath};
use crate::{ApiResult, AppState};

/// GET /api/groups
pub async fn list_groups(State(state): State<AppState>) -> ApiResult<Json<Vec<Group>>> {
    Ok(Json(groups::list(&state.db).await?))
}

/// GET /api/groups/:id
pub async fn get_group(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Group>> {
    Ok(Json(groups::get(&state.db, id).await?))
}

/// POST /api/groups
///
/// **Errors:** 400 blank name, 409 duplicate name
pub async fn create_group(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<GroupInput>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    let group = groups::create(&state.db, &payload).await?;
    info!(group_id = %group.id, name = %group.name, "Group created");
    Ok((StatusCode::CREATED, Json(group)))
}

/// PUT /api/groups/:id
pub async fn update_group(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<GroupInput>,
) -> ApiResult<Json<Group>> {
    let group = groups::update(&state.db, id, &payload).await?;
    info!(group_id = %id, "Group updated");
    Ok(Json(group))
}

/// DELETE /api/groups/:id
pub async fn delete_group(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    groups::delete(&state.db, id).await?;
    info!(group_id = %id, "Group deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn group_routes() -> Router<AppState> {
    Router::new()
        .route("/api/groups", get(list_groups).post(create_group))
        .route(
            "/api/groups/:id",
            get(get_group).put(update_group).delete(delete_group),
        )
}
