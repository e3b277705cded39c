//! Dialect management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use ews_common::db::Dialect;
use tracing::info;
use uuid::Uuid;

use crate::db::dialects::{self, DialectInput};
use crate::extract::{ApiJson, ApiPath};
use crate::{ApiResult, AppState};

/// GET /api/dialects
pub async fn list_dialects(State(state): State<AppState>) -> ApiResult<Json<Vec<Dialect>>> {
    Ok(Json(dialects::list(&state.db).await?))
}

/// GET /api/dialects/:id
pub async fn get_dialect(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Dialect>> {
    Ok(Json(dialects::get(&state.db, id).await?))
}

/// POST /api/dialects
pub async fn create_dialect(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<DialectInput>,
) -> ApiResult<(StatusCode, Json<Dialect>)> {
    let dialect = dialects::create(&state.db, &payload).await?;
    info!(dialect_id = %dialect.id, name = %dialect.name, "Dialect created");
    Ok((StatusCode::CREATED, Json(dialect)))
}

/// PUT /api/dialects/:id
pub async fn update_dialect(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<DialectInput>,
) -> ApiResult<Json<Dialect>> {
    Ok(Json(dialects::update(&state.db, id, &payload).await?))
}

/// DELETE /api/dialects/:id
pub async fn delete_dialect(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    dialects::delete(&state.db, id).await?;
    info!(dialect_id = %id, "Dialect deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn dialect_routes() -> Router<AppState> {
    Router::new()
        .route("/api/dialects", get(list_dialects).post(create_dialect))
        .route(
            "/api/dialects/:id",
            get(get_dialect).put(update_dialect).delete(delete_dialect),
        )
}
