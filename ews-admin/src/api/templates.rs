//! SMS template endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use ews_common::db::SmsTemplate;
use uuid::Uuid;

use crate::db::templates::{self, TemplateInput};
use crate::extract::{ApiJson, ApiPath};
use crate::{ApiResult, AppState};

/// GET /api/templates
pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Json<Vec<SmsTemplate>>> {
    Ok(Json(templates::list(&state.db).await?))
}

/// GET /api/templates/:id
pub async fn get_template(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<SmsTemplate>> {
    Ok(Json(templates::get(&state.db, id).await?))
}

/// POST /api/templates
pub async fn create_template(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TemplateInput>,
) -> ApiResult<(StatusCode, Json<SmsTemplate>)> {
    Ok((
        StatusCode::CREATED,
        Json(templates::create(&state.db, &payload).await?),
    ))
}

/// PUT /api/templates/:id
pub async fn update_template(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<TemplateInput>,
) -> ApiResult<Json<SmsTemplate>> {
    Ok(Json(templates::update(&state.db, id, &payload).await?))
}

/// DELETE /api/templates/:id
pub async fn delete_template(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    templates::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn template_routes() -> Router<AppState> {
    Router::new()
        .route("/api/templates", get(list_templates).post(create_template))
        .route(
            "/api/templates/:id",
            get(get_template).put(update_template).delete(delete_template),
        )
}
