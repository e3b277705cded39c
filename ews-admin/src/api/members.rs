//! Member management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use ews_common::db::Member;
use ews_common::phone;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::db::members::{self, MemberInput};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{ApiResult, AppState};

/// Member as shown in the UI
///
/// `normalized_phone` is null when the stored number is not a deliverable
/// Ghana mobile number, which lets the UI flag it before a send rejects it.
#[derive(Debug, Serialize)]
pub struct MemberView {
    #[serde(flatten)]
    pub member: Member,
    pub normalized_phone: Option<String>,
}

impl From<Member> for MemberView {
    fn from(member: Member) -> Self {
        let normalized_phone = phone::normalize(&member.phone);
        Self {
            member,
            normalized_phone,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MemberListQuery {
    /// Filter on the active flag; absent lists everyone
    pub active: Option<bool>,
}

/// GET /api/members
pub async fn list_members(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MemberListQuery>,
) -> ApiResult<Json<Vec<MemberView>>> {
    let list = members::list(&state.db, query.active).await?;
    Ok(Json(list.into_iter().map(MemberView::from).collect()))
}

/// GET /api/members/:id
pub async fn get_member(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MemberView>> {
    Ok(Json(members::get(&state.db, id).await?.into()))
}

/// POST /api/members
///
/// **Errors:** 400 blank name/phone or unknown group/dialect id
pub async fn create_member(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<MemberInput>,
) -> ApiResult<(StatusCode, Json<MemberView>)> {
    let member = members::create(&state.db, &payload).await?;
    info!(member_id = %member.id, "Member created");
    Ok((StatusCode::CREATED, Json(member.into())))
}

/// PUT /api/members/:id
///
/// Replaces the member's group and dialect links with the submitted ones.
pub async fn update_member(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<MemberInput>,
) -> ApiResult<Json<MemberView>> {
    let member = members::update(&state.db, id, &payload).await?;
    info!(member_id = %id, "Member updated");
    Ok(Json(member.into()))
}

/// DELETE /api/members/:id
pub async fn delete_member(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    members::delete(&state.db, id).await?;
    info!(member_id = %id, "Member deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/api/members", get(list_members).post(create_member))
        .route(
            "/api/members/:id",
            get(get_member).put(update_member).delete(delete_member),
        )
}
