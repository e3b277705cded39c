//! Send endpoints
//!
//! Bulk broadcast to a group/dialect selection, individual send to one
//! member, recipient preview, and the raw gateway proxy used by
//! integrations that already hold phone numbers.

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use ews_common::db::{MessageHistoryRecord, MessageStatus};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::history::{self, NewHistoryRecord};
use crate::db::{dialects, groups, members};
use crate::delivery::{self, DeliveryError, DeliveryReport};
use crate::extract::{ApiJson, ApiPath};
use crate::recipients::{resolve_recipients, RecipientSelection};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub count: usize,
}

/// POST /api/recipients/preview
///
/// Number of active members the selection would reach.
pub async fn preview_recipients(
    State(state): State<AppState>,
    ApiJson(selection): ApiJson<RecipientSelection>,
) -> ApiResult<Json<PreviewResponse>> {
    let recipients = resolve_recipients(&state.db, &selection).await?;
    Ok(Json(PreviewResponse {
        count: recipients.count,
    }))
}

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub selection: RecipientSelection,
}

#[derive(Debug, Serialize)]
pub struct SendOutcome {
    /// Absent when the send went out but could not be logged
    pub history: Option<MessageHistoryRecord>,
    pub delivery: DeliveryReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// What a send looked like, for the history log
struct SendContext {
    message: String,
    recipient_count: usize,
    groups: Vec<String>,
    dialects: Vec<String>,
}

/// Deliver and log the outcome
///
/// Accepted sends are logged `sent`. Gateway and transport failures are
/// logged `failed` before the error is returned; anything rejected before
/// the gateway call leaves no trace in history.
async fn deliver_and_record(
    state: &AppState,
    context: SendContext,
    phones: &[String],
) -> ApiResult<SendOutcome> {
    let result = match delivery::deliver(state, &context.message, phones).await {
        Err(e) if !e.was_attempted() => return Err(e.into()),
        other => other,
    };

    let (status, message_id, error) = match &result {
        Ok(report) => (MessageStatus::Sent, report.message_id.clone(), None),
        Err(e) => (MessageStatus::Failed, None, Some(e.to_string())),
    };

    let logged = history::insert(
        &state.db,
        NewHistoryRecord {
            message_text: context.message,
            recipient_count: context.recipient_count as i64,
            status,
            groups: context.groups,
            dialects: context.dialects,
            message_id,
            error,
        },
    )
    .await;

    // A send the gateway accepted is reported as sent even if logging fails,
    // so the operator does not resend it
    let record = match logged {
        Ok(record) => Some(record),
        Err(e) => {
            error!(
                status = status.as_str(),
                message_id = result.as_ref().ok().and_then(|r| r.message_id.as_deref()).unwrap_or("-"),
                error = %e,
                "Failed to record send in history"
            );
            None
        }
    };

    match result {
        Ok(delivery) => {
            info!(
                history_id = %record.as_ref().map(|r| r.id.to_string()).unwrap_or_default(),
                "Send recorded as sent"
            );
            let warning = record
                .is_none()
                .then(|| "SMS was sent but could not be saved to history".to_string());
            Ok(SendOutcome {
                history: record,
                delivery,
                warning,
            })
        }
        Err(e) => {
            warn!(error = %e, logged = record.is_some(), "Send failed");
            Err(e.into())
        }
    }
}

/// POST /api/broadcast
///
/// **Request:** `{"message": "...", "group_ids": [...], "dialect_ids": [...]}`
pub async fn broadcast(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BroadcastRequest>,
) -> ApiResult<Json<SendOutcome>> {
    if request.message.trim().is_empty() {
        return Err(DeliveryError::EmptyMessage.into());
    }
    if request.selection.is_empty() {
        return Err(ApiError::BadRequest(
            "Please select at least one group or dialect".to_string(),
        ));
    }

    let recipients = resolve_recipients(&state.db, &request.selection).await?;
    if recipients.count == 0 {
        return Err(ApiError::BadRequest("No active recipients found".to_string()));
    }

    let (group_names, dialect_names) = tokio::try_join!(
        groups::names(&state.db, &request.selection.group_ids),
        dialects::names(&state.db, &request.selection.dialect_ids),
    )?;

    info!(
        recipients = recipients.count,
        groups = group_names.len(),
        dialects = dialect_names.len(),
        "Broadcast requested"
    );

    let context = SendContext {
        message: request.message,
        recipient_count: recipients.count,
        groups: group_names,
        dialects: dialect_names,
    };
    let outcome = deliver_and_record(&state, context, &recipients.phones).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct MemberSmsRequest {
    #[serde(default)]
    pub message: String,
}

/// POST /api/members/:id/sms
pub async fn send_to_member(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<MemberSmsRequest>,
) -> ApiResult<Json<SendOutcome>> {
    if request.message.trim().is_empty() {
        return Err(DeliveryError::EmptyMessage.into());
    }

    let member = members::get(&state.db, id).await?;
    if !member.is_active {
        return Err(ApiError::BadRequest(format!(
            "Member '{}' is inactive",
            member.name
        )));
    }

    info!(member_id = %id, "Individual SMS requested");

    let context = SendContext {
        message: request.message,
        recipient_count: 1,
        groups: Vec::new(),
        dialects: Vec::new(),
    };
    let outcome = deliver_and_record(&state, context, &[member.phone]).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct SmsSendRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub recipients: Vec<String>,
}

/// POST /api/sms/send
///
/// Gateway proxy: raw numbers in, delivery report out. Not logged to history.
pub async fn send_sms(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SmsSendRequest>,
) -> ApiResult<Json<DeliveryReport>> {
    let report = delivery::deliver(&state, &request.message, &request.recipients).await?;
    Ok(Json(report))
}

pub fn send_routes() -> Router<AppState> {
    Router::new()
        .route("/api/recipients/preview", post(preview_recipients))
        .route("/api/broadcast", post(broadcast))
        .route("/api/members/:id/sms", post(send_to_member))
        .route("/api/sms/send", post(send_sms))
}
