//! SMS delivery
//!
//! Validates a send, resolves gateway credentials, normalizes recipients and
//! makes exactly one gateway call. Callers decide what to write to history.
//!
//! Checks run cheapest first: message and recipient list (no I/O), then
//! credentials (one settings read), then numbers, and only then the network.

use axum::http::StatusCode;
use ews_common::phone::{partition_numbers, PartitionedNumbers};
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::gateway::{resolve_credentials, GatewayError};
use crate::{db, AppState};

/// Delivery failures, grouped by who has to act on them
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Message text is required")]
    EmptyMessage,

    #[error("At least one recipient is required")]
    NoRecipients,

    /// Operator must fill in the settings screen (or deployment secrets)
    #[error("Missing gateway credentials: {}", .missing.join(", "))]
    MissingCredentials { missing: Vec<&'static str> },

    #[error("No valid Ghana phone numbers found")]
    NoValidNumbers { invalid: Vec<String> },

    /// Gateway answered with a non-success status
    #[error("Failed to send SMS via gateway (HTTP {status})")]
    Gateway {
        status: u16,
        details: Value,
        attempted: usize,
        invalid: Vec<String>,
    },

    /// Gateway could not be reached
    #[error("Gateway unreachable: {0}")]
    Network(String),

    #[error("Could not read gateway settings: {0}")]
    Storage(#[from] ews_common::Error),
}

impl DeliveryError {
    /// True when the gateway was actually called, so the send belongs in history
    pub fn was_attempted(&self) -> bool {
        matches!(self, DeliveryError::Gateway { .. } | DeliveryError::Network(_))
    }

    pub(crate) fn status_code(&self) -> StatusCode {
        match self {
            DeliveryError::EmptyMessage
            | DeliveryError::NoRecipients
            | DeliveryError::MissingCredentials { .. }
            | DeliveryError::NoValidNumbers { .. } => StatusCode::BAD_REQUEST,
            DeliveryError::Gateway { .. } | DeliveryError::Network(_) => StatusCode::BAD_GATEWAY,
            DeliveryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn error_code(&self) -> &'static str {
        match self {
            DeliveryError::EmptyMessage | DeliveryError::NoRecipients => "BAD_REQUEST",
            DeliveryError::MissingCredentials { .. } => "CONFIGURATION_ERROR",
            DeliveryError::NoValidNumbers { .. } => "NO_VALID_NUMBERS",
            DeliveryError::Gateway { .. } => "GATEWAY_ERROR",
            DeliveryError::Network(_) => "GATEWAY_UNREACHABLE",
            DeliveryError::Storage(_) => "INTERNAL_ERROR",
        }
    }

    /// Extra envelope fields for the JSON error body
    pub(crate) fn details(&self) -> Map<String, Value> {
        let value = match self {
            DeliveryError::MissingCredentials { missing } => json!({ "missing": missing }),
            DeliveryError::NoValidNumbers { invalid } => json!({ "invalid_numbers": invalid }),
            DeliveryError::Gateway {
                status,
                details,
                attempted,
                invalid,
            } => json!({
                "details": details,
                "gateway_status": status,
                "valid_numbers_attempted": attempted,
                "invalid_numbers_rejected": invalid.len(),
                "invalid_numbers": invalid,
            }),
            _ => json!({}),
        };

        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Successful gateway hand-off
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub success: bool,
    pub message_id: Option<String>,
    pub valid_numbers_count: usize,
    pub invalid_numbers_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_numbers: Vec<String>,
    /// HTTP status the gateway answered with
    pub gateway_status: u16,
    /// Raw gateway response body
    pub response: Value,
}

/// Reject sends that can be refused without any I/O
pub fn validate_request(message: &str, recipients: &[String]) -> Result<(), DeliveryError> {
    if message.trim().is_empty() {
        return Err(DeliveryError::EmptyMessage);
    }
    if recipients.is_empty() {
        return Err(DeliveryError::NoRecipients);
    }
    Ok(())
}

/// Send `message` to `recipients` through the gateway
pub async fn deliver(
    state: &AppState,
    message: &str,
    recipients: &[String],
) -> Result<DeliveryReport, DeliveryError> {
    validate_request(message, recipients)?;

    let stored = db::settings::get(&state.db).await?;
    let credentials = resolve_credentials(&stored, &state.gateway_config).map_err(|missing| {
        warn!(?missing, "Gateway credentials incomplete");
        DeliveryError::MissingCredentials { missing }
    })?;

    let PartitionedNumbers { valid, invalid } = partition_numbers(recipients);
    info!(
        valid = valid.len(),
        invalid = invalid.len(),
        "Processing recipients"
    );
    if !invalid.is_empty() {
        warn!(?invalid, "Rejected invalid phone numbers");
    }
    if valid.is_empty() {
        return Err(DeliveryError::NoValidNumbers { invalid });
    }

    match state.gateway.send(&credentials, &valid, message).await {
        Ok(accepted) => {
            info!(
                status = accepted.status,
                message_id = accepted.message_id.as_deref().unwrap_or("-"),
                recipients = valid.len(),
                "SMS accepted by gateway"
            );
            Ok(DeliveryReport {
                success: true,
                message_id: accepted.message_id,
                valid_numbers_count: valid.len(),
                invalid_numbers_count: invalid.len(),
                invalid_numbers: invalid,
                gateway_status: accepted.status,
                response: accepted.body,
            })
        }
        Err(GatewayError::Rejected { status, body }) => {
            warn!(status, details = %body, "Gateway rejected SMS");
            Err(DeliveryError::Gateway {
                status,
                details: body,
                attempted: valid.len(),
                invalid,
            })
        }
        Err(GatewayError::Network(e)) => {
            warn!(error = %e, "Gateway request failed");
            Err(DeliveryError::Network(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message_rejected() {
        let recipients = vec!["0241234567".to_string()];
        assert!(matches!(
            validate_request("   ", &recipients),
            Err(DeliveryError::EmptyMessage)
        ));
    }

    #[test]
    fn test_empty_recipient_list_rejected() {
        assert!(matches!(
            validate_request("Flood warning", &[]),
            Err(DeliveryError::NoRecipients)
        ));
    }

    #[test]
    fn test_only_gateway_failures_count_as_attempted() {
        let gateway = DeliveryError::Gateway {
            status: 401,
            details: Value::Null,
            attempted: 2,
            invalid: Vec::new(),
        };
        assert!(gateway.was_attempted());
        assert!(DeliveryError::Network("timeout".to_string()).was_attempted());
        assert!(!DeliveryError::EmptyMessage.was_attempted());
        assert!(!DeliveryError::MissingCredentials { missing: vec!["client_id"] }.was_attempted());
    }

    #[test]
    fn test_missing_credentials_message_names_fields() {
        let err = DeliveryError::MissingCredentials {
            missing: vec!["sender_id", "client_secret"],
        };
        assert_eq!(
            err.to_string(),
            "Missing gateway credentials: sender_id, client_secret"
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_gateway_error_details_envelope() {
        let err = DeliveryError::Gateway {
            status: 401,
            details: json!({"Message": "Invalid credentials"}),
            attempted: 3,
            invalid: vec!["12345".to_string()],
        };
        let details = err.details();
        assert_eq!(details["gateway_status"], 401);
        assert_eq!(details["valid_numbers_attempted"], 3);
        assert_eq!(details["invalid_numbers_rejected"], 1);
        assert_eq!(details["details"]["Message"], "Invalid credentials");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
