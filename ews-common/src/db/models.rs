//! Database models
//!
//! Row types shared by the query modules and the JSON API. Ids are UUIDv4
//! stored as TEXT; timestamps are UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A person who may receive broadcasts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    /// Delivery address as entered by the operator
    pub phone: String,
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub is_active: bool,
    pub group_ids: Vec<Uuid>,
    pub dialect_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tagging dimension used to select recipients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Language dimension used to select recipients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dialect {
    pub id: Uuid,
    pub name: String,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Reusable canned message text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsTemplate {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome recorded for a send
///
/// `Sent` means the gateway accepted the request. Nothing in this service
/// writes `Delivered`; it exists for rows reconciled by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(MessageStatus::Sent),
            "delivered" => Ok(MessageStatus::Delivered),
            "failed" => Ok(MessageStatus::Failed),
            other => Err(format!("unknown message status '{}'", other)),
        }
    }
}

/// One row of the send log
///
/// Group and dialect names are a snapshot taken at send time, so renaming or
/// deleting a group later does not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageHistoryRecord {
    pub id: Uuid,
    pub message_text: String,
    pub recipient_count: i64,
    pub status: MessageStatus,
    pub groups: Vec<String>,
    pub dialects: Vec<String>,
    /// Gateway-assigned id, present when the gateway accepted the message
    pub message_id: Option<String>,
    /// Failure summary for `Failed` rows
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Stored gateway credentials (singleton row)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySettings {
    pub sender_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_status_parse_and_display() {
        for status in [MessageStatus::Sent, MessageStatus::Delivered, MessageStatus::Failed] {
            assert_eq!(status.as_str().parse::<MessageStatus>().unwrap(), status);
            assert_eq!(status.to_string(), status.as_str());
        }
        assert!("queued".parse::<MessageStatus>().is_err());
    }

    #[test]
    fn test_message_status_serializes_lowercase() {
        let json = serde_json::to_string(&MessageStatus::Failed).unwrap();
        assert_eq!(json, "\"failed\"");
    }
}
