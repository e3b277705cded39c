//! Message history queries
//!
//! The log is append-only from the service's point of view; the only
//! mutation besides insert is an operator deleting a row.

use chrono::Utc;
use ews_common::db::{MessageHistoryRecord, MessageStatus};
use ews_common::{uuid_utils, Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::pagination::{calculate_pagination, Pagination, PAGE_SIZE};

/// Fields supplied by the caller when logging a send
#[derive(Debug, Clone)]
pub struct NewHistoryRecord {
    pub message_text: String,
    pub recipient_count: i64,
    pub status: MessageStatus,
    pub groups: Vec<String>,
    pub dialects: Vec<String>,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

fn record_from_row(row: &SqliteRow) -> Result<MessageHistoryRecord> {
    let status: &str = row.get("status");
    Ok(MessageHistoryRecord {
        id: uuid_utils::parse_column(row.get("id"))?,
        message_text: row.get("message_text"),
        recipient_count: row.get("recipient_count"),
        status: status.parse().map_err(Error::Internal)?,
        groups: serde_json::from_str(row.get("groups"))?,
        dialects: serde_json::from_str(row.get("dialects"))?,
        message_id: row.get("message_id"),
        error: row.get("error"),
        created_at: row.get("created_at"),
    })
}

pub async fn insert(db: &SqlitePool, record: NewHistoryRecord) -> Result<MessageHistoryRecord> {
    let id = uuid_utils::generate();

    sqlx::query(
        r#"
        INSERT INTO message_history
            (id, message_text, recipient_count, status, groups, dialects, message_id, error, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&record.message_text)
    .bind(record.recipient_count)
    .bind(record.status.as_str())
    .bind(serde_json::to_string(&record.groups)?)
    .bind(serde_json::to_string(&record.dialects)?)
    .bind(&record.message_id)
    .bind(&record.error)
    .bind(Utc::now())
    .execute(db)
    .await?;

    tracing::info!(
        history_id = %id,
        status = %record.status,
        recipients = record.recipient_count,
        "Recorded message history"
    );

    get(db, id).await
}

pub async fn get(db: &SqlitePool, id: Uuid) -> Result<MessageHistoryRecord> {
    let row = sqlx::query("SELECT * FROM message_history WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Message {}", id)))?;

    record_from_row(&row)
}

/// One page of history, newest first
pub async fn list(
    db: &SqlitePool,
    status: Option<MessageStatus>,
    page: i64,
) -> Result<(Vec<MessageHistoryRecord>, i64, Pagination)> {
    let total = count(db, status).await?;
    let pagination = calculate_pagination(total, page);

    let mut sql = String::from("SELECT * FROM message_history");
    if status.is_some() {
        sql.push_str(" WHERE status = ?");
    }
    sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

    let mut query = sqlx::query(&sql);
    if let Some(status) = status {
        query = query.bind(status.as_str());
    }
    let rows = query
        .bind(PAGE_SIZE)
        .bind(pagination.offset)
        .fetch_all(db)
        .await?;

    let records = rows.iter().map(record_from_row).collect::<Result<Vec<_>>>()?;
    Ok((records, total, pagination))
}

/// Row count, optionally restricted to one status
pub async fn count(db: &SqlitePool, status: Option<MessageStatus>) -> Result<i64> {
    let count: i64 = match status {
        Some(status) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM message_history WHERE status = ?")
                .bind(status.as_str())
                .fetch_one(db)
                .await?
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(*) FROM message_history")
                .fetch_one(db)
                .await?
        }
    };
    Ok(count)
}

pub async fn delete(db: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM message_history WHERE id = ?")
        .bind(id.to_string())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Message {}", id)));
    }

    Ok(())
}
