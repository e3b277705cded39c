//! SMS template queries

use chrono::Utc;
use ews_common::db::SmsTemplate;
use ews_common::{uuid_utils, Error, Result};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::required;

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateInput {
    pub title: String,
    pub content: String,
}

fn template_from_row(row: &SqliteRow) -> Result<SmsTemplate> {
    Ok(SmsTemplate {
        id: uuid_utils::parse_column(row.get("id"))?,
        title: row.get("title"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Templates newest first
pub async fn list(db: &SqlitePool) -> Result<Vec<SmsTemplate>> {
    let rows = sqlx::query("SELECT * FROM sms_templates ORDER BY created_at DESC, title")
        .fetch_all(db)
        .await?;

    rows.iter().map(template_from_row).collect()
}

pub async fn get(db: &SqlitePool, id: Uuid) -> Result<SmsTemplate> {
    let row = sqlx::query("SELECT * FROM sms_templates WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Template {}", id)))?;

    template_from_row(&row)
}

pub async fn create(db: &SqlitePool, input: &TemplateInput) -> Result<SmsTemplate> {
    let title = required(&input.title, "Template title")?;
    let content = required(&input.content, "Template content")?;
    let id = uuid_utils::generate();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO sms_templates (id, title, content, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(title)
    .bind(content)
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    get(db, id).await
}

pub async fn update(db: &SqlitePool, id: Uuid, input: &TemplateInput) -> Result<SmsTemplate> {
    let title = required(&input.title, "Template title")?;
    let content = required(&input.content, "Template content")?;

    let result = sqlx::query(
        "UPDATE sms_templates SET title = ?, content = ?, updated_at = ? WHERE id = ?",
    )
    .bind(title)
    .bind(content)
    .bind(Utc::now())
    .bind(id.to_string())
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Template {}", id)));
    }

    get(db, id).await
}

pub async fn delete(db: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM sms_templates WHERE id = ?")
        .bind(id.to_string())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Template {}", id)));
    }

    Ok(())
}
