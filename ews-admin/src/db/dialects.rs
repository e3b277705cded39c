//! Dialect queries

use chrono::Utc;
use ews_common::db::Dialect;
use ews_common::{uuid_utils, Error, Result};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{map_write_error, required};

#[derive(Debug, Clone, Deserialize)]
pub struct DialectInput {
    pub name: String,
}

const SELECT_DIALECTS: &str = r#"
    SELECT d.id, d.name, d.created_at,
           (SELECT COUNT(*) FROM member_dialects md WHERE md.dialect_id = d.id) AS member_count
    FROM dialects d
"#;

fn dialect_from_row(row: &SqliteRow) -> Result<Dialect> {
    Ok(Dialect {
        id: uuid_utils::parse_column(row.get("id"))?,
        name: row.get("name"),
        member_count: row.get("member_count"),
        created_at: row.get("created_at"),
    })
}

/// All dialects ordered by name
pub async fn list(db: &SqlitePool) -> Result<Vec<Dialect>> {
    let rows = sqlx::query(&format!("{} ORDER BY d.name COLLATE NOCASE", SELECT_DIALECTS))
        .fetch_all(db)
        .await?;

    rows.iter().map(dialect_from_row).collect()
}

pub async fn get(db: &SqlitePool, id: Uuid) -> Result<Dialect> {
    let row = sqlx::query(&format!("{} WHERE d.id = ?", SELECT_DIALECTS))
        .bind(id.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Dialect {}", id)))?;

    dialect_from_row(&row)
}

pub async fn create(db: &SqlitePool, input: &DialectInput) -> Result<Dialect> {
    let name = required(&input.name, "Dialect name")?;
    let id = uuid_utils::generate();

    sqlx::query("INSERT INTO dialects (id, name, created_at) VALUES (?, ?, ?)")
        .bind(id.to_string())
        .bind(&name)
        .bind(Utc::now())
        .execute(db)
        .await
        .map_err(|e| map_write_error(e, || format!("Dialect '{}' already exists", name)))?;

    get(db, id).await
}

pub async fn update(db: &SqlitePool, id: Uuid, input: &DialectInput) -> Result<Dialect> {
    let name = required(&input.name, "Dialect name")?;

    let result = sqlx::query("UPDATE dialects SET name = ? WHERE id = ?")
        .bind(&name)
        .bind(id.to_string())
        .execute(db)
        .await
        .map_err(|e| map_write_error(e, || format!("Dialect '{}' already exists", name)))?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Dialect {}", id)));
    }

    get(db, id).await
}

/// Delete a dialect; member links go with it
pub async fn delete(db: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM dialects WHERE id = ?")
        .bind(id.to_string())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Dialect {}", id)));
    }

    Ok(())
}

pub async fn count(db: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM dialects")
        .fetch_one(db)
        .await?)
}

/// Members linked to any of the given dialects (active or not)
pub async fn member_ids(db: &SqlitePool, dialect_ids: &[Uuid]) -> Result<Vec<Uuid>> {
    super::linked_member_ids(db, "member_dialects", "dialect_id", dialect_ids).await
}

/// Dialect names for a history snapshot
pub async fn names(db: &SqlitePool, dialect_ids: &[Uuid]) -> Result<Vec<String>> {
    super::names_by_ids(db, "dialects", dialect_ids).await
}
