//! Group queries

use chrono::Utc;
use ews_common::db::Group;
use ews_common::{uuid_utils, Error, Result};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{map_write_error, optional, required};

/// Create/update payload for a group
#[derive(Debug, Clone, Deserialize)]
pub struct GroupInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

const SELECT_GROUPS: &str = r#"
    SELECT g.id, g.name, g.description, g.created_at,
           (SELECT COUNT(*) FROM member_groups mg WHERE mg.group_id = g.id) AS member_count
    FROM groups g
"#;

fn group_from_row(row: &SqliteRow) -> Result<Group> {
    Ok(Group {
        id: uuid_utils::parse_column(row.get("id"))?,
        name: row.get("name"),
        description: row.get("description"),
        member_count: row.get("member_count"),
        created_at: row.get("created_at"),
    })
}

/// All groups ordered by name
pub async fn list(db: &SqlitePool) -> Result<Vec<Group>> {
    let rows = sqlx::query(&format!("{} ORDER BY g.name COLLATE NOCASE", SELECT_GROUPS))
        .fetch_all(db)
        .await?;

    rows.iter().map(group_from_row).collect()
}

pub async fn get(db: &SqlitePool, id: Uuid) -> Result<Group> {
    let row = sqlx::query(&format!("{} WHERE g.id = ?", SELECT_GROUPS))
        .bind(id.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Group {}", id)))?;

    group_from_row(&row)
}

pub async fn create(db: &SqlitePool, input: &GroupInput) -> Result<Group> {
    let name = required(&input.name, "Group name")?;
    let id = uuid_utils::generate();

    sqlx::query("INSERT INTO groups (id, name, description, created_at) VALUES (?, ?, ?, ?)")
        .bind(id.to_string())
        .bind(&name)
        .bind(optional(input.description.as_deref()))
        .bind(Utc::now())
        .execute(db)
        .await
        .map_err(|e| map_write_error(e, || format!("Group '{}' already exists", name)))?;

    get(db, id).await
}

pub async fn update(db: &SqlitePool, id: Uuid, input: &GroupInput) -> Result<Group> {
    let name = required(&input.name, "Group name")?;

    let result = sqlx::query("UPDATE groups SET name = ?, description = ? WHERE id = ?")
        .bind(&name)
        .bind(optional(input.description.as_deref()))
        .bind(id.to_string())
        .execute(db)
        .await
        .map_err(|e| map_write_error(e, || format!("Group '{}' already exists", name)))?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Group {}", id)));
    }

    get(db, id).await
}

/// Delete a group; member links go with it
pub async fn delete(db: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM groups WHERE id = ?")
        .bind(id.to_string())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Group {}", id)));
    }

    Ok(())
}

pub async fn count(db: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM groups")
        .fetch_one(db)
        .await?)
}

/// Members linked to any of the given groups (active or not)
pub async fn member_ids(db: &SqlitePool, group_ids: &[Uuid]) -> Result<Vec<Uuid>> {
    super::linked_member_ids(db, "member_groups", "group_id", group_ids).await
}

/// Group names for a history snapshot
pub async fn names(db: &SqlitePool, group_ids: &[Uuid]) -> Result<Vec<String>> {
    super::names_by_ids(db, "groups", group_ids).await
}
