//! Member queries
//!
//! A member row plus its group and dialect links. Writes replace the full link
//! set inside one transaction so a member never ends up half-tagged.

use chrono::Utc;
use ews_common::db::Member;
use ews_common::{uuid_utils, Error, Result};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

use super::{map_write_error, optional, push_id_list};

/// Create/update payload for a member
#[derive(Debug, Clone, Deserialize)]
pub struct MemberInput {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub group_ids: Vec<Uuid>,
    #[serde(default)]
    pub dialect_ids: Vec<Uuid>,
}

fn default_active() -> bool {
    true
}

impl MemberInput {
    fn validated(&self) -> Result<(String, String)> {
        let name = self.name.trim();
        let phone = self.phone.trim();
        if name.is_empty() || phone.is_empty() {
            return Err(Error::InvalidInput("Name and phone are required".to_string()));
        }
        Ok((name.to_string(), phone.to_string()))
    }
}

type LinkMap = HashMap<Uuid, Vec<Uuid>>;

fn member_from_row(row: &SqliteRow, groups: &LinkMap, dialects: &LinkMap) -> Result<Member> {
    let id = uuid_utils::parse_column(row.get("id"))?;
    Ok(Member {
        id,
        name: row.get("name"),
        phone: row.get("phone"),
        location: row.get("location"),
        occupation: row.get("occupation"),
        is_active: row.get("is_active"),
        group_ids: groups.get(&id).cloned().unwrap_or_default(),
        dialect_ids: dialects.get(&id).cloned().unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Load link rows keyed by member, optionally for a single member
async fn load_links(
    db: &SqlitePool,
    link_table: &'static str,
    key_column: &'static str,
    member: Option<Uuid>,
) -> Result<LinkMap> {
    let mut sql = format!("SELECT member_id, {} AS linked_id FROM {}", key_column, link_table);
    if member.is_some() {
        sql.push_str(" WHERE member_id = ?");
    }
    sql.push_str(" ORDER BY linked_id");

    let mut query = sqlx::query(&sql);
    if let Some(id) = member {
        query = query.bind(id.to_string());
    }

    let mut links = LinkMap::new();
    for row in query.fetch_all(db).await? {
        let member_id = uuid_utils::parse_column(row.get("member_id"))?;
        let linked_id = uuid_utils::parse_column(row.get("linked_id"))?;
        links.entry(member_id).or_default().push(linked_id);
    }

    Ok(links)
}

/// Members newest first, optionally filtered by active flag
pub async fn list(db: &SqlitePool, active: Option<bool>) -> Result<Vec<Member>> {
    let mut sql = String::from("SELECT * FROM members");
    if active.is_some() {
        sql.push_str(" WHERE is_active = ?");
    }
    sql.push_str(" ORDER BY created_at DESC, name");

    let mut query = sqlx::query(&sql);
    if let Some(flag) = active {
        query = query.bind(flag);
    }
    let rows = query.fetch_all(db).await?;

    let groups = load_links(db, "member_groups", "group_id", None).await?;
    let dialects = load_links(db, "member_dialects", "dialect_id", None).await?;

    rows.iter()
        .map(|row| member_from_row(row, &groups, &dialects))
        .collect()
}

pub async fn get(db: &SqlitePool, id: Uuid) -> Result<Member> {
    let row = sqlx::query("SELECT * FROM members WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Member {}", id)))?;

    let groups = load_links(db, "member_groups", "group_id", Some(id)).await?;
    let dialects = load_links(db, "member_dialects", "dialect_id", Some(id)).await?;

    member_from_row(&row, &groups, &dialects)
}

pub async fn create(db: &SqlitePool, input: &MemberInput) -> Result<Member> {
    let (name, phone) = input.validated()?;
    let id = uuid_utils::generate();
    let now = Utc::now();

    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO members (id, name, phone, location, occupation, is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&name)
    .bind(&phone)
    .bind(optional(input.location.as_deref()))
    .bind(optional(input.occupation.as_deref()))
    .bind(input.is_active)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    replace_links(&mut *tx, id, input).await?;
    tx.commit().await?;

    tracing::debug!(member_id = %id, "Created member");
    get(db, id).await
}

pub async fn update(db: &SqlitePool, id: Uuid, input: &MemberInput) -> Result<Member> {
    let (name, phone) = input.validated()?;

    let mut tx = db.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE members
        SET name = ?, phone = ?, location = ?, occupation = ?, is_active = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&name)
    .bind(&phone)
    .bind(optional(input.location.as_deref()))
    .bind(optional(input.occupation.as_deref()))
    .bind(input.is_active)
    .bind(Utc::now())
    .bind(id.to_string())
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Member {}", id)));
    }

    replace_links(&mut *tx, id, input).await?;
    tx.commit().await?;

    get(db, id).await
}

/// Replace a member's group and dialect links with the ones in `input`
async fn replace_links(conn: &mut SqliteConnection, id: Uuid, input: &MemberInput) -> Result<()> {
    for (table, column, ids) in [
        ("member_groups", "group_id", &input.group_ids),
        ("member_dialects", "dialect_id", &input.dialect_ids),
    ] {
        sqlx::query(&format!("DELETE FROM {} WHERE member_id = ?", table))
            .bind(id.to_string())
            .execute(&mut *conn)
            .await?;

        let sql = format!(
            "INSERT OR IGNORE INTO {} (member_id, {}) VALUES (?, ?)",
            table, column
        );
        for linked in ids {
            sqlx::query(&sql)
                .bind(id.to_string())
                .bind(linked.to_string())
                .execute(&mut *conn)
                .await
                .map_err(|e| map_write_error(e, String::new))?;
        }
    }

    Ok(())
}

/// Delete a member; links go with it
pub async fn delete(db: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM members WHERE id = ?")
        .bind(id.to_string())
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Member {}", id)));
    }

    Ok(())
}

/// Phone numbers of the active members among `ids`
///
/// Inactive and unknown ids are silently absent from the map.
pub async fn active_phones(db: &SqlitePool, ids: &[Uuid]) -> Result<HashMap<Uuid, String>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id, phone FROM members WHERE is_active = 1 AND id IN (");
    push_id_list(&mut query, ids);
    query.push(")");

    let mut phones = HashMap::new();
    for row in query.build().fetch_all(db).await? {
        phones.insert(uuid_utils::parse_column(row.get("id"))?, row.get("phone"));
    }

    Ok(phones)
}

pub async fn count(db: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM members")
        .fetch_one(db)
        .await?)
}

pub async fn count_active(db: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE is_active = 1")
        .fetch_one(db)
        .await?)
}
