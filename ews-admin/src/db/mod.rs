//! Database queries for ews-admin
//!
//! One module per table family. All functions take the pool explicitly and
//! return `ews_common::Result`.

pub mod dialects;
pub mod groups;
pub mod history;
pub mod members;
pub mod settings;
pub mod templates;

use ews_common::{uuid_utils, Error, Result};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

/// Map constraint failures to operator-facing errors
///
/// Unique violations become `Conflict`, foreign key violations (links to an
/// unknown group or dialect) become `InvalidInput`. Everything else stays a
/// database error.
pub(crate) fn map_write_error(err: sqlx::Error, conflict_msg: impl FnOnce() -> String) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return Error::Conflict(conflict_msg());
        }
        if db_err.is_foreign_key_violation() {
            return Error::InvalidInput("Referenced group or dialect does not exist".to_string());
        }
    }
    Error::Database(err)
}

/// Trim a required text field, rejecting blank input
pub(crate) fn required(value: &str, what: &str) -> ews_common::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", what)));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field, storing blank input as NULL
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Member ids linked to any of `ids` through a link table
///
/// `link_table` and `key_column` are compile-time constants from the calling
/// module, never user input.
pub(crate) async fn linked_member_ids(
    db: &SqlitePool,
    link_table: &'static str,
    key_column: &'static str,
    ids: &[Uuid],
) -> Result<Vec<Uuid>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT DISTINCT member_id FROM {} WHERE {} IN (",
        link_table, key_column
    ));
    push_id_list(&mut query, ids);
    query.push(") ORDER BY member_id");

    let rows: Vec<String> = query.build_query_scalar::<String>().fetch_all(db).await?;
    rows.iter().map(|id| uuid_utils::parse_column(id)).collect()
}

/// Names of the rows in `table` whose id is in `ids`, sorted by name
pub(crate) async fn names_by_ids(
    db: &SqlitePool,
    table: &'static str,
    ids: &[Uuid],
) -> Result<Vec<String>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT name FROM {} WHERE id IN (", table));
    push_id_list(&mut query, ids);
    query.push(") ORDER BY name COLLATE NOCASE");

    Ok(query.build_query_scalar::<String>().fetch_all(db).await?)
}

/// Append `?, ?, ...` bound to the given ids
pub(crate) fn push_id_list(query: &mut QueryBuilder<'_, Sqlite>, ids: &[Uuid]) {
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("  Farmers ", "Group name").unwrap(), "Farmers");
        let err = required("   ", "Group name").unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Group name is required");
    }

    #[test]
    fn test_optional_blank_becomes_none() {
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(None), None);
        assert_eq!(optional(Some(" Ho ")).as_deref(), Some("Ho"));
    }
}
