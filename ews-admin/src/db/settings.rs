//! Gateway settings queries
//!
//! The settings table holds at most one row (id = 1). Saving merges the
//! submitted fields into whatever is stored.

use chrono::Utc;
use ews_common::db::GatewaySettings;
use ews_common::Result;
use serde::Deserialize;
use sqlx::{Row, SqlitePool};

use super::optional;

/// Settings update payload
///
/// A field left out keeps its stored value; an empty string clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsInput {
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Stored gateway settings, or all-empty settings if never saved
pub async fn get(db: &SqlitePool) -> Result<GatewaySettings> {
    let row = sqlx::query(
        "SELECT sender_id, client_id, client_secret, updated_at FROM settings WHERE id = 1",
    )
    .fetch_optional(db)
    .await?;

    Ok(match row {
        Some(row) => GatewaySettings {
            sender_id: row.get("sender_id"),
            client_id: row.get("client_id"),
            client_secret: row.get("client_secret"),
            updated_at: Some(row.get("updated_at")),
        },
        None => GatewaySettings::default(),
    })
}

/// Insert or update the singleton settings row
pub async fn save(db: &SqlitePool, input: &SettingsInput) -> Result<GatewaySettings> {
    let current = get(db).await?;

    let merge = |submitted: &Option<String>, stored: Option<String>| match submitted {
        Some(value) => optional(Some(value.as_str())),
        None => stored,
    };
    let sender_id = merge(&input.sender_id, current.sender_id);
    let client_id = merge(&input.client_id, current.client_id);
    let client_secret = merge(&input.client_secret, current.client_secret);

    sqlx::query(
        r#"
        INSERT INTO settings (id, sender_id, client_id, client_secret, updated_at)
        VALUES (1, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            sender_id = excluded.sender_id,
            client_id = excluded.client_id,
            client_secret = excluded.client_secret,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&sender_id)
    .bind(&client_id)
    .bind(&client_secret)
    .bind(Utc::now())
    .execute(db)
    .await?;

    tracing::info!("Gateway settings saved");
    get(db).await
}
