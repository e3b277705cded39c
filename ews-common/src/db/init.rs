//! Database initialization
//!
//! Creates the database file on first run and ensures every table exists.
//! Table creation is idempotent, so startup against an existing database is
//! a no-op apart from opening the pool.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Foreign keys must be on for every pooled connection, otherwise link
    // rows survive deletion of their member/group/dialect
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_members_table(&pool).await?;
    create_groups_table(&pool).await?;
    create_dialects_table(&pool).await?;

    // Linking tables
    create_member_groups_table(&pool).await?;
    create_member_dialects_table(&pool).await?;

    create_sms_templates_table(&pool).await?;
    create_message_history_table(&pool).await?;
    create_settings_table(&pool).await?;

    Ok(pool)
}

async fn create_members_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            phone TEXT NOT NULL,
            location TEXT,
            occupation TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_members_active ON members(is_active)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_groups_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS groups (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_dialects_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dialects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_member_groups_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS member_groups (
            member_id TEXT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            group_id TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
            PRIMARY KEY (member_id, group_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_member_groups_group ON member_groups(group_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_member_dialects_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS member_dialects (
            member_id TEXT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            dialect_id TEXT NOT NULL REFERENCES dialects(id) ON DELETE CASCADE,
            PRIMARY KEY (member_id, dialect_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_member_dialects_dialect ON member_dialects(dialect_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sms_templates_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sms_templates (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the message history table
///
/// `groups` and `dialects` hold JSON arrays of names captured at send time.
async fn create_message_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS message_history (
            id TEXT PRIMARY KEY,
            message_text TEXT NOT NULL,
            recipient_count INTEGER NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('sent', 'delivered', 'failed')),
            groups TEXT NOT NULL DEFAULT '[]',
            dialects TEXT NOT NULL DEFAULT '[]',
            message_id TEXT,
            error TEXT,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_message_history_created ON message_history(created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the settings table
///
/// The CHECK on `id` limits the table to a single row.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            sender_id TEXT,
            client_id TEXT,
            client_secret TEXT,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
