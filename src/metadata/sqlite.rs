//! SQLite-backed metadata sink

use super::{MetadataSink, QrRecord};
use crate::error::{Error, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Default table name for generated code metadata
pub const DEFAULT_TABLE: &str = "qr_metadata";

/// Metadata sink writing to a caller-owned SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteMetadataStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteMetadataStore {
    /// Wrap an open pool, writing into `table`.
    ///
    /// The table name is interpolated into SQL, so only ASCII letters, digits
    /// and underscores are accepted.
    pub fn new(pool: SqlitePool, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self { pool, table })
    }

    /// Open (creating if needed) the database file at `path`.
    pub async fn open_pool(path: &Path) -> Result<SqlitePool> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| Error::Database(format!("Failed to open {}: {e}", path.display())))
    }

    /// Open the database file at `path` and wrap it.
    pub async fn open(path: &Path, table: impl Into<String>) -> Result<Self> {
        let pool = Self::open_pool(path).await?;
        Self::new(pool, table)
    }

    /// Table records are written to
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl MetadataSink for SqliteMetadataStore {
    async fn ensure_schema(&self) -> Result<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                url TEXT NOT NULL,
                author TEXT,
                created_at TEXT,
                description TEXT
            )",
            self.table
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, record: &QrRecord) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (id, url, author, created_at, description) VALUES (?, ?, ?, ?, ?)",
            self.table
        );
        sqlx::query(&sql)
            .bind(record.id.to_string())
            .bind(record.encoded_text.as_str())
            .bind(record.author.as_str())
            .bind(record.created_at.to_rfc3339())
            .bind(record.description.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::MetadataWrite(format!("record {}: {e}", record.id)))?;

        tracing::debug!(id = %record.id, table = %self.table, "Stored QR metadata");
        Ok(())
    }
}

fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(Error::Config(format!("Invalid metadata table name '{name}'")))
    }
}
