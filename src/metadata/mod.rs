//! Append-only records of generated codes
//!
//! The generator only ever creates the schema and inserts rows; reading the
//! store back is left to other tools.

mod sqlite;

pub use sqlite::{DEFAULT_TABLE, SqliteMetadataStore};

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

/// Metadata for one generated code
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QrRecord {
    /// Random identifier, also used in the output file name
    pub id: Uuid,
    /// Text encoded in the symbol
    pub encoded_text: String,
    /// Author recorded with the code
    pub author: String,
    /// Generation time
    pub created_at: DateTime<Local>,
    /// Free-form description
    pub description: String,
}

/// Destination for [`QrRecord`]s
#[async_trait]
pub trait MetadataSink: Send + Sync {
    /// Create the backing table if it does not exist yet
    async fn ensure_schema(&self) -> Result<()>;

    /// Append one record; inserting an existing id fails with
    /// [`Error::MetadataWrite`](crate::Error::MetadataWrite)
    async fn insert(&self, record: &QrRecord) -> Result<()>;
}
