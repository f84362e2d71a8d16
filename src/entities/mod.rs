use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;

/// --- Tables ---

/// One persisted match row. Columns are snake_case; the camelCase wire shape
/// lives in `matches::dtos`.
#[derive(Debug, Clone, FromRow)]
pub struct MatchRow {
    pub id: i32,
    pub game_key: String,
    pub club: Option<String>,
    pub address: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub jersey_parent: Option<String>,
    // JSONB columns; NULL in rows written by older revisions of the schema.
    pub drivers: Option<Json<serde_json::Value>>,
    pub snack_parents: Option<Json<serde_json::Value>>,
    pub attendance: Option<Json<serde_json::Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Number of named driver slots every record carries on read.
pub const DRIVER_SLOTS: usize = 3;
/// Number of named snack-provider slots every record carries on read.
pub const SNACK_SLOTS: usize = 2;

/// Normalized mutable fields of a match, ready to persist. Produced from the
/// wire DTO after defaulting and slot normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFields {
    pub club: String,
    pub address: String,
    pub time: String,
    pub location: String,
    pub jersey_parent: String,
    pub drivers: Vec<String>,
    pub snack_parents: Vec<String>,
    pub attendance: std::collections::BTreeMap<String, String>,
}

/// --- Diagnostics ---

/// Result of the connectivity probe (`SELECT NOW(), version()`).
#[derive(Debug, Clone, FromRow)]
pub struct DbProbe {
    pub now: DateTime<Utc>,
    pub version: String,
}

/// What the schema guard did on a given invocation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SchemaSummary {
    /// True when the matches table was created by this call.
    pub created: bool,
    /// Columns added to an existing table to repair drift.
    pub columns_added: Vec<String>,
}
