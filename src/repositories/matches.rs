use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Pool, Postgres};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::entities::{DbProbe, MatchFields, MatchRow, SchemaSummary};

/// Delay before the single retry of a transiently failed statement.
const RETRY_DELAY: Duration = Duration::from_millis(250);

/// Same DDL as `migrations/0001_create_matches.sql`; applied by the schema
/// guard for databases that predate sqlx-managed migrations.
const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS matches (
    id SERIAL PRIMARY KEY,
    game_key TEXT NOT NULL,
    club TEXT,
    address TEXT,
    time TEXT,
    location TEXT,
    jersey_parent TEXT,
    drivers JSONB,
    snack_parents JSONB,
    attendance JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_KEY_INDEX_SQL: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS matches_game_key_idx ON matches (game_key)";

/// Columns an older revision of the table may be missing, with the DDL type
/// used to add them in place.
const REQUIRED_COLUMNS: &[(&str, &str)] = &[
    ("game_key", "TEXT NOT NULL DEFAULT ''"),
    ("club", "TEXT"),
    ("address", "TEXT"),
    ("time", "TEXT"),
    ("location", "TEXT"),
    ("jersey_parent", "TEXT"),
    ("drivers", "JSONB"),
    ("snack_parents", "JSONB"),
    ("attendance", "JSONB"),
    ("created_at", "TIMESTAMPTZ NOT NULL DEFAULT now()"),
    ("updated_at", "TIMESTAMPTZ NOT NULL DEFAULT now()"),
];

/// Data-access contract for match records. Handlers depend on this trait so
/// unit tests can substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchStore {
    /// Create the matches table if absent, or add any missing columns to an
    /// existing table. Idempotent; never drops data.
    async fn ensure_schema(&self) -> Result<SchemaSummary, sqlx::Error>;

    /// All rows ordered by game key ascending.
    async fn list_matches(&self) -> Result<Vec<MatchRow>, sqlx::Error>;

    /// Atomic insert-or-update keyed on `game_key`; refreshes `updated_at`.
    async fn upsert_match(
        &self,
        game_key: String,
        fields: MatchFields,
    ) -> Result<(), sqlx::Error>;

    /// Delete every row; returns the number removed.
    async fn clear_matches(&self) -> Result<u64, sqlx::Error>;

    /// Trivial read-only query confirming the database is reachable.
    async fn probe(&self) -> Result<DbProbe, sqlx::Error>;
}

/// Repository for match persistence on Postgres.
#[derive(Clone)]
pub struct MatchRepository {
    pool: Pool<Postgres>,
}

impl MatchRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn table_exists(&self) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = 'matches'
            )
            "#,
        )
        .fetch_one(&self.pool)
        .await
    }

    async fn existing_columns(&self) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT column_name FROM information_schema.columns
            WHERE table_schema = 'public' AND table_name = 'matches'
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

fn is_transient(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut)
}

/// Run a statement, retrying exactly once after a short delay if it failed
/// with a transient connectivity error.
async fn with_retry<T, F, Fut>(op: F) -> Result<T, sqlx::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match op().await {
        Err(err) if is_transient(&err) => {
            warn!("transient database error, retrying once: {err}");
            tokio::time::sleep(RETRY_DELAY).await;
            op().await
        }
        result => result,
    }
}

#[async_trait]
impl MatchStore for MatchRepository {
    async fn ensure_schema(&self) -> Result<SchemaSummary, sqlx::Error> {
        if !self.table_exists().await? {
            info!("creating matches table");
            sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
            sqlx::query(CREATE_KEY_INDEX_SQL)
                .execute(&self.pool)
                .await?;
            return Ok(SchemaSummary {
                created: true,
                columns_added: Vec::new(),
            });
        }

        // Table already exists: repair drift by adding missing columns in
        // place, never by dropping data.
        let existing = self.existing_columns().await?;
        let mut columns_added = Vec::new();
        for (name, ddl_type) in REQUIRED_COLUMNS {
            if !existing.iter().any(|c| c == name) {
                let stmt = format!("ALTER TABLE matches ADD COLUMN IF NOT EXISTS {name} {ddl_type}");
                sqlx::query(&stmt).execute(&self.pool).await?;
                columns_added.push((*name).to_string());
            }
        }
        sqlx::query(CREATE_KEY_INDEX_SQL)
            .execute(&self.pool)
            .await?;
        if !columns_added.is_empty() {
            info!("added missing columns to matches table: {columns_added:?}");
        }
        Ok(SchemaSummary {
            created: false,
            columns_added,
        })
    }

    async fn list_matches(&self) -> Result<Vec<MatchRow>, sqlx::Error> {
        with_retry(|| async {
            sqlx::query_as::<_, MatchRow>(
                r#"
                SELECT id, game_key, club, address, time, location, jersey_parent,
                       drivers, snack_parents, attendance, created_at, updated_at
                FROM matches
                ORDER BY game_key
                "#,
            )
            .fetch_all(&self.pool)
            .await
        })
        .await
    }

    async fn upsert_match(
        &self,
        game_key: String,
        fields: MatchFields,
    ) -> Result<(), sqlx::Error> {
        with_retry(|| async {
            sqlx::query(
                r#"
                INSERT INTO matches (
                    game_key, club, address, time, location, jersey_parent,
                    drivers, snack_parents, attendance
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (game_key) DO UPDATE SET
                    club = EXCLUDED.club,
                    address = EXCLUDED.address,
                    time = EXCLUDED.time,
                    location = EXCLUDED.location,
                    jersey_parent = EXCLUDED.jersey_parent,
                    drivers = EXCLUDED.drivers,
                    snack_parents = EXCLUDED.snack_parents,
                    attendance = EXCLUDED.attendance,
                    updated_at = now()
                "#,
            )
            .bind(&game_key)
            .bind(&fields.club)
            .bind(&fields.address)
            .bind(&fields.time)
            .bind(&fields.location)
            .bind(&fields.jersey_parent)
            .bind(Json(&fields.drivers))
            .bind(Json(&fields.snack_parents))
            .bind(Json(&fields.attendance))
            .execute(&self.pool)
            .await?;
            Ok(())
        })
        .await
    }

    async fn clear_matches(&self) -> Result<u64, sqlx::Error> {
        let deleted = with_retry(|| async {
            let result = sqlx::query("DELETE FROM matches").execute(&self.pool).await?;
            Ok(result.rows_affected())
        })
        .await?;
        // Cosmetic: the natural key is the true identity, but restarting the
        // surrogate sequence keeps fresh databases tidy.
        sqlx::query("ALTER SEQUENCE matches_id_seq RESTART WITH 1")
            .execute(&self.pool)
            .await?;
        Ok(deleted)
    }

    async fn probe(&self) -> Result<DbProbe, sqlx::Error> {
        with_retry(|| async {
            sqlx::query_as::<_, DbProbe>("SELECT now() AS now, version() AS version")
                .fetch_one(&self.pool)
                .await
        })
        .await
    }
}
