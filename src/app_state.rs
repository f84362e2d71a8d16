use crate::errors::ApiError;
use crate::repositories::{MatchRepository, MatchStore};
use sqlx::{Pool, Postgres};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub matches: Arc<dyn MatchStore + Send + Sync>,
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(pool: Pool<Postgres>, expose_error_details: bool) -> Self {
        Self {
            matches: Arc::new(MatchRepository::new(pool)),
            expose_error_details,
        }
    }

    /// Wrap a query-layer failure, carrying the detail-exposure policy along.
    pub fn database_error(&self, source: sqlx::Error) -> ApiError {
        ApiError::Database {
            source,
            expose_details: self.expose_error_details,
        }
    }
}
