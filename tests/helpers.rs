use axum::Router;
use sqlx::{Pool, Postgres};

use matchday::{app_state::AppState, router::router};

pub fn test_app(pool: Pool<Postgres>) -> Router {
    router(AppState::new(pool, false))
}
