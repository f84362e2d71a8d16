use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::app_state::AppState;
use crate::matches::handlers::{
    clear_matches, delete_matches, init_schema, list_matches, method_not_allowed, upsert_match,
};
use crate::probe::probe_connection;

/// Route table shared by the server binary and the tests. CORS is wide open
/// by design (the consumer is a static frontend on another origin) and wraps
/// error responses too.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers([CONTENT_TYPE]);

    let trace_layer =
        TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route(
            "/v1/matches",
            get(list_matches)
                .post(upsert_match)
                .delete(delete_matches)
                .fallback(method_not_allowed),
        )
        .route("/v1/init", post(init_schema).fallback(method_not_allowed))
        .route("/v1/clear", post(clear_matches).fallback(method_not_allowed))
        .route("/v1/test", get(probe_connection).fallback(method_not_allowed))
        .layer(cors)
        .layer(trace_layer)
        .with_state(state)
}
