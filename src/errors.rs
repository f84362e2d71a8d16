use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::config::ConfigError;

/// JSON body returned for every non-2xx response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("server configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Validation(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("database error: {source}")]
    Database {
        #[source]
        source: sqlx::Error,
        /// When false the underlying message is logged but not returned.
        expose_details: bool,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Config(err) => {
                error!("configuration error: {err}");
                ErrorResponse {
                    error: "Server configuration error".to_string(),
                    details: Some(format!(
                        "{err}; set the database connection string in the environment"
                    )),
                }
            }
            ApiError::Validation(message) => ErrorResponse {
                error: message.clone(),
                details: None,
            },
            ApiError::MethodNotAllowed => ErrorResponse {
                error: "Method not allowed".to_string(),
                details: None,
            },
            ApiError::Database {
                source,
                expose_details,
            } => {
                error!("database error: {source}");
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    details: expose_details.then(|| source.to_string()),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}
