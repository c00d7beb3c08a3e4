use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Request-terminal failures. Every variant maps to one status code and a
/// JSON `{"error": "..."}` body; upstream and internal detail stays in the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authentication credentials were not provided")]
    AuthRequired,
    #[error("{0}")]
    NotFound(String),
    #[error("Failed to fetch stock data")]
    Upstream,
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidCredentials | ApiError::Upstream => {
                StatusCode::BAD_REQUEST
            }
            ApiError::AuthRequired => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Internal(ref e) = self {
            error!(error = %e, "internal error");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            if db.is_unique_violation() {
                let field = db.constraint().and_then(constraint_field);
                return match field {
                    Some(f) => ApiError::Validation(format!("{f} already exists")),
                    None => ApiError::Validation("Already exists".into()),
                };
            }
        }
        ApiError::Internal(e.into())
    }
}

fn constraint_field(constraint: &str) -> Option<&'static str> {
    match constraint {
        "users_email_key" => Some("Email"),
        "users_username_key" => Some("Username"),
        _ => None,
    }
}
