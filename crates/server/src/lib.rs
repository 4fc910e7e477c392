use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use identity::{
    GOOGLE_TOKENINFO_URL, IdentityError, IdentityVerifier, PassthroughVerifier, TokenInfoVerifier,
};
pub use server::{ServerState, router, run_with_listener};

mod accounts;
mod budgets;
mod categories;
mod expenses;
mod identity;
mod roles;
mod server;
mod sources;
mod summary;
mod user;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    IdentityUnavailable(String),
    #[error("{0}")]
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::DependencyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) | EngineError::Encryption(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidName(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidChargeCycle(_)
        | EngineError::UnknownCategory(_)
        | EngineError::InvalidRole(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidDateRange(_) => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Encryption(reason) => {
            tracing::error!("access token encryption error: {reason}");
            "internal server error".to_string()
        }
        EngineError::DependencyUnavailable(reason) => {
            tracing::warn!("transaction provider unavailable: {reason}");
            "transaction provider unavailable".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Unauthenticated(err) => (StatusCode::UNAUTHORIZED, err),
            ServerError::IdentityUnavailable(reason) => {
                tracing::warn!("identity provider unavailable: {reason}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "identity provider unavailable".to_string(),
                )
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}
