use std::io;
use std::net::SocketAddr;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use engine_logging::engine_warn;
use harvester_engine::EngineError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body of every client-facing error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Request failures, mapped to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid JSON")]
    InvalidJson(#[source] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson(_) | ApiError::Engine(EngineError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Engine(EngineError::NotFound(_)) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::InvalidJson(err) => engine_warn!("Rejected body: {}", err),
            ApiError::Engine(EngineError::NotFound(id)) => {
                engine_warn!("Status requested for unknown job {:?}", id)
            }
            ApiError::Engine(err) => engine_warn!("Rejected request: {}", err),
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Failures that stop the server itself.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] io::Error),
}
