use std::error::Error as StdError;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{application::upstream::UpstreamError, cache::CacheError, infra::error::InfraError};

/// Diagnostic attached to failed responses and consumed by the logging stage.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

pub mod codes {
    pub const UPSTREAM_UNAVAILABLE: &str = "upstream_unavailable";
    pub const UPSTREAM_MALFORMED: &str = "upstream_malformed";
    pub const CACHE_UNAVAILABLE: &str = "cache_unavailable";
    pub const CACHE_CORRUPT: &str = "cache_corrupt";
    pub const INTERNAL: &str = "internal_error";
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorMessage,
}

#[derive(Debug, Serialize)]
pub struct ErrorMessage {
    pub code: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Cache(CacheError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Cache(CacheError::Corrupt { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Infra(_) | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Upstream(UpstreamError::Malformed { .. }) => codes::UPSTREAM_MALFORMED,
            AppError::Upstream(_) => codes::UPSTREAM_UNAVAILABLE,
            AppError::Cache(CacheError::Unavailable(_)) => codes::CACHE_UNAVAILABLE,
            AppError::Cache(CacheError::Corrupt { .. }) => codes::CACHE_CORRUPT,
            AppError::Infra(_) | AppError::Unexpected(_) => codes::INTERNAL,
        }
    }

    fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Upstream(UpstreamError::Malformed { .. }) => {
                "Upstream service returned an unexpected response"
            }
            AppError::Upstream(_) => "Upstream service unavailable",
            AppError::Cache(CacheError::Unavailable(_)) => "Service temporarily unavailable",
            AppError::Cache(CacheError::Corrupt { .. }) => "Cached forecast could not be read",
            AppError::Infra(_) | AppError::Unexpected(_) => "Unexpected error occurred",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: ErrorMessage {
                code: self.code(),
                message: self.presentation_message(),
            },
        };
        let report = ErrorReport::from_error("application::error::AppError", status, &self);
        let mut response = (status, Json(body)).into_response();
        report.attach(&mut response);
        response
    }
}
