//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use loghub_core::validate::Violation;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  /// The import is not in a state that allows the operation.
  #[error("{0}")]
  Conflict(String),

  #[error("validation failed")]
  Unprocessable(Vec<Violation>),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A remote provider failed.
  #[error("{0}")]
  Upstream(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map the domain errors that have a natural HTTP status.
  fn from_core(core: Option<&loghub_core::Error>) -> Option<Self> {
    use loghub_core::Error as Core;
    let core = core?;
    Some(match core {
      Core::ImportNotFound(_) | Core::EntryNotFound(_) => Self::NotFound(core.to_string()),
      Core::InvalidState { .. } => Self::Conflict(core.to_string()),
      Core::Validation(violations) => Self::Unprocessable(violations.clone()),
      Core::UnknownProvider(_) => Self::BadRequest(core.to_string()),
      _ => return None,
    })
  }
}

impl From<loghub_ingest::Error> for ApiError {
  fn from(e: loghub_ingest::Error) -> Self {
    if let Some(mapped) = Self::from_core(e.core()) {
      return mapped;
    }
    match e {
      loghub_ingest::Error::N1mm(e) => Self::BadRequest(e.to_string()),
      other => Self::Internal(Box::new(other)),
    }
  }
}

impl From<loghub_sync::Error> for ApiError {
  fn from(e: loghub_sync::Error) -> Self {
    if let Some(mapped) = Self::from_core(e.core()) {
      return mapped;
    }
    if e.is_transport() {
      return Self::Upstream(e.to_string());
    }
    match e {
      loghub_sync::Error::NotConfigured { .. } => Self::BadRequest(e.to_string()),
      other => Self::Internal(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    let body = match &self {
      ApiError::Unprocessable(violations) => {
        json!({ "error": self.to_string(), "violations": violations })
      }
      _ => json!({ "error": self.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}
