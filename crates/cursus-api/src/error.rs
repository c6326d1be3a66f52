//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders as the failure envelope
//! `{"success": false, "message": "..."}`.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use cursus_core::error::{Error as CoreError, StoreError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Conflict(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store failure by the domain error behind it. Failures without
  /// a domain cause are internal.
  pub fn store<E: StoreError>(err: E) -> Self {
    match err.domain() {
      Some(e @ CoreError::NotFound(..)) => Self::NotFound(e.to_string()),
      Some(e @ CoreError::Conflict(_)) => Self::Conflict(e.to_string()),
      Some(e @ (CoreError::InvalidState(_) | CoreError::Validation(_))) => {
        Self::BadRequest(e.to_string())
      }
      None => Self::Internal(Box::new(err)),
    }
  }

  pub fn bad_request(message: impl Into<String>) -> Self {
    Self::BadRequest(message.into())
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Unauthorized => StatusCode::UNAUTHORIZED,
      Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

// ─── Extractor rejections ────────────────────────────────────────────────────

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

// ─── Response ────────────────────────────────────────────────────────────────

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      Self::Internal(e) => {
        error!(error = %e, "request failed");
        "internal server error".to_owned()
      }
      other => other.to_string(),
    };

    let mut res =
      (status, Json(json!({ "success": false, "message": message })))
        .into_response();
    if status == StatusCode::UNAUTHORIZED {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cursus_core::error::{Conflict, Entity, InvalidState};

  #[derive(Debug, Error)]
  #[error("disk on fire")]
  struct Infra;

  impl StoreError for Infra {
    fn domain(&self) -> Option<&CoreError> { None }
  }

  #[test]
  fn domain_errors_map_by_variant() {
    let cases = [
      (CoreError::not_found(Entity::Session, 4), StatusCode::NOT_FOUND),
      (Conflict::AgentExists("A1".into()).into(), StatusCode::CONFLICT),
      (InvalidState::CabinetInUse(2).into(), StatusCode::BAD_REQUEST),
      (CoreError::validation("empty"), StatusCode::BAD_REQUEST),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::store(err).status(), status);
    }
  }

  #[test]
  fn infrastructure_errors_are_internal() {
    let err = ApiError::store(Infra);
    assert!(matches!(err, ApiError::Internal(_)));
    assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn unauthorized_advertises_bearer() {
    let res = ApiError::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
  }
}
