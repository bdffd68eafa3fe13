//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use pdi_core::{policy::Reason, store::StoreError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// No `x-actor-id` header, or it names nobody.
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("actor is inactive")]
  Inactive,

  /// The policy evaluator denied a write.
  #[error("forbidden: {0:?}")]
  Forbidden(Reason),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error: domain rejections become 4xx, corrupt stored
  /// rows and datastore failures 500.
  pub fn store<E: StoreError>(e: E) -> Self {
    use pdi_core::Error as Core;
    match e.domain() {
      Some(Core::ActorNotFound(_) | Core::EntityNotFound(_) | Core::TeamNotFound(_)) => {
        ApiError::NotFound(e.to_string())
      }
      Some(
        Core::UnknownRole(_)
        | Core::UnknownStatus(_)
        | Core::UnknownEntityClass(_)
        | Core::ScoreOutOfRange(_)
        | Core::InvalidRecord(_),
      ) => ApiError::BadRequest(e.to_string()),
      Some(Core::CorruptRecord(_) | Core::MutationSettled) | None => ApiError::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, json!({ "error": m })),
      ApiError::Inactive => (
        StatusCode::FORBIDDEN,
        json!({ "error": "Usuário inativo.", "reason": "inactive" }),
      ),
      ApiError::Forbidden(reason) => (
        StatusCode::FORBIDDEN,
        json!({ "error": reason.message(), "reason": reason }),
      ),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() }))
      }
    };
    (status, Json(body)).into_response()
  }
}
