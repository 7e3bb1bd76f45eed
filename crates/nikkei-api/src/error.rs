//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use nikkei_core::{Error as CoreError, store::StoreError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Well-formed input that breaks a registry rule.
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a store failure, surfacing rejected writes as client errors.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.domain() {
      Some(domain) => Self::from_domain(domain),
      None => ApiError::Store(Box::new(e)),
    }
  }

  fn from_domain(e: &CoreError) -> Self {
    let message = e.to_string();
    match e {
      CoreError::PersonNotFound(_)
      | CoreError::FamilyNotFound(_)
      | CoreError::RelationNotFound(_)
      | CoreError::CompanyNotFound(_)
      | CoreError::EventNotFound(_)
      | CoreError::ParticipationNotFound(_) => ApiError::NotFound(message),
      CoreError::SelfReference(_)
      | CoreError::InvalidRelationType(_)
      | CoreError::InvalidTransition { .. }
      | CoreError::InvalidRating(_) => ApiError::Unprocessable(message),
      CoreError::DuplicateRelation { .. }
      | CoreError::FamilyHasMembers(_)
      | CoreError::OwnerHasCompany(_)
      | CoreError::PersonOwnsCompany(_)
      | CoreError::DuplicateParticipation { .. }
      | CoreError::EventFull(_)
      | CoreError::EventClosed(_) => ApiError::Conflict(message),
    }
  }
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self { Self::from_domain(&e) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    if status.is_client_error() {
      tracing::warn!(%status, %message, "request rejected");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}
