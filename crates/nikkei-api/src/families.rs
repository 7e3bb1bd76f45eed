//! Handlers for `/families` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/families` | All families, by surname |
//! | `POST`   | `/families` | Body: [`NewFamily`]; returns 201 |
//! | `GET`    | `/families/:id` | 404 if not found |
//! | `DELETE` | `/families/:id` | 204; 409 while members remain |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use nikkei_core::{
  family::{Family, NewFamily},
  store::RegistryStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /families`
pub async fn list<S: RegistryStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Family>>, ApiError> {
  let families = store.list_families().await.map_err(ApiError::from_store)?;
  Ok(Json(families))
}

/// `POST /families`
pub async fn create<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewFamily>,
) -> Result<impl IntoResponse, ApiError> {
  if body.surname.trim().is_empty() {
    return Err(ApiError::BadRequest("surname must not be empty".into()));
  }
  let family = store.add_family(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(family)))
}

/// `GET /families/:id`
pub async fn get_one<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Family>, ApiError> {
  let family = store
    .get_family(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("family {id} not found")))?;
  Ok(Json(family))
}

/// `DELETE /families/:id`
pub async fn delete_one<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_family(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
