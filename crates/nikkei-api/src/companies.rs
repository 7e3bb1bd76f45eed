//! Handlers for `/companies` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/companies` | All companies, by name |
//! | `POST`   | `/companies` | Body: [`NewCompany`]; 201, 409 if the owner already has one |
//! | `GET`    | `/companies/:id` | 404 if not found |
//! | `DELETE` | `/companies/:id` | 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use nikkei_core::{
  company::{Company, NewCompany},
  store::RegistryStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /companies`
pub async fn list<S: RegistryStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Company>>, ApiError> {
  let companies = store.list_companies().await.map_err(ApiError::from_store)?;
  Ok(Json(companies))
}

/// `POST /companies`
pub async fn create<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewCompany>,
) -> Result<impl IntoResponse, ApiError> {
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  let company = store.add_company(body).await.map_err(ApiError::from_store)?;
  tracing::info!(
    company_id = %company.company_id,
    owner_id = %company.owner_id,
    "company registered"
  );
  Ok((StatusCode::CREATED, Json(company)))
}

/// `GET /companies/:id`
pub async fn get_one<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Company>, ApiError> {
  let company = store
    .get_company(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("company {id} not found")))?;
  Ok(Json(company))
}

/// `DELETE /companies/:id`
pub async fn delete_one<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_company(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
