//! Handlers for `/persons` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/persons` | Optional `?family_id=<id>` |
//! | `POST`   | `/persons` | Body: [`NewPerson`]; returns 201 |
//! | `GET`    | `/persons/:id` | 404 if not found |
//! | `DELETE` | `/persons/:id` | 204; removes their relations and participations, 409 while they own a company |
//! | `GET`    | `/persons/:id/participations` | See [`crate::participations`] |
//! | `GET`    | `/persons/:id/relatives` | `?category=&lineage=&confirmed=` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use nikkei_core::{
  genealogy::{Kinship, RelationQuery},
  person::{NewPerson, Person},
  store::RegistryStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// A person with the derived fields clients display alongside it.
#[derive(Debug, Serialize)]
pub struct PersonView {
  #[serde(flatten)]
  pub person:    Person,
  pub full_name: String,
  pub is_issei:  bool,
  pub is_senior: bool,
}

impl PersonView {
  pub fn new(person: Person, today: NaiveDate) -> Self {
    Self {
      full_name: person.full_name(),
      is_issei: person.is_issei(),
      is_senior: person.is_senior(today),
      person,
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub family_id: Option<Uuid>,
}

/// `GET /persons[?family_id=<id>]`
pub async fn list<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<PersonView>>, ApiError> {
  let today = Utc::now().date_naive();
  let persons = store
    .list_persons(params.family_id)
    .await
    .map_err(ApiError::from_store)?
    .into_iter()
    .map(|p| PersonView::new(p, today))
    .collect();
  Ok(Json(persons))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /persons` — fails with 404 if the family does not exist.
pub async fn create<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError> {
  if body.given_names.trim().is_empty() || body.paternal_surname.trim().is_empty()
  {
    return Err(ApiError::BadRequest(
      "given_names and paternal_surname must not be empty".into(),
    ));
  }
  let person = store.add_person(body).await.map_err(ApiError::from_store)?;
  Ok((
    StatusCode::CREATED,
    Json(PersonView::new(person, Utc::now().date_naive())),
  ))
}

// ─── Get / delete ─────────────────────────────────────────────────────────────

/// `GET /persons/:id`
pub async fn get_one<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PersonView>, ApiError> {
  let person = store
    .get_person(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(PersonView::new(person, Utc::now().date_naive())))
}

/// `DELETE /persons/:id`
pub async fn delete_one<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_person(id).await.map_err(ApiError::from_store)?;
  tracing::info!(person_id = %id, "person deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Relatives ────────────────────────────────────────────────────────────────

/// `GET /persons/:id/relatives[?category=...][&lineage=ancestors|same_generation|descendants][&confirmed=true]`
pub async fn relatives<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(query): Query<RelationQuery>,
) -> Result<Json<Vec<Kinship>>, ApiError> {
  let kinships = store
    .kinships(id, &query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(kinships))
}
