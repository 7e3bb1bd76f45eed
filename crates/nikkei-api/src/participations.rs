//! Handlers for event participation.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/participations` | Body: [`NewParticipation`]; 201, 409 when full, closed or already registered |
//! | `GET`    | `/participations/:id` | 404 if not found |
//! | `DELETE` | `/participations/:id` | 204 |
//! | `POST`   | `/participations/:id/:action` | `confirm`, `attend`, `no_show`, `cancel`; 422 from a final status |
//! | `PUT`    | `/participations/:id/rating` | Body: `{"rating":1..5,"comment":"..."}` |
//! | `GET`    | `/events/:id/participations` | Everyone registered for the event |
//! | `GET`    | `/persons/:id/participations` | Every event the person registered for |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use nikkei_core::{
  participation::{NewParticipation, Participation, ParticipationAction},
  store::RegistryStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `POST /participations`
pub async fn register<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewParticipation>,
) -> Result<impl IntoResponse, ApiError> {
  let participation = store
    .register_participation(body)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(
    participation_id = %participation.participation_id,
    event_id = %participation.event_id,
    people = participation.total_people(),
    "participation registered"
  );
  Ok((StatusCode::CREATED, Json(participation)))
}

/// `GET /participations/:id`
pub async fn get_one<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Participation>, ApiError> {
  let participation = store
    .get_participation(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("participation {id} not found")))?;
  Ok(Json(participation))
}

/// `DELETE /participations/:id`
pub async fn delete_one<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store
    .delete_participation(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// `POST /participations/:id/:action`
pub async fn transition<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path((id, action)): Path<(Uuid, String)>,
) -> Result<Json<Participation>, ApiError> {
  let action = action.parse::<ParticipationAction>().map_err(|_| {
    ApiError::NotFound(format!("unknown participation action: {action:?}"))
  })?;
  let participation = store
    .transition_participation(id, action)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(
    participation_id = %id,
    %action,
    status = %participation.status,
    "participation updated"
  );
  Ok(Json(participation))
}

#[derive(Debug, Deserialize)]
pub struct RatingBody {
  /// Wide enough that any JSON integer reaches the range check.
  pub rating:  i64,
  #[serde(default)]
  pub comment: Option<String>,
}

/// `PUT /participations/:id/rating`
pub async fn rate<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RatingBody>,
) -> Result<Json<Participation>, ApiError> {
  let rating = u8::try_from(body.rating).map_err(|_| {
    ApiError::Unprocessable(format!(
      "rating must be between 1 and 5, got {}",
      body.rating
    ))
  })?;
  let participation = store
    .rate_participation(id, rating, body.comment)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(participation))
}

// ─── Listings ─────────────────────────────────────────────────────────────────

/// `GET /events/:id/participations`
pub async fn for_event<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<Participation>>, ApiError> {
  let participations = store
    .participations_for_event(event_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(participations))
}

/// `GET /persons/:id/participations`
pub async fn for_person<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(person_id): Path<Uuid>,
) -> Result<Json<Vec<Participation>>, ApiError> {
  let participations = store
    .participations_for_person(person_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(participations))
}
