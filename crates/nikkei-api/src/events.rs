//! Handlers for `/events` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/events` | Optional `?kind=&status=&upcoming=` |
//! | `POST`   | `/events` | Body: [`NewEvent`]; returns 201 |
//! | `GET`    | `/events/:id` | 404 if not found |
//! | `DELETE` | `/events/:id` | 204; drops its participations |
//! | `PUT`    | `/events/:id/status` | Body: `{"status":"published"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use nikkei_core::{
  event::{Event, EventKind, EventQuery, EventStatus, NewEvent},
  store::RegistryStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// An event with its schedule flags evaluated at request time.
#[derive(Debug, Serialize)]
pub struct EventView {
  #[serde(flatten)]
  pub event:          Event,
  pub is_upcoming:    bool,
  pub is_in_progress: bool,
  pub is_past:        bool,
}

impl EventView {
  pub fn new(event: Event, now: DateTime<Utc>) -> Self {
    Self {
      is_upcoming: event.is_upcoming(now),
      is_in_progress: event.is_in_progress(now),
      is_past: event.is_past(now),
      event,
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// Labels arrive as strings and are parsed here so a bad one gets a JSON 400.
#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub kind:     Option<String>,
  pub status:   Option<String>,
  pub upcoming: Option<bool>,
}

impl TryFrom<ListParams> for EventQuery {
  type Error = ApiError;

  fn try_from(params: ListParams) -> Result<Self, Self::Error> {
    let kind = params
      .kind
      .map(|k| {
        k.parse::<EventKind>()
          .map_err(|_| ApiError::BadRequest(format!("unknown event kind: {k:?}")))
      })
      .transpose()?;
    let status = params
      .status
      .map(|s| {
        s.parse::<EventStatus>().map_err(|_| {
          ApiError::BadRequest(format!("unknown event status: {s:?}"))
        })
      })
      .transpose()?;
    Ok(EventQuery { kind, status, upcoming: params.upcoming })
  }
}

/// `GET /events[?kind=...][&status=...][&upcoming=true|false]`
pub async fn list<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<EventView>>, ApiError> {
  let query = EventQuery::try_from(params)?;
  let now = Utc::now();
  let events = store
    .list_events()
    .await
    .map_err(ApiError::from_store)?
    .into_iter()
    .filter(|e| query.matches(e, now))
    .map(|e| EventView::new(e, now))
    .collect();
  Ok(Json(events))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /events` — 400 for a blank title or an end before the start.
pub async fn create<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewEvent>,
) -> Result<impl IntoResponse, ApiError> {
  if body.title.trim().is_empty() {
    return Err(ApiError::BadRequest("title must not be empty".into()));
  }
  if body.ends_at.is_some_and(|end| end < body.starts_at) {
    return Err(ApiError::BadRequest("ends_at must not precede starts_at".into()));
  }
  let event = store.add_event(body).await.map_err(ApiError::from_store)?;
  tracing::info!(event_id = %event.event_id, kind = %event.kind, "event created");
  Ok((StatusCode::CREATED, Json(EventView::new(event, Utc::now()))))
}

// ─── Get / delete ─────────────────────────────────────────────────────────────

/// `GET /events/:id`
pub async fn get_one<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<EventView>, ApiError> {
  let event = store
    .get_event(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
  Ok(Json(EventView::new(event, Utc::now())))
}

/// `DELETE /events/:id`
pub async fn delete_one<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_event(id).await.map_err(ApiError::from_store)?;
  tracing::info!(event_id = %id, "event deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: String,
}

/// `PUT /events/:id/status`
pub async fn set_status<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<EventView>, ApiError> {
  let status = body.status.parse::<EventStatus>().map_err(|_| {
    ApiError::Unprocessable(format!("unknown event status: {:?}", body.status))
  })?;
  let event = store
    .set_event_status(id, status)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(event_id = %id, %status, "event status changed");
  Ok(Json(EventView::new(event, Utc::now())))
}
