//! Handlers for `/genealogy` and `/relation-types` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/genealogy` | `?person_id` required (404 if unknown); optional `relation_type`, `confirmed` |
//! | `POST`   | `/genealogy` | Body: [`CreateRelationBody`]; returns 201 |
//! | `GET`    | `/genealogy/:id` | Single relation |
//! | `DELETE` | `/genealogy/:id` | 204 |
//! | `POST`   | `/genealogy/:id/confirm` | Returns the confirmed relation |
//! | `PUT`    | `/genealogy/:id/notes` | Body: `{"notes":"..."}` or `{"notes":null}` |
//! | `GET`    | `/relation-types` | The full vocabulary |
//! | `GET`    | `/relation-types/:label` | Lenient lookup; unknown labels are unclassified |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use nikkei_core::{
  genealogy::{GenealogyRelation, NewGenealogyRelation},
  kinship::{
    FamilyCategory, RelationType, classify_label, generational_offset_label,
    inverse_label,
  },
  store::RegistryStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Required: relations where this person is either endpoint.
  pub person_id:     Uuid,
  /// Restrict to one stored label; must be in the vocabulary.
  pub relation_type: Option<String>,
  pub confirmed:     Option<bool>,
}

/// `GET /genealogy?person_id=<id>[&relation_type=...][&confirmed=...]`
pub async fn list<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<GenealogyRelation>>, ApiError> {
  let relation_type = params
    .relation_type
    .as_deref()
    .map(RelationType::from_label)
    .transpose()?;

  store
    .get_person(params.person_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("person {} not found", params.person_id))
    })?;

  let mut relations = store
    .relations_for_person(params.person_id)
    .await
    .map_err(ApiError::from_store)?;

  if let Some(rt) = relation_type {
    relations.retain(|r| r.relation_type == rt);
  }
  if let Some(confirmed) = params.confirmed {
    relations.retain(|r| r.is_confirmed() == confirmed);
  }

  Ok(Json(relations))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// Body of `POST /genealogy`. The label stays a string until the handler
/// parses it, so unknown labels get the same JSON error as every other
/// rejection.
#[derive(Debug, Deserialize)]
pub struct CreateRelationBody {
  pub person_id:     Uuid,
  pub relative_id:   Uuid,
  pub relation_type: String,
  #[serde(default)]
  pub notes:         Option<String>,
}

impl TryFrom<CreateRelationBody> for NewGenealogyRelation {
  type Error = nikkei_core::Error;

  fn try_from(body: CreateRelationBody) -> Result<Self, Self::Error> {
    let relation_type = RelationType::from_label(&body.relation_type)?;
    let mut input =
      NewGenealogyRelation::new(body.person_id, body.relative_id, relation_type);
    input.notes = body.notes;
    Ok(input)
  }
}

/// `POST /genealogy` — 422 on self reference or an unknown label, 409 on
/// duplicates, 404 when either person is missing.
pub async fn create<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateRelationBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewGenealogyRelation::try_from(body)?;
  input.validate()?;
  let relation = store
    .record_relation(input)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(
    relation_id = %relation.relation_id,
    relation_type = %relation.relation_type,
    "genealogy relation recorded"
  );
  Ok((StatusCode::CREATED, Json(relation)))
}

// ─── Get / delete ─────────────────────────────────────────────────────────────

/// `GET /genealogy/:id`
pub async fn get_one<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<GenealogyRelation>, ApiError> {
  let relation = store
    .get_relation(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("relation {id} not found")))?;
  Ok(Json(relation))
}

/// `DELETE /genealogy/:id`
pub async fn delete_one<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_relation(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Mutations ────────────────────────────────────────────────────────────────

/// `POST /genealogy/:id/confirm`
pub async fn confirm_one<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<GenealogyRelation>, ApiError> {
  let relation = store
    .confirm_relation(id)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(relation_id = %id, "genealogy relation confirmed");
  Ok(Json(relation))
}

#[derive(Debug, Deserialize)]
pub struct NotesBody {
  pub notes: Option<String>,
}

/// `PUT /genealogy/:id/notes`
pub async fn update_notes<S: RegistryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NotesBody>,
) -> Result<Json<GenealogyRelation>, ApiError> {
  let relation = store
    .update_relation_notes(id, body.notes)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(relation))
}

// ─── Vocabulary ───────────────────────────────────────────────────────────────

/// How the classifier reads one label.
#[derive(Debug, Serialize, Deserialize)]
pub struct RelationTypeInfo {
  pub label:               String,
  /// `false` for labels outside the vocabulary.
  pub known:               bool,
  pub category:            FamilyCategory,
  pub inverse:             String,
  pub generational_offset: i8,
}

impl From<RelationType> for RelationTypeInfo {
  fn from(rt: RelationType) -> Self {
    Self {
      label:               rt.label().to_owned(),
      known:               true,
      category:            rt.family(),
      inverse:             rt.inverse().label().to_owned(),
      generational_offset: rt.generational_offset(),
    }
  }
}

/// `GET /relation-types`
pub async fn relation_types() -> Json<Vec<RelationTypeInfo>> {
  Json(RelationType::all().map(RelationTypeInfo::from).collect())
}

/// `GET /relation-types/:label` — never fails; unknown labels come back
/// unclassified, self-inverse, and at offset 0.
pub async fn classify(Path(label): Path<String>) -> Json<RelationTypeInfo> {
  Json(RelationTypeInfo {
    known:               RelationType::from_label(&label).is_ok(),
    category:            classify_label(&label),
    inverse:             inverse_label(&label).into_owned(),
    generational_offset: generational_offset_label(&label),
    label,
  })
}
