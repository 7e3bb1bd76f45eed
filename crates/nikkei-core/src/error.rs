//! Error types for `nikkei-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{
  kinship::RelationType,
  participation::{ParticipationAction, ParticipationStatus},
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("family not found: {0}")]
  FamilyNotFound(Uuid),

  #[error("genealogy relation not found: {0}")]
  RelationNotFound(Uuid),

  #[error("company not found: {0}")]
  CompanyNotFound(Uuid),

  #[error("event not found: {0}")]
  EventNotFound(Uuid),

  #[error("participation not found: {0}")]
  ParticipationNotFound(Uuid),

  #[error("person {0} cannot be related to themselves")]
  SelfReference(Uuid),

  #[error(
    "relation already recorded: {relative_id} is {relation_type} of {person_id}"
  )]
  DuplicateRelation {
    person_id:     Uuid,
    relative_id:   Uuid,
    relation_type: RelationType,
  },

  #[error("unknown relation type: {0:?}")]
  InvalidRelationType(String),

  #[error("family {0} still has members")]
  FamilyHasMembers(Uuid),

  #[error("person {0} already owns a company")]
  OwnerHasCompany(Uuid),

  #[error("person {0} still owns a company")]
  PersonOwnsCompany(Uuid),

  #[error("person {person_id} is already registered for event {event_id}")]
  DuplicateParticipation { person_id: Uuid, event_id: Uuid },

  #[error("event {0} has no capacity left")]
  EventFull(Uuid),

  #[error("event {0} no longer accepts registrations")]
  EventClosed(Uuid),

  #[error("cannot {action} a participation that is {from}")]
  InvalidTransition {
    from:   ParticipationStatus,
    action: ParticipationAction,
  },

  #[error("rating must be between 1 and 5, got {0}")]
  InvalidRating(u8),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
