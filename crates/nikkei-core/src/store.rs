//! The `RegistryStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `nikkei-store-sqlite`).
//! Higher layers (`nikkei-api`, `nikkei-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  company::{Company, NewCompany},
  event::{Event, EventStatus, NewEvent},
  family::{Family, NewFamily},
  genealogy::{GenealogyRelation, Kinship, NewGenealogyRelation, RelationQuery},
  participation::{NewParticipation, Participation, ParticipationAction},
  person::{NewPerson, Person},
};

// ─── Error seam ──────────────────────────────────────────────────────────────

/// Backend error that can expose the domain error behind it, so callers can
/// tell a rejected write from an infrastructure failure.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn domain(&self) -> Option<&crate::Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a registry backend.
///
/// Implementations must enforce the genealogy invariants: no self
/// references, no duplicate (person, relative, type) triples, both endpoints
/// must exist, and deleting a person removes every relation touching it.
///
/// Mutations of an existing row touch only the columns they own, so
/// concurrent edits (a notes change racing a confirmation) never overwrite
/// each other.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RegistryStore: Send + Sync {
  type Error: StoreError;

  // ── Families ──────────────────────────────────────────────────────────

  fn add_family(
    &self,
    input: NewFamily,
  ) -> impl Future<Output = Result<Family, Self::Error>> + Send + '_;

  fn get_family(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Family>, Self::Error>> + Send + '_;

  fn list_families(
    &self,
  ) -> impl Future<Output = Result<Vec<Family>, Self::Error>> + Send + '_;

  /// Fails with `FamilyHasMembers` while any person still belongs to it.
  fn delete_family(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Fails with `FamilyNotFound` if `input.family_id` does not exist.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// List all persons, optionally restricted to one family.
  fn list_persons(
    &self,
    family_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Delete a person together with every genealogy relation and event
  /// participation touching them. Fails with `PersonOwnsCompany` while they
  /// still own a company.
  fn delete_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Genealogy ─────────────────────────────────────────────────────────

  /// Validate and persist a new, unconfirmed relation.
  fn record_relation(
    &self,
    input: NewGenealogyRelation,
  ) -> impl Future<Output = Result<GenealogyRelation, Self::Error>> + Send + '_;

  fn get_relation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<GenealogyRelation>, Self::Error>>
  + Send
  + '_;

  /// Every relation where `person_id` is either endpoint.
  fn relations_for_person(
    &self,
    person_id: Uuid,
  ) -> impl Future<Output = Result<Vec<GenealogyRelation>, Self::Error>>
  + Send
  + '_;

  /// Confirm a relation and return it with its new confirmation stamp.
  fn confirm_relation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<GenealogyRelation, Self::Error>> + Send + '_;

  fn update_relation_notes(
    &self,
    id: Uuid,
    notes: Option<String>,
  ) -> impl Future<Output = Result<GenealogyRelation, Self::Error>> + Send + '_;

  fn delete_relation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The person's relations seen from their side, filtered by `query`.
  fn kinships<'a>(
    &'a self,
    person_id: Uuid,
    query: &'a RelationQuery,
  ) -> impl Future<Output = Result<Vec<Kinship>, Self::Error>> + Send + 'a;

  // ── Companies ─────────────────────────────────────────────────────────

  /// Fails with `PersonNotFound` for an unknown owner and `OwnerHasCompany`
  /// when the owner already has one.
  fn add_company(
    &self,
    input: NewCompany,
  ) -> impl Future<Output = Result<Company, Self::Error>> + Send + '_;

  fn get_company(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Company>, Self::Error>> + Send + '_;

  fn list_companies(
    &self,
  ) -> impl Future<Output = Result<Vec<Company>, Self::Error>> + Send + '_;

  fn delete_company(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  /// Fails with `PersonNotFound` when an organizer is given but unknown.
  fn add_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// All events, earliest first.
  fn list_events(
    &self,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  fn set_event_status(
    &self,
    id: Uuid,
    status: EventStatus,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Delete an event and every participation in it.
  fn delete_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Participation ─────────────────────────────────────────────────────

  /// Register a person for an event. Fails with `EventClosed` for finished
  /// or cancelled events, `EventFull` when the head count (companions
  /// included) would exceed capacity, and `DuplicateParticipation` when the
  /// person is already registered.
  fn register_participation(
    &self,
    input: NewParticipation,
  ) -> impl Future<Output = Result<Participation, Self::Error>> + Send + '_;

  fn get_participation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Participation>, Self::Error>>
  + Send
  + '_;

  fn participations_for_event(
    &self,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Participation>, Self::Error>> + Send + '_;

  fn participations_for_person(
    &self,
    person_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Participation>, Self::Error>> + Send + '_;

  /// Apply a lifecycle action atomically against the stored status.
  fn transition_participation(
    &self,
    id: Uuid,
    action: ParticipationAction,
  ) -> impl Future<Output = Result<Participation, Self::Error>> + Send + '_;

  fn rate_participation(
    &self,
    id: Uuid,
    rating: u8,
    comment: Option<String>,
  ) -> impl Future<Output = Result<Participation, Self::Error>> + Send + '_;

  fn delete_participation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
