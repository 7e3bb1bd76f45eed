//! JSON REST API for the Nikkei registry.
//!
//! Exposes an axum [`Router`] backed by any [`nikkei_core::store::RegistryStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", nikkei_api::api_router(store.clone()))
//! ```

pub mod companies;
pub mod error;
pub mod events;
pub mod families;
pub mod genealogy;
pub mod participations;
pub mod persons;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use nikkei_core::store::RegistryStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RegistryStore + 'static,
{
  Router::new()
    // Families
    .route("/families", get(families::list::<S>).post(families::create::<S>))
    .route(
      "/families/{id}",
      get(families::get_one::<S>).delete(families::delete_one::<S>),
    )
    // Persons
    .route("/persons", get(persons::list::<S>).post(persons::create::<S>))
    .route(
      "/persons/{id}",
      get(persons::get_one::<S>).delete(persons::delete_one::<S>),
    )
    .route("/persons/{id}/relatives", get(persons::relatives::<S>))
    .route(
      "/persons/{id}/participations",
      get(participations::for_person::<S>),
    )
    // Genealogy
    .route(
      "/genealogy",
      get(genealogy::list::<S>).post(genealogy::create::<S>),
    )
    .route(
      "/genealogy/{id}",
      get(genealogy::get_one::<S>).delete(genealogy::delete_one::<S>),
    )
    .route("/genealogy/{id}/confirm", post(genealogy::confirm_one::<S>))
    .route("/genealogy/{id}/notes", put(genealogy::update_notes::<S>))
    // Companies
    .route(
      "/companies",
      get(companies::list::<S>).post(companies::create::<S>),
    )
    .route(
      "/companies/{id}",
      get(companies::get_one::<S>).delete(companies::delete_one::<S>),
    )
    // Events
    .route("/events", get(events::list::<S>).post(events::create::<S>))
    .route(
      "/events/{id}",
      get(events::get_one::<S>).delete(events::delete_one::<S>),
    )
    .route("/events/{id}/status", put(events::set_status::<S>))
    .route(
      "/events/{id}/participations",
      get(participations::for_event::<S>),
    )
    // Participation
    .route("/participations", post(participations::register::<S>))
    .route(
      "/participations/{id}",
      get(participations::get_one::<S>).delete(participations::delete_one::<S>),
    )
    .route("/participations/{id}/rating", put(participations::rate::<S>))
    .route(
      "/participations/{id}/{action}",
      post(participations::transition::<S>),
    )
    // Vocabulary
    .route("/relation-types", get(genealogy::relation_types))
    .route("/relation-types/{label}", get(genealogy::classify))
    .with_state(store)
}
