//! Events organised by the association: matsuri, reunions, classes, and so
//! on. Schedule predicates take `now` explicitly so callers decide the clock.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
  Matsuri,
  Reunion,
  Cultural,
  Sports,
  Educational,
  Business,
  Ceremony,
}

/// Where an event stands between drafting and wrap-up.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventStatus {
  #[default]
  Draft,
  Published,
  InProgress,
  Finished,
  Cancelled,
}

// ─── Event ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub event_id:              Uuid,
  /// Person organising the event; cleared if that person is deleted.
  pub organizer_id:          Option<Uuid>,
  pub title:                 String,
  pub description:           Option<String>,
  pub kind:                  EventKind,
  pub starts_at:             DateTime<Utc>,
  pub ends_at:               Option<DateTime<Utc>>,
  pub venue:                 Option<String>,
  pub address:               Option<String>,
  pub city:                  Option<String>,
  /// Head count limit, companions included. `None` is unlimited.
  pub max_capacity:          Option<u32>,
  pub requires_registration: bool,
  pub is_public:             bool,
  pub stream_url:            Option<String>,
  pub requirements:          Option<String>,
  pub organizer_contact:     Option<String>,
  pub status:                EventStatus,
  pub created_at:            DateTime<Utc>,
  pub updated_at:            DateTime<Utc>,
}

impl Event {
  pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool { self.starts_at > now }

  /// Over once its end (or, lacking one, its start) has passed.
  pub fn is_past(&self, now: DateTime<Utc>) -> bool {
    self.ends_at.unwrap_or(self.starts_at) < now
  }

  /// Between start and end; an event without an end runs for the whole
  /// (UTC) day it starts on.
  pub fn is_in_progress(&self, now: DateTime<Utc>) -> bool {
    match self.ends_at {
      Some(end) => self.starts_at < now && now < end,
      None => {
        let day_start =
          self.starts_at.date_naive().and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);
        day_start < now && now < day_end
      }
    }
  }

  pub fn is_matsuri(&self) -> bool { self.kind == EventKind::Matsuri }

  pub fn is_published(&self) -> bool { self.status == EventStatus::Published }

  /// Finished and cancelled events take no new registrations.
  pub fn accepts_registrations(&self) -> bool {
    !matches!(self.status, EventStatus::Finished | EventStatus::Cancelled)
  }

  /// Whether `requested` more people fit alongside `current` attendees.
  pub fn has_capacity_for(&self, current: u32, requested: u32) -> bool {
    self
      .max_capacity
      .is_none_or(|max| current.saturating_add(requested) <= max)
  }
}

// ─── NewEvent ────────────────────────────────────────────────────────────────

fn default_true() -> bool { true }

/// Input to [`crate::store::RegistryStore::add_event`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
  #[serde(default)]
  pub organizer_id:          Option<Uuid>,
  pub title:                 String,
  #[serde(default)]
  pub description:           Option<String>,
  pub kind:                  EventKind,
  pub starts_at:             DateTime<Utc>,
  #[serde(default)]
  pub ends_at:               Option<DateTime<Utc>>,
  #[serde(default)]
  pub venue:                 Option<String>,
  #[serde(default)]
  pub address:               Option<String>,
  #[serde(default)]
  pub city:                  Option<String>,
  #[serde(default)]
  pub max_capacity:          Option<u32>,
  #[serde(default = "default_true")]
  pub requires_registration: bool,
  #[serde(default = "default_true")]
  pub is_public:             bool,
  #[serde(default)]
  pub stream_url:            Option<String>,
  #[serde(default)]
  pub requirements:          Option<String>,
  #[serde(default)]
  pub organizer_contact:     Option<String>,
  #[serde(default)]
  pub status:                EventStatus,
}

impl NewEvent {
  pub fn new(
    title: impl Into<String>,
    kind: EventKind,
    starts_at: DateTime<Utc>,
  ) -> Self {
    Self {
      organizer_id: None,
      title: title.into(),
      description: None,
      kind,
      starts_at,
      ends_at: None,
      venue: None,
      address: None,
      city: None,
      max_capacity: None,
      requires_registration: true,
      is_public: true,
      stream_url: None,
      requirements: None,
      organizer_contact: None,
      status: EventStatus::Draft,
    }
  }

  pub fn into_event(self, now: DateTime<Utc>) -> Event {
    Event {
      event_id:              Uuid::new_v4(),
      organizer_id:          self.organizer_id,
      title:                 self.title,
      description:           self.description,
      kind:                  self.kind,
      starts_at:             self.starts_at,
      ends_at:               self.ends_at,
      venue:                 self.venue,
      address:               self.address,
      city:                  self.city,
      max_capacity:          self.max_capacity,
      requires_registration: self.requires_registration,
      is_public:             self.is_public,
      stream_url:            self.stream_url,
      requirements:          self.requirements,
      organizer_contact:     self.organizer_contact,
      status:                self.status,
      created_at:            now,
      updated_at:            now,
    }
  }
}

/// Filter over listed events. Empty fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
  pub kind:     Option<EventKind>,
  pub status:   Option<EventStatus>,
  /// `true` keeps events that have not started yet; `false` keeps the rest.
  pub upcoming: Option<bool>,
}

impl EventQuery {
  pub fn matches(&self, event: &Event, now: DateTime<Utc>) -> bool {
    self.kind.is_none_or(|k| k == event.kind)
      && self.status.is_none_or(|s| s == event.status)
      && self.upcoming.is_none_or(|u| u == event.is_upcoming(now))
  }
}
