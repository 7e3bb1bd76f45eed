//! Event participation: one person's registration for one event.
//!
//! ```text
//! registered ──confirm──▶ confirmed ──confirm──▶ confirmed (re-stamped)
//!     │                      │
//!     ├──attend / no_show / cancel──▶ attended | no_show | cancelled
//! ```
//!
//! `attended`, `no_show` and `cancelled` are final.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// Lowest and highest event rating a participant can give.
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

// ─── Status ──────────────────────────────────────────────────────────────────

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
pub enum ParticipationStatus {
  #[default]
  Registered,
  Confirmed,
  Attended,
  NoShow,
  Cancelled,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ParticipationAction {
  Confirm,
  Attend,
  NoShow,
  Cancel,
}

impl ParticipationStatus {
  pub fn is_final(self) -> bool {
    matches!(self, Self::Attended | Self::NoShow | Self::Cancelled)
  }

  /// The status reached by applying `action`, or `InvalidTransition` from a
  /// final status.
  pub fn after(self, action: ParticipationAction) -> Result<Self> {
    if self.is_final() {
      return Err(Error::InvalidTransition { from: self, action });
    }
    Ok(match action {
      ParticipationAction::Confirm => Self::Confirmed,
      ParticipationAction::Attend => Self::Attended,
      ParticipationAction::NoShow => Self::NoShow,
      ParticipationAction::Cancel => Self::Cancelled,
    })
  }
}

// ─── Participation ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participation {
  pub participation_id:  Uuid,
  pub person_id:         Uuid,
  pub event_id:          Uuid,
  pub status:            ParticipationStatus,
  pub registered_at:     DateTime<Utc>,
  /// Stamped by the most recent confirmation.
  pub confirmation_date: Option<DateTime<Utc>>,
  pub notes:             Option<String>,
  /// 1 to 5, given after the event.
  pub rating:            Option<u8>,
  pub comment:           Option<String>,
  /// People coming along with the participant.
  pub companions:        u32,
  pub special_needs:     Option<String>,
  pub updated_at:        DateTime<Utc>,
}

impl Participation {
  pub fn is_confirmed(&self) -> bool {
    self.status == ParticipationStatus::Confirmed
  }

  pub fn attended(&self) -> bool { self.status == ParticipationStatus::Attended }

  pub fn is_cancelled(&self) -> bool {
    self.status == ParticipationStatus::Cancelled
  }

  pub fn has_companions(&self) -> bool { self.companions > 0 }

  pub fn has_special_needs(&self) -> bool {
    self.special_needs.as_deref().is_some_and(|s| !s.is_empty())
  }

  pub fn has_rated(&self) -> bool { self.rating.is_some() }

  /// The participant plus their companions.
  pub fn total_people(&self) -> u32 { self.companions.saturating_add(1) }

  /// Move through the lifecycle. Confirming stamps `confirmation_date`.
  pub fn apply(
    &mut self,
    action: ParticipationAction,
    at: DateTime<Utc>,
  ) -> Result<()> {
    self.status = self.status.after(action)?;
    if action == ParticipationAction::Confirm {
      self.confirmation_date = Some(at);
    }
    self.updated_at = at;
    Ok(())
  }

  pub fn rate(
    &mut self,
    rating: u8,
    comment: Option<String>,
    at: DateTime<Utc>,
  ) -> Result<()> {
    validate_rating(rating)?;
    self.rating = Some(rating);
    self.comment = comment;
    self.updated_at = at;
    Ok(())
  }
}

pub fn validate_rating(rating: u8) -> Result<()> {
  if !RATING_RANGE.contains(&rating) {
    return Err(Error::InvalidRating(rating));
  }
  Ok(())
}

// ─── NewParticipation ────────────────────────────────────────────────────────

/// Input to [`crate::store::RegistryStore::register_participation`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewParticipation {
  pub person_id:     Uuid,
  pub event_id:      Uuid,
  #[serde(default)]
  pub notes:         Option<String>,
  #[serde(default)]
  pub companions:    u32,
  #[serde(default)]
  pub special_needs: Option<String>,
}

impl NewParticipation {
  pub fn new(person_id: Uuid, event_id: Uuid) -> Self {
    Self {
      person_id,
      event_id,
      notes: None,
      companions: 0,
      special_needs: None,
    }
  }

  pub fn total_people(&self) -> u32 { self.companions.saturating_add(1) }

  pub fn into_participation(self, now: DateTime<Utc>) -> Participation {
    Participation {
      participation_id:  Uuid::new_v4(),
      person_id:         self.person_id,
      event_id:          self.event_id,
      status:            ParticipationStatus::Registered,
      registered_at:     now,
      confirmation_date: None,
      notes:             self.notes,
      rating:            None,
      comment:           None,
      companions:        self.companions,
      special_needs:     self.special_needs,
      updated_at:        now,
    }
  }
}
