//! Family — a household lineage grouping persons under one surname.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A family as recorded by the association, including its migration history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
  pub family_id:         Uuid,
  /// Surname as used in Japan.
  pub surname:           String,
  pub surname_romaji:    Option<String>,
  pub surname_kanji:     Option<String>,
  pub surname_meaning:   Option<String>,
  pub origin_prefecture: Option<String>,
  pub origin_city:       Option<String>,
  /// Year the family arrived in Mexico.
  pub arrival_year:      Option<i32>,
  /// Port or city of arrival.
  pub arrival_place:     Option<String>,
  pub family_history:    Option<String>,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

/// Input to [`crate::store::RegistryStore::add_family`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewFamily {
  pub surname:           String,
  #[serde(default)]
  pub surname_romaji:    Option<String>,
  #[serde(default)]
  pub surname_kanji:     Option<String>,
  #[serde(default)]
  pub surname_meaning:   Option<String>,
  #[serde(default)]
  pub origin_prefecture: Option<String>,
  #[serde(default)]
  pub origin_city:       Option<String>,
  #[serde(default)]
  pub arrival_year:      Option<i32>,
  #[serde(default)]
  pub arrival_place:     Option<String>,
  #[serde(default)]
  pub family_history:    Option<String>,
}

impl NewFamily {
  pub fn new(surname: impl Into<String>) -> Self {
    Self { surname: surname.into(), ..Default::default() }
  }

  pub fn into_family(self, now: DateTime<Utc>) -> Family {
    Family {
      family_id:         Uuid::new_v4(),
      surname:           self.surname,
      surname_romaji:    self.surname_romaji,
      surname_kanji:     self.surname_kanji,
      surname_meaning:   self.surname_meaning,
      origin_prefecture: self.origin_prefecture,
      origin_city:       self.origin_city,
      arrival_year:      self.arrival_year,
      arrival_place:     self.arrival_place,
      family_history:    self.family_history,
      created_at:        now,
      updated_at:        now,
    }
  }
}
