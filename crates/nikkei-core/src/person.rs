//! Person — a member record belonging to exactly one family.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Age at which a member counts as a senior.
pub const SENIOR_AGE: u32 = 65;

/// State recorded when none is given.
pub const DEFAULT_STATE: &str = "Sinaloa";

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Gender {
  Male,
  Female,
  Other,
  Undisclosed,
}

/// Generation counted from the emigrant (issei) onward.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Generation {
  Issei,
  Nisei,
  Sansei,
  Yonsei,
  Gosei,
  Rokusei,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaritalStatus {
  Single,
  Married,
  Divorced,
  Widowed,
  CommonLaw,
}

/// Self-reported command of Japanese.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JapaneseLevel {
  None,
  Basic,
  Intermediate,
  Advanced,
  Native,
}

// ─── Person ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:                Uuid,
  pub family_id:                Uuid,
  pub given_names:              String,
  pub paternal_surname:         String,
  pub maternal_surname:         Option<String>,
  pub japanese_name:            Option<String>,
  pub kanji_name:               Option<String>,
  pub gender:                   Option<Gender>,
  pub birth_date:               Option<NaiveDate>,
  pub birth_place:              Option<String>,
  pub generation:               Generation,
  pub marital_status:           Option<MaritalStatus>,
  pub phone:                    Option<String>,
  pub email:                    Option<String>,
  pub city:                     Option<String>,
  pub state:                    String,
  pub japanese_level:           Option<JapaneseLevel>,
  pub is_active_member:         bool,
  /// Date the person joined the association.
  pub joined_on:                Option<NaiveDate>,
  pub accepts_public_directory: bool,
  pub accepts_communications:   bool,
  pub admin_notes:              Option<String>,
  pub created_at:               DateTime<Utc>,
  pub updated_at:               DateTime<Utc>,
}

impl Person {
  /// Given names and paternal surname, followed by the maternal surname when
  /// one is recorded.
  pub fn full_name(&self) -> String {
    let mut name = format!("{} {}", self.given_names, self.paternal_surname);
    if let Some(maternal) =
      self.maternal_surname.as_deref().filter(|m| !m.is_empty())
    {
      name.push(' ');
      name.push_str(maternal);
    }
    name
  }

  pub fn is_issei(&self) -> bool { self.generation == Generation::Issei }

  /// Whether the person is at least [`SENIOR_AGE`] on `today`. Unknown birth
  /// dates never count.
  pub fn is_senior(&self, today: NaiveDate) -> bool {
    self
      .birth_date
      .and_then(|born| today.years_since(born))
      .is_some_and(|age| age >= SENIOR_AGE)
  }
}

// ─── NewPerson ───────────────────────────────────────────────────────────────

fn default_state() -> String { DEFAULT_STATE.to_owned() }

fn default_true() -> bool { true }

/// Input to [`crate::store::RegistryStore::add_person`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPerson {
  pub family_id:                Uuid,
  pub given_names:              String,
  pub paternal_surname:         String,
  #[serde(default)]
  pub maternal_surname:         Option<String>,
  #[serde(default)]
  pub japanese_name:            Option<String>,
  #[serde(default)]
  pub kanji_name:               Option<String>,
  #[serde(default)]
  pub gender:                   Option<Gender>,
  #[serde(default)]
  pub birth_date:               Option<NaiveDate>,
  #[serde(default)]
  pub birth_place:              Option<String>,
  pub generation:               Generation,
  #[serde(default)]
  pub marital_status:           Option<MaritalStatus>,
  #[serde(default)]
  pub phone:                    Option<String>,
  #[serde(default)]
  pub email:                    Option<String>,
  #[serde(default)]
  pub city:                     Option<String>,
  #[serde(default = "default_state")]
  pub state:                    String,
  #[serde(default)]
  pub japanese_level:           Option<JapaneseLevel>,
  #[serde(default)]
  pub is_active_member:         bool,
  #[serde(default)]
  pub joined_on:                Option<NaiveDate>,
  #[serde(default)]
  pub accepts_public_directory: bool,
  #[serde(default = "default_true")]
  pub accepts_communications:   bool,
  #[serde(default)]
  pub admin_notes:              Option<String>,
}

impl NewPerson {
  /// Convenience constructor with all optional fields set to their defaults.
  pub fn new(
    family_id: Uuid,
    given_names: impl Into<String>,
    paternal_surname: impl Into<String>,
    generation: Generation,
  ) -> Self {
    Self {
      family_id,
      given_names: given_names.into(),
      paternal_surname: paternal_surname.into(),
      maternal_surname: None,
      japanese_name: None,
      kanji_name: None,
      gender: None,
      birth_date: None,
      birth_place: None,
      generation,
      marital_status: None,
      phone: None,
      email: None,
      city: None,
      state: default_state(),
      japanese_level: None,
      is_active_member: false,
      joined_on: None,
      accepts_public_directory: false,
      accepts_communications: true,
      admin_notes: None,
    }
  }

  pub fn into_person(self, now: DateTime<Utc>) -> Person {
    Person {
      person_id:                Uuid::new_v4(),
      family_id:                self.family_id,
      given_names:              self.given_names,
      paternal_surname:         self.paternal_surname,
      maternal_surname:         self.maternal_surname,
      japanese_name:            self.japanese_name,
      kanji_name:               self.kanji_name,
      gender:                   self.gender,
      birth_date:               self.birth_date,
      birth_place:              self.birth_place,
      generation:               self.generation,
      marital_status:           self.marital_status,
      phone:                    self.phone,
      email:                    self.email,
      city:                     self.city,
      state:                    self.state,
      japanese_level:           self.japanese_level,
      is_active_member:         self.is_active_member,
      joined_on:                self.joined_on,
      accepts_public_directory: self.accepts_public_directory,
      accepts_communications:   self.accepts_communications,
      admin_notes:              self.admin_notes,
      created_at:               now,
      updated_at:               now,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn person() -> Person {
    NewPerson::new(Uuid::new_v4(), "Hiroshi", "Tanaka", Generation::Issei)
      .into_person(Utc::now())
  }

  #[test]
  fn full_name_skips_missing_or_empty_maternal_surname() {
    let mut p = person();
    assert_eq!(p.full_name(), "Hiroshi Tanaka");

    p.maternal_surname = Some(String::new());
    assert_eq!(p.full_name(), "Hiroshi Tanaka");

    p.maternal_surname = Some("Sato".into());
    assert_eq!(p.full_name(), "Hiroshi Tanaka Sato");
  }

  #[test]
  fn issei_check() {
    let mut p = person();
    assert!(p.is_issei());
    p.generation = Generation::Nisei;
    assert!(!p.is_issei());
  }

  #[test]
  fn senior_uses_whole_years() {
    let mut p = person();
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    assert!(!p.is_senior(today));

    p.birth_date = NaiveDate::from_ymd_opt(1959, 6, 15);
    assert!(p.is_senior(today));

    p.birth_date = NaiveDate::from_ymd_opt(1959, 6, 16);
    assert!(!p.is_senior(today));
  }

  #[test]
  fn new_person_defaults_from_json() {
    let family_id = Uuid::new_v4();
    let body = serde_json::json!({
      "family_id": family_id,
      "given_names": "Ana Yuki",
      "paternal_surname": "Yamamoto",
      "generation": "yonsei",
    });
    let input: NewPerson = serde_json::from_value(body).unwrap();
    assert_eq!(input.state, DEFAULT_STATE);
    assert!(input.accepts_communications);
    assert!(!input.accepts_public_directory);
    assert_eq!(input.generation, Generation::Yonsei);
  }

  #[test]
  fn enum_labels_are_snake_case() {
    assert_eq!(MaritalStatus::CommonLaw.to_string(), "common_law");
    assert_eq!("rokusei".parse::<Generation>().unwrap(), Generation::Rokusei);
  }
}
