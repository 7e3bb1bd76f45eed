//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`,
//! UUIDs as hyphenated lowercase strings, and enums as their snake_case
//! labels.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use nikkei_core::{
  company::Company,
  event::Event,
  family::Family,
  genealogy::GenealogyRelation,
  kinship::RelationType,
  participation::Participation,
  person::Person,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Labels ──────────────────────────────────────────────────────────────────

pub fn encode_label<T: Display>(value: T) -> String { value.to_string() }

pub fn decode_label<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::Decode { column, value: s.to_owned() })
}

fn decode_opt_label<T: FromStr>(
  column: &'static str,
  s: Option<String>,
) -> Result<Option<T>> {
  s.as_deref().map(|v| decode_label(column, v)).transpose()
}

pub fn encode_relation_type(rt: RelationType) -> &'static str { rt.label() }

pub fn decode_relation_type(s: &str) -> Result<RelationType> {
  Ok(RelationType::from_label(s)?)
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const FAMILY_COLUMNS: &str = "family_id, surname, surname_romaji, \
  surname_kanji, surname_meaning, origin_prefecture, origin_city, \
  arrival_year, arrival_place, family_history, created_at, updated_at";

pub const PERSON_COLUMNS: &str = "person_id, family_id, given_names, \
  paternal_surname, maternal_surname, japanese_name, kanji_name, gender, \
  birth_date, birth_place, generation, marital_status, phone, email, city, \
  state, japanese_level, is_active_member, joined_on, \
  accepts_public_directory, accepts_communications, admin_notes, \
  created_at, updated_at";

pub const RELATION_COLUMNS: &str = "relation_id, person_id, relative_id, \
  relation_type, confirmed_by_both_parties, confirmation_date, notes, \
  created_at, updated_at";

pub const COMPANY_COLUMNS: &str = "company_id, owner_id, name, legal_name, \
  tax_id, line_of_business, sector, description, phone, email, website, \
  address, city, state, postal_code, founded_on, employee_count, \
  listed_in_directory, products_services, created_at, updated_at";

pub const EVENT_COLUMNS: &str = "event_id, organizer_id, title, description, \
  kind, starts_at, ends_at, venue, address, city, max_capacity, \
  requires_registration, is_public, stream_url, requirements, \
  organizer_contact, status, created_at, updated_at";

pub const PARTICIPATION_COLUMNS: &str = "participation_id, person_id, \
  event_id, status, registered_at, confirmation_date, notes, rating, \
  comment, companions, special_needs, updated_at";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `families` row.
pub struct RawFamily {
  pub family_id:         String,
  pub surname:           String,
  pub surname_romaji:    Option<String>,
  pub surname_kanji:     Option<String>,
  pub surname_meaning:   Option<String>,
  pub origin_prefecture: Option<String>,
  pub origin_city:       Option<String>,
  pub arrival_year:      Option<i32>,
  pub arrival_place:     Option<String>,
  pub family_history:    Option<String>,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawFamily {
  /// Read a row selected with [`FAMILY_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      family_id:         row.get(0)?,
      surname:           row.get(1)?,
      surname_romaji:    row.get(2)?,
      surname_kanji:     row.get(3)?,
      surname_meaning:   row.get(4)?,
      origin_prefecture: row.get(5)?,
      origin_city:       row.get(6)?,
      arrival_year:      row.get(7)?,
      arrival_place:     row.get(8)?,
      family_history:    row.get(9)?,
      created_at:        row.get(10)?,
      updated_at:        row.get(11)?,
    })
  }

  pub fn into_family(self) -> Result<Family> {
    Ok(Family {
      family_id:         decode_uuid(&self.family_id)?,
      surname:           self.surname,
      surname_romaji:    self.surname_romaji,
      surname_kanji:     self.surname_kanji,
      surname_meaning:   self.surname_meaning,
      origin_prefecture: self.origin_prefecture,
      origin_city:       self.origin_city,
      arrival_year:      self.arrival_year,
      arrival_place:     self.arrival_place,
      family_history:    self.family_history,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub person_id:                String,
  pub family_id:                String,
  pub given_names:              String,
  pub paternal_surname:         String,
  pub maternal_surname:         Option<String>,
  pub japanese_name:            Option<String>,
  pub kanji_name:               Option<String>,
  pub gender:                   Option<String>,
  pub birth_date:               Option<String>,
  pub birth_place:              Option<String>,
  pub generation:               String,
  pub marital_status:           Option<String>,
  pub phone:                    Option<String>,
  pub email:                    Option<String>,
  pub city:                     Option<String>,
  pub state:                    String,
  pub japanese_level:           Option<String>,
  pub is_active_member:         bool,
  pub joined_on:                Option<String>,
  pub accepts_public_directory: bool,
  pub accepts_communications:   bool,
  pub admin_notes:              Option<String>,
  pub created_at:               String,
  pub updated_at:               String,
}

impl RawPerson {
  /// Read a row selected with [`PERSON_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:                row.get(0)?,
      family_id:                row.get(1)?,
      given_names:              row.get(2)?,
      paternal_surname:         row.get(3)?,
      maternal_surname:         row.get(4)?,
      japanese_name:            row.get(5)?,
      kanji_name:               row.get(6)?,
      gender:                   row.get(7)?,
      birth_date:               row.get(8)?,
      birth_place:              row.get(9)?,
      generation:               row.get(10)?,
      marital_status:           row.get(11)?,
      phone:                    row.get(12)?,
      email:                    row.get(13)?,
      city:                     row.get(14)?,
      state:                    row.get(15)?,
      japanese_level:           row.get(16)?,
      is_active_member:         row.get(17)?,
      joined_on:                row.get(18)?,
      accepts_public_directory: row.get(19)?,
      accepts_communications:   row.get(20)?,
      admin_notes:              row.get(21)?,
      created_at:               row.get(22)?,
      updated_at:               row.get(23)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:                decode_uuid(&self.person_id)?,
      family_id:                decode_uuid(&self.family_id)?,
      given_names:              self.given_names,
      paternal_surname:         self.paternal_surname,
      maternal_surname:         self.maternal_surname,
      japanese_name:            self.japanese_name,
      kanji_name:               self.kanji_name,
      gender:                   decode_opt_label("gender", self.gender)?,
      birth_date:               self
        .birth_date
        .as_deref()
        .map(decode_date)
        .transpose()?,
      birth_place:              self.birth_place,
      generation:               decode_label("generation", &self.generation)?,
      marital_status:           decode_opt_label(
        "marital_status",
        self.marital_status,
      )?,
      phone:                    self.phone,
      email:                    self.email,
      city:                     self.city,
      state:                    self.state,
      japanese_level:           decode_opt_label(
        "japanese_level",
        self.japanese_level,
      )?,
      is_active_member:         self.is_active_member,
      joined_on:                self
        .joined_on
        .as_deref()
        .map(decode_date)
        .transpose()?,
      accepts_public_directory: self.accepts_public_directory,
      accepts_communications:   self.accepts_communications,
      admin_notes:              self.admin_notes,
      created_at:               decode_dt(&self.created_at)?,
      updated_at:               decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `genealogy` row.
pub struct RawRelation {
  pub relation_id:               String,
  pub person_id:                 String,
  pub relative_id:               String,
  pub relation_type:             String,
  pub confirmed_by_both_parties: bool,
  pub confirmation_date:         Option<String>,
  pub notes:                     Option<String>,
  pub created_at:                String,
  pub updated_at:                String,
}

impl RawRelation {
  /// Read a row selected with [`RELATION_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      relation_id:               row.get(0)?,
      person_id:                 row.get(1)?,
      relative_id:               row.get(2)?,
      relation_type:             row.get(3)?,
      confirmed_by_both_parties: row.get(4)?,
      confirmation_date:         row.get(5)?,
      notes:                     row.get(6)?,
      created_at:                row.get(7)?,
      updated_at:                row.get(8)?,
    })
  }

  pub fn into_relation(self) -> Result<GenealogyRelation> {
    Ok(GenealogyRelation {
      relation_id:               decode_uuid(&self.relation_id)?,
      person_id:                 decode_uuid(&self.person_id)?,
      relative_id:               decode_uuid(&self.relative_id)?,
      relation_type:             decode_relation_type(&self.relation_type)?,
      confirmed_by_both_parties: self.confirmed_by_both_parties,
      confirmation_date:         self
        .confirmation_date
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      notes:                     self.notes,
      created_at:                decode_dt(&self.created_at)?,
      updated_at:                decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `companies` row.
pub struct RawCompany {
  pub company_id:          String,
  pub owner_id:            String,
  pub name:                String,
  pub legal_name:          Option<String>,
  pub tax_id:              Option<String>,
  pub line_of_business:    Option<String>,
  pub sector:              Option<String>,
  pub description:         Option<String>,
  pub phone:               Option<String>,
  pub email:               Option<String>,
  pub website:             Option<String>,
  pub address:             Option<String>,
  pub city:                Option<String>,
  pub state:               String,
  pub postal_code:         Option<String>,
  pub founded_on:          Option<String>,
  pub employee_count:      Option<u32>,
  pub listed_in_directory: bool,
  pub products_services:   Option<String>,
  pub created_at:          String,
  pub updated_at:          String,
}

impl RawCompany {
  /// Read a row selected with [`COMPANY_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      company_id:          row.get(0)?,
      owner_id:            row.get(1)?,
      name:                row.get(2)?,
      legal_name:          row.get(3)?,
      tax_id:              row.get(4)?,
      line_of_business:    row.get(5)?,
      sector:              row.get(6)?,
      description:         row.get(7)?,
      phone:               row.get(8)?,
      email:               row.get(9)?,
      website:             row.get(10)?,
      address:             row.get(11)?,
      city:                row.get(12)?,
      state:               row.get(13)?,
      postal_code:         row.get(14)?,
      founded_on:          row.get(15)?,
      employee_count:      row.get(16)?,
      listed_in_directory: row.get(17)?,
      products_services:   row.get(18)?,
      created_at:          row.get(19)?,
      updated_at:          row.get(20)?,
    })
  }

  pub fn into_company(self) -> Result<Company> {
    Ok(Company {
      company_id:          decode_uuid(&self.company_id)?,
      owner_id:            decode_uuid(&self.owner_id)?,
      name:                self.name,
      legal_name:          self.legal_name,
      tax_id:              self.tax_id,
      line_of_business:    self.line_of_business,
      sector:              self.sector,
      description:         self.description,
      phone:               self.phone,
      email:               self.email,
      website:             self.website,
      address:             self.address,
      city:                self.city,
      state:               self.state,
      postal_code:         self.postal_code,
      founded_on:          self
        .founded_on
        .as_deref()
        .map(decode_date)
        .transpose()?,
      employee_count:      self.employee_count,
      listed_in_directory: self.listed_in_directory,
      products_services:   self.products_services,
      created_at:          decode_dt(&self.created_at)?,
      updated_at:          decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from an `events` row.
pub struct RawEvent {
  pub event_id:              String,
  pub organizer_id:          Option<String>,
  pub title:                 String,
  pub description:           Option<String>,
  pub kind:                  String,
  pub starts_at:             String,
  pub ends_at:               Option<String>,
  pub venue:                 Option<String>,
  pub address:               Option<String>,
  pub city:                  Option<String>,
  pub max_capacity:          Option<u32>,
  pub requires_registration: bool,
  pub is_public:             bool,
  pub stream_url:            Option<String>,
  pub requirements:          Option<String>,
  pub organizer_contact:     Option<String>,
  pub status:                String,
  pub created_at:            String,
  pub updated_at:            String,
}

impl RawEvent {
  /// Read a row selected with [`EVENT_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:              row.get(0)?,
      organizer_id:          row.get(1)?,
      title:                 row.get(2)?,
      description:           row.get(3)?,
      kind:                  row.get(4)?,
      starts_at:             row.get(5)?,
      ends_at:               row.get(6)?,
      venue:                 row.get(7)?,
      address:               row.get(8)?,
      city:                  row.get(9)?,
      max_capacity:          row.get(10)?,
      requires_registration: row.get(11)?,
      is_public:             row.get(12)?,
      stream_url:            row.get(13)?,
      requirements:          row.get(14)?,
      organizer_contact:     row.get(15)?,
      status:                row.get(16)?,
      created_at:            row.get(17)?,
      updated_at:            row.get(18)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:              decode_uuid(&self.event_id)?,
      organizer_id:          self
        .organizer_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      title:                 self.title,
      description:           self.description,
      kind:                  decode_label("kind", &self.kind)?,
      starts_at:             decode_dt(&self.starts_at)?,
      ends_at:               self.ends_at.as_deref().map(decode_dt).transpose()?,
      venue:                 self.venue,
      address:               self.address,
      city:                  self.city,
      max_capacity:          self.max_capacity,
      requires_registration: self.requires_registration,
      is_public:             self.is_public,
      stream_url:            self.stream_url,
      requirements:          self.requirements,
      organizer_contact:     self.organizer_contact,
      status:                decode_label("status", &self.status)?,
      created_at:            decode_dt(&self.created_at)?,
      updated_at:            decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `participations` row.
pub struct RawParticipation {
  pub participation_id:  String,
  pub person_id:         String,
  pub event_id:          String,
  pub status:            String,
  pub registered_at:     String,
  pub confirmation_date: Option<String>,
  pub notes:             Option<String>,
  pub rating:            Option<u8>,
  pub comment:           Option<String>,
  pub companions:        u32,
  pub special_needs:     Option<String>,
  pub updated_at:        String,
}

impl RawParticipation {
  /// Read a row selected with [`PARTICIPATION_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      participation_id:  row.get(0)?,
      person_id:         row.get(1)?,
      event_id:          row.get(2)?,
      status:            row.get(3)?,
      registered_at:     row.get(4)?,
      confirmation_date: row.get(5)?,
      notes:             row.get(6)?,
      rating:            row.get(7)?,
      comment:           row.get(8)?,
      companions:        row.get(9)?,
      special_needs:     row.get(10)?,
      updated_at:        row.get(11)?,
    })
  }

  pub fn into_participation(self) -> Result<Participation> {
    Ok(Participation {
      participation_id:  decode_uuid(&self.participation_id)?,
      person_id:         decode_uuid(&self.person_id)?,
      event_id:          decode_uuid(&self.event_id)?,
      status:            decode_label("status", &self.status)?,
      registered_at:     decode_dt(&self.registered_at)?,
      confirmation_date: self
        .confirmation_date
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      notes:             self.notes,
      rating:            self.rating,
      comment:           self.comment,
      companions:        self.companions,
      special_needs:     self.special_needs,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}
