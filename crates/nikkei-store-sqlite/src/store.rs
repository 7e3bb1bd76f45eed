//! [`SqliteStore`] — the SQLite implementation of [`RegistryStore`].

use std::{ffi::c_int, path::Path};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, ffi};
use uuid::Uuid;

use nikkei_core::{
  Error as CoreError,
  company::{Company, NewCompany},
  event::{Event, EventStatus, NewEvent},
  family::{Family, NewFamily},
  genealogy::{GenealogyRelation, Kinship, NewGenealogyRelation, RelationQuery},
  participation::{
    NewParticipation, Participation, ParticipationAction, validate_rating,
  },
  person::{NewPerson, Person},
  store::RegistryStore,
};

use crate::{
  Result,
  encode::{
    COMPANY_COLUMNS, EVENT_COLUMNS, FAMILY_COLUMNS, PARTICIPATION_COLUMNS,
    PERSON_COLUMNS, RELATION_COLUMNS, RawCompany, RawEvent, RawFamily,
    RawParticipation, RawPerson, RawRelation, encode_date, encode_dt,
    encode_label, encode_relation_type, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A registry backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every
/// `call` runs on the connection's own thread, one at a time, so the body of
/// a single closure is never interleaved with another.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Raw connection access for crate tests that bypass the domain checks.
  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  /// Whether a row with `id` exists in `table` keyed by `column`.
  async fn exists(
    &self,
    table: &'static str,
    column: &'static str,
    id: Uuid,
  ) -> Result<bool> {
    let id_str = encode_uuid(id);
    let found = self
      .conn
      .call(move |conn| Ok(row_exists(conn, table, column, &id_str)?))
      .await?;
    Ok(found)
  }

  async fn require_person(&self, id: Uuid) -> Result<()> {
    if !self.exists("persons", "person_id", id).await? {
      return Err(CoreError::PersonNotFound(id).into());
    }
    Ok(())
  }

  async fn relation_triple_exists(
    &self,
    input: &NewGenealogyRelation,
  ) -> Result<bool> {
    let person_str   = encode_uuid(input.person_id);
    let relative_str = encode_uuid(input.relative_id);
    let type_str     = encode_relation_type(input.relation_type);

    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM genealogy
               WHERE person_id = ?1 AND relative_id = ?2 AND relation_type = ?3",
              rusqlite::params![person_str, relative_str, type_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }
}

// ─── Row helpers (run inside `call`) ─────────────────────────────────────────

fn row_exists(
  conn: &Connection,
  table: &str,
  column: &str,
  id: &str,
) -> rusqlite::Result<bool> {
  let sql = format!("SELECT 1 FROM {table} WHERE {column} = ?1 LIMIT 1");
  Ok(
    conn
      .query_row(&sql, rusqlite::params![id], |_| Ok(true))
      .optional()?
      .unwrap_or(false),
  )
}

fn select_relation(
  conn: &Connection,
  id: &str,
) -> rusqlite::Result<Option<RawRelation>> {
  conn
    .query_row(
      &format!("SELECT {RELATION_COLUMNS} FROM genealogy WHERE relation_id = ?1"),
      rusqlite::params![id],
      RawRelation::from_row,
    )
    .optional()
}

fn select_event(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawEvent>> {
  conn
    .query_row(
      &format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?1"),
      rusqlite::params![id],
      RawEvent::from_row,
    )
    .optional()
}

fn select_participation(
  conn: &Connection,
  id: &str,
) -> rusqlite::Result<Option<RawParticipation>> {
  conn
    .query_row(
      &format!(
        "SELECT {PARTICIPATION_COLUMNS} FROM participations
         WHERE participation_id = ?1"
      ),
      rusqlite::params![id],
      RawParticipation::from_row,
    )
    .optional()
}

/// The extended result code of a constraint failure raised by SQLite
/// (`SQLITE_CONSTRAINT_UNIQUE`, `SQLITE_CONSTRAINT_FOREIGNKEY`, ...).
pub(crate) fn constraint_code(e: &tokio_rusqlite::Error) -> Option<c_int> {
  match e {
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      Some(f.extended_code)
    }
    _ => None,
  }
}

/// Delete the row keyed by `id`, reporting whether one existed.
async fn delete_by_id(
  conn: &tokio_rusqlite::Connection,
  table: &'static str,
  column: &'static str,
  id: Uuid,
) -> std::result::Result<bool, tokio_rusqlite::Error> {
  let id_str = encode_uuid(id);
  conn
    .call(move |conn| {
      let sql = format!("DELETE FROM {table} WHERE {column} = ?1");
      Ok(conn.execute(&sql, rusqlite::params![id_str])? > 0)
    })
    .await
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = crate::Error;

  // ── Families ──────────────────────────────────────────────────────────────

  async fn add_family(&self, input: NewFamily) -> Result<Family> {
    let family = input.into_family(Utc::now());

    let id_str      = encode_uuid(family.family_id);
    let created_str = encode_dt(family.created_at);
    let updated_str = encode_dt(family.updated_at);
    let f           = family.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO families ({FAMILY_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
          ),
          rusqlite::params![
            id_str,
            f.surname,
            f.surname_romaji,
            f.surname_kanji,
            f.surname_meaning,
            f.origin_prefecture,
            f.origin_city,
            f.arrival_year,
            f.arrival_place,
            f.family_history,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(family)
  }

  async fn get_family(&self, id: Uuid) -> Result<Option<Family>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawFamily> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {FAMILY_COLUMNS} FROM families WHERE family_id = ?1"),
              rusqlite::params![id_str],
              RawFamily::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFamily::into_family).transpose()
  }

  async fn list_families(&self) -> Result<Vec<Family>> {
    let raws: Vec<RawFamily> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FAMILY_COLUMNS} FROM families ORDER BY surname, created_at"
        ))?;
        let rows = stmt
          .query_map([], RawFamily::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFamily::into_family).collect()
  }

  async fn delete_family(&self, id: Uuid) -> Result<()> {
    if !self.exists("families", "family_id", id).await? {
      return Err(CoreError::FamilyNotFound(id).into());
    }
    if self.exists("persons", "family_id", id).await? {
      return Err(CoreError::FamilyHasMembers(id).into());
    }

    match delete_by_id(&self.conn, "families", "family_id", id).await {
      Ok(true) => Ok(()),
      Ok(false) => Err(CoreError::FamilyNotFound(id).into()),
      Err(e) if constraint_code(&e) == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
        Err(CoreError::FamilyHasMembers(id).into())
      }
      Err(e) => Err(e.into()),
    }
  }

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    if !self.exists("families", "family_id", input.family_id).await? {
      return Err(CoreError::FamilyNotFound(input.family_id).into());
    }

    let person = input.into_person(Utc::now());

    let id_str         = encode_uuid(person.person_id);
    let family_str     = encode_uuid(person.family_id);
    let gender         = person.gender.map(encode_label);
    let birth_date     = person.birth_date.map(encode_date);
    let generation     = encode_label(person.generation);
    let marital_status = person.marital_status.map(encode_label);
    let japanese_level = person.japanese_level.map(encode_label);
    let joined_on      = person.joined_on.map(encode_date);
    let created_str    = encode_dt(person.created_at);
    let updated_str    = encode_dt(person.updated_at);
    let p              = person.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO persons ({PERSON_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)"
          ),
          rusqlite::params![
            id_str,
            family_str,
            p.given_names,
            p.paternal_surname,
            p.maternal_surname,
            p.japanese_name,
            p.kanji_name,
            gender,
            birth_date,
            p.birth_place,
            generation,
            marital_status,
            p.phone,
            p.email,
            p.city,
            p.state,
            japanese_level,
            p.is_active_member,
            joined_on,
            p.accepts_public_directory,
            p.accepts_communications,
            p.admin_notes,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(person)
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE person_id = ?1"),
              rusqlite::params![id_str],
              RawPerson::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn list_persons(&self, family_id: Option<Uuid>) -> Result<Vec<Person>> {
    let family_str = family_id.map(encode_uuid);

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(f) = family_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons WHERE family_id = ?1
             ORDER BY paternal_surname, given_names"
          ))?;
          stmt
            .query_map(rusqlite::params![f], RawPerson::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons
             ORDER BY paternal_surname, given_names"
          ))?;
          stmt
            .query_map([], RawPerson::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn delete_person(&self, id: Uuid) -> Result<()> {
    if self.exists("companies", "owner_id", id).await? {
      return Err(CoreError::PersonOwnsCompany(id).into());
    }

    // Relations on either side and participations go with the person via
    // ON DELETE CASCADE; organised events keep running without an organizer.
    match delete_by_id(&self.conn, "persons", "person_id", id).await {
      Ok(true) => Ok(()),
      Ok(false) => Err(CoreError::PersonNotFound(id).into()),
      Err(e) if constraint_code(&e) == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
        Err(CoreError::PersonOwnsCompany(id).into())
      }
      Err(e) => Err(e.into()),
    }
  }

  // ── Genealogy ─────────────────────────────────────────────────────────────

  async fn record_relation(
    &self,
    input: NewGenealogyRelation,
  ) -> Result<GenealogyRelation> {
    input.validate()?;
    self.require_person(input.person_id).await?;
    self.require_person(input.relative_id).await?;

    let duplicate = CoreError::DuplicateRelation {
      person_id:     input.person_id,
      relative_id:   input.relative_id,
      relation_type: input.relation_type,
    };
    if self.relation_triple_exists(&input).await? {
      return Err(duplicate.into());
    }

    let relation = GenealogyRelation::from_new(input, Utc::now());

    let id_str       = encode_uuid(relation.relation_id);
    let person_str   = encode_uuid(relation.person_id);
    let relative_str = encode_uuid(relation.relative_id);
    let type_str     = encode_relation_type(relation.relation_type);
    let notes        = relation.notes.clone();
    let created_str  = encode_dt(relation.created_at);
    let updated_str  = encode_dt(relation.updated_at);

    let inserted = self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO genealogy ({RELATION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, 0, NULL, ?5, ?6, ?7)"
          ),
          rusqlite::params![
            id_str,
            person_str,
            relative_str,
            type_str,
            notes,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await;

    let Err(e) = inserted else { return Ok(relation) };
    match constraint_code(&e) {
      // Lost a race with an identical insert.
      Some(ffi::SQLITE_CONSTRAINT_UNIQUE) => Err(duplicate.into()),
      // One endpoint was deleted after the existence checks.
      Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
        self.require_person(relation.person_id).await?;
        self.require_person(relation.relative_id).await?;
        Err(e.into())
      }
      _ => Err(e.into()),
    }
  }

  async fn get_relation(&self, id: Uuid) -> Result<Option<GenealogyRelation>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_relation(conn, &id_str)?))
      .await?;
    raw.map(RawRelation::into_relation).transpose()
  }

  async fn relations_for_person(
    &self,
    person_id: Uuid,
  ) -> Result<Vec<GenealogyRelation>> {
    let id_str = encode_uuid(person_id);

    let raws: Vec<RawRelation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RELATION_COLUMNS} FROM genealogy
           WHERE person_id = ?1 OR relative_id = ?1
           ORDER BY created_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawRelation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRelation::into_relation).collect()
  }

  async fn confirm_relation(&self, id: Uuid) -> Result<GenealogyRelation> {
    let id_str = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    // Only the confirmation columns are written; notes are left alone.
    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE genealogy
           SET confirmed_by_both_parties = 1, confirmation_date = ?2,
               updated_at = ?2
           WHERE relation_id = ?1",
          rusqlite::params![id_str, now_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_relation(conn, &id_str)?)
      })
      .await?;

    raw.ok_or(CoreError::RelationNotFound(id))?.into_relation()
  }

  async fn update_relation_notes(
    &self,
    id: Uuid,
    notes: Option<String>,
  ) -> Result<GenealogyRelation> {
    let id_str = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    // Only notes are written; the confirmation state is left alone.
    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE genealogy SET notes = ?2, updated_at = ?3
           WHERE relation_id = ?1",
          rusqlite::params![id_str, notes, now_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_relation(conn, &id_str)?)
      })
      .await?;

    raw.ok_or(CoreError::RelationNotFound(id))?.into_relation()
  }

  async fn delete_relation(&self, id: Uuid) -> Result<()> {
    if !delete_by_id(&self.conn, "genealogy", "relation_id", id).await? {
      return Err(CoreError::RelationNotFound(id).into());
    }
    Ok(())
  }

  async fn kinships(
    &self,
    person_id: Uuid,
    query: &RelationQuery,
  ) -> Result<Vec<Kinship>> {
    self.require_person(person_id).await?;

    let kinships = self
      .relations_for_person(person_id)
      .await?
      .iter()
      .filter_map(|r| r.seen_from(person_id))
      .filter(|k| query.matches(k))
      .collect();

    Ok(kinships)
  }

  // ── Companies ─────────────────────────────────────────────────────────────

  async fn add_company(&self, input: NewCompany) -> Result<Company> {
    let owner_id = input.owner_id;
    self.require_person(owner_id).await?;
    if self.exists("companies", "owner_id", owner_id).await? {
      return Err(CoreError::OwnerHasCompany(owner_id).into());
    }

    let company = input.into_company(Utc::now());

    let id_str      = encode_uuid(company.company_id);
    let owner_str   = encode_uuid(company.owner_id);
    let founded_on  = company.founded_on.map(encode_date);
    let created_str = encode_dt(company.created_at);
    let updated_str = encode_dt(company.updated_at);
    let c           = company.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO companies ({COMPANY_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                     ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)"
          ),
          rusqlite::params![
            id_str,
            owner_str,
            c.name,
            c.legal_name,
            c.tax_id,
            c.line_of_business,
            c.sector,
            c.description,
            c.phone,
            c.email,
            c.website,
            c.address,
            c.city,
            c.state,
            c.postal_code,
            founded_on,
            c.employee_count,
            c.listed_in_directory,
            c.products_services,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await;

    let Err(e) = inserted else { return Ok(company) };
    match constraint_code(&e) {
      Some(ffi::SQLITE_CONSTRAINT_UNIQUE) => {
        Err(CoreError::OwnerHasCompany(owner_id).into())
      }
      Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
        Err(CoreError::PersonNotFound(owner_id).into())
      }
      _ => Err(e.into()),
    }
  }

  async fn get_company(&self, id: Uuid) -> Result<Option<Company>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCompany> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {COMPANY_COLUMNS} FROM companies WHERE company_id = ?1"
              ),
              rusqlite::params![id_str],
              RawCompany::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCompany::into_company).transpose()
  }

  async fn list_companies(&self) -> Result<Vec<Company>> {
    let raws: Vec<RawCompany> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMPANY_COLUMNS} FROM companies ORDER BY name"
        ))?;
        let rows = stmt
          .query_map([], RawCompany::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCompany::into_company).collect()
  }

  async fn delete_company(&self, id: Uuid) -> Result<()> {
    if !delete_by_id(&self.conn, "companies", "company_id", id).await? {
      return Err(CoreError::CompanyNotFound(id).into());
    }
    Ok(())
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn add_event(&self, input: NewEvent) -> Result<Event> {
    if let Some(organizer) = input.organizer_id {
      self.require_person(organizer).await?;
    }

    let event = input.into_event(Utc::now());

    let id_str        = encode_uuid(event.event_id);
    let organizer_str = event.organizer_id.map(encode_uuid);
    let kind          = encode_label(event.kind);
    let starts_str    = encode_dt(event.starts_at);
    let ends_str      = event.ends_at.map(encode_dt);
    let status        = encode_label(event.status);
    let created_str   = encode_dt(event.created_at);
    let updated_str   = encode_dt(event.updated_at);
    let e             = event.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO events ({EVENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                     ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
          ),
          rusqlite::params![
            id_str,
            organizer_str,
            e.title,
            e.description,
            kind,
            starts_str,
            ends_str,
            e.venue,
            e.address,
            e.city,
            e.max_capacity,
            e.requires_registration,
            e.is_public,
            e.stream_url,
            e.requirements,
            e.organizer_contact,
            status,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_event(conn, &id_str)?))
      .await?;
    raw.map(RawEvent::into_event).transpose()
  }

  async fn list_events(&self) -> Result<Vec<Event>> {
    let raws: Vec<RawEvent> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM events ORDER BY starts_at"
        ))?;
        let rows = stmt
          .query_map([], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn set_event_status(&self, id: Uuid, status: EventStatus) -> Result<Event> {
    let id_str = encode_uuid(id);
    let status_str = encode_label(status);
    let now_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE events SET status = ?2, updated_at = ?3 WHERE event_id = ?1",
          rusqlite::params![id_str, status_str, now_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_event(conn, &id_str)?)
      })
      .await?;

    raw.ok_or(CoreError::EventNotFound(id))?.into_event()
  }

  async fn delete_event(&self, id: Uuid) -> Result<()> {
    if !delete_by_id(&self.conn, "events", "event_id", id).await? {
      return Err(CoreError::EventNotFound(id).into());
    }
    Ok(())
  }

  // ── Participation ─────────────────────────────────────────────────────────

  async fn register_participation(
    &self,
    input: NewParticipation,
  ) -> Result<Participation> {
    let person_id = input.person_id;
    let event_id  = input.event_id;
    let requested = input.total_people();
    let participation = input.into_participation(Utc::now());

    let id_str         = encode_uuid(participation.participation_id);
    let person_str     = encode_uuid(person_id);
    let event_str      = encode_uuid(event_id);
    let status         = encode_label(participation.status);
    let registered_str = encode_dt(participation.registered_at);
    let p              = participation.clone();

    // The checks and the insert share one transaction, so two registrations
    // cannot both take the last seat.
    let outcome: Result<Result<()>, tokio_rusqlite::Error> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(raw_event) = select_event(&tx, &event_str)? else {
          return Ok(Err(CoreError::EventNotFound(event_id).into()));
        };
        let event = match raw_event.into_event() {
          Ok(event) => event,
          Err(e) => return Ok(Err(e)),
        };
        if !event.accepts_registrations() {
          return Ok(Err(CoreError::EventClosed(event_id).into()));
        }
        if !row_exists(&tx, "persons", "person_id", &person_str)? {
          return Ok(Err(CoreError::PersonNotFound(person_id).into()));
        }

        let already: bool = tx
          .query_row(
            "SELECT 1 FROM participations WHERE person_id = ?1 AND event_id = ?2",
            rusqlite::params![person_str, event_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if already {
          return Ok(Err(
            CoreError::DuplicateParticipation { person_id, event_id }.into(),
          ));
        }

        let current: u32 = tx.query_row(
          "SELECT COALESCE(SUM(1 + companions), 0) FROM participations
           WHERE event_id = ?1 AND status != 'cancelled'",
          rusqlite::params![event_str],
          |row| row.get(0),
        )?;
        if !event.has_capacity_for(current, requested) {
          return Ok(Err(CoreError::EventFull(event_id).into()));
        }

        tx.execute(
          &format!(
            "INSERT INTO participations ({PARTICIPATION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, NULL, NULL, ?7, ?8, ?9)"
          ),
          rusqlite::params![
            id_str,
            person_str,
            event_str,
            status,
            registered_str,
            p.notes,
            p.companions,
            p.special_needs,
            registered_str,
          ],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await;

    match outcome {
      Ok(checked) => checked.map(|()| participation),
      Err(e) if constraint_code(&e) == Some(ffi::SQLITE_CONSTRAINT_UNIQUE) => {
        Err(CoreError::DuplicateParticipation { person_id, event_id }.into())
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn get_participation(&self, id: Uuid) -> Result<Option<Participation>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_participation(conn, &id_str)?))
      .await?;
    raw.map(RawParticipation::into_participation).transpose()
  }

  async fn participations_for_event(
    &self,
    event_id: Uuid,
  ) -> Result<Vec<Participation>> {
    if !self.exists("events", "event_id", event_id).await? {
      return Err(CoreError::EventNotFound(event_id).into());
    }
    let id_str = encode_uuid(event_id);

    let raws: Vec<RawParticipation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PARTICIPATION_COLUMNS} FROM participations
           WHERE event_id = ?1 ORDER BY registered_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawParticipation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawParticipation::into_participation)
      .collect()
  }

  async fn participations_for_person(
    &self,
    person_id: Uuid,
  ) -> Result<Vec<Participation>> {
    self.require_person(person_id).await?;
    let id_str = encode_uuid(person_id);

    let raws: Vec<RawParticipation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PARTICIPATION_COLUMNS} FROM participations
           WHERE person_id = ?1 ORDER BY registered_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawParticipation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawParticipation::into_participation)
      .collect()
  }

  async fn transition_participation(
    &self,
    id: Uuid,
    action: ParticipationAction,
  ) -> Result<Participation> {
    let id_str = encode_uuid(id);
    let now = Utc::now();

    // Read, decide, and write in one closure so the decision is made against
    // the status actually stored.
    let outcome: Result<Participation> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(raw) = select_participation(&tx, &id_str)? else {
          return Ok(Err(CoreError::ParticipationNotFound(id).into()));
        };
        let mut participation = match raw.into_participation() {
          Ok(p) => p,
          Err(e) => return Ok(Err(e)),
        };
        if let Err(e) = participation.apply(action, now) {
          return Ok(Err(e.into()));
        }

        tx.execute(
          "UPDATE participations
           SET status = ?2, confirmation_date = ?3, updated_at = ?4
           WHERE participation_id = ?1",
          rusqlite::params![
            id_str,
            encode_label(participation.status),
            participation.confirmation_date.map(encode_dt),
            encode_dt(participation.updated_at),
          ],
        )?;
        tx.commit()?;
        Ok(Ok(participation))
      })
      .await?;

    outcome
  }

  async fn rate_participation(
    &self,
    id: Uuid,
    rating: u8,
    comment: Option<String>,
  ) -> Result<Participation> {
    validate_rating(rating)?;
    let id_str = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE participations SET rating = ?2, comment = ?3, updated_at = ?4
           WHERE participation_id = ?1",
          rusqlite::params![id_str, rating, comment, now_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_participation(conn, &id_str)?)
      })
      .await?;

    raw
      .ok_or(CoreError::ParticipationNotFound(id))?
      .into_participation()
  }

  async fn delete_participation(&self, id: Uuid) -> Result<()> {
    if !delete_by_id(&self.conn, "participations", "participation_id", id).await?
    {
      return Err(CoreError::ParticipationNotFound(id).into());
    }
    Ok(())
  }
}
