//! Integration tests for `SqliteStore` against an in-memory database.

use std::ffi::c_int;

use chrono::{Duration, NaiveDate, Utc};
use nikkei_core::{
  Error as CoreError,
  company::NewCompany,
  event::{EventKind, EventStatus, NewEvent},
  family::NewFamily,
  genealogy::{GenealogyRelation, NewGenealogyRelation, RelationQuery},
  kinship::{FamilyCategory, Lineage, RelationType},
  participation::{NewParticipation, ParticipationAction, ParticipationStatus},
  person::{Gender, Generation, JapaneseLevel, NewPerson, Person},
  store::RegistryStore,
};
use rusqlite::ffi;
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn family(s: &SqliteStore, surname: &str) -> Uuid {
  s.add_family(NewFamily::new(surname)).await.unwrap().family_id
}

async fn person(s: &SqliteStore, family_id: Uuid, given: &str) -> Person {
  s.add_person(NewPerson::new(family_id, given, "Tanaka", Generation::Nisei))
    .await
    .unwrap()
}

fn core_err(err: Error) -> CoreError {
  match err {
    Error::Core(e) => e,
    other => panic!("expected a domain error, got {other:?}"),
  }
}

async fn relation(
  s: &SqliteStore,
  a: &Person,
  b: &Person,
  rt: RelationType,
) -> GenealogyRelation {
  s.record_relation(NewGenealogyRelation::new(a.person_id, b.person_id, rt))
    .await
    .unwrap()
}

/// Run `sql` directly against the connection, skipping every store check.
async fn raw_sql(s: &SqliteStore, sql: String) -> Result<usize, tokio_rusqlite::Error> {
  s.connection()
    .call(move |conn| Ok(conn.execute(&sql, [])?))
    .await
}

fn extended_code(err: tokio_rusqlite::Error) -> c_int {
  match err {
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _)) => {
      f.extended_code
    }
    other => panic!("expected an SQLite failure, got {other:?}"),
  }
}

async fn event(s: &SqliteStore, max_capacity: Option<u32>) -> Uuid {
  let mut input = NewEvent::new(
    "Bon Odori",
    EventKind::Matsuri,
    Utc::now() + Duration::days(30),
  );
  input.max_capacity = max_capacity;
  input.status = EventStatus::Published;
  s.add_event(input).await.unwrap().event_id
}

// ─── Families ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_family() {
  let s = store().await;

  let mut input = NewFamily::new("Tanaka");
  input.surname_kanji = Some("田中".into());
  input.origin_prefecture = Some("Fukuoka".into());
  input.arrival_year = Some(1954);

  let family = s.add_family(input).await.unwrap();
  let fetched = s.get_family(family.family_id).await.unwrap().unwrap();

  assert_eq!(fetched, family);
  assert_eq!(fetched.surname_kanji.as_deref(), Some("田中"));
  assert_eq!(fetched.arrival_year, Some(1954));
}

#[tokio::test]
async fn get_family_missing_returns_none() {
  let s = store().await;
  assert!(s.get_family(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_families_sorted_by_surname() {
  let s = store().await;
  family(&s, "Yamamoto").await;
  family(&s, "Sato").await;
  family(&s, "Tanaka").await;

  let names: Vec<_> = s
    .list_families()
    .await
    .unwrap()
    .into_iter()
    .map(|f| f.surname)
    .collect();
  assert_eq!(names, ["Sato", "Tanaka", "Yamamoto"]);
}

#[tokio::test]
async fn delete_family_with_members_is_refused() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let p = person(&s, fid, "Hiroshi").await;

  let err = s.delete_family(fid).await.unwrap_err();
  assert!(matches!(core_err(err), CoreError::FamilyHasMembers(id) if id == fid));

  s.delete_person(p.person_id).await.unwrap();
  s.delete_family(fid).await.unwrap();
  assert!(s.get_family(fid).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_missing_family_errors() {
  let s = store().await;
  let err = s.delete_family(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(core_err(err), CoreError::FamilyNotFound(_)));
}

// ─── Persons ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn person_fields_roundtrip() {
  let s = store().await;
  let fid = family(&s, "Sato").await;

  let mut input = NewPerson::new(fid, "Carlos Kenji", "Sato", Generation::Sansei);
  input.maternal_surname = Some("López".into());
  input.gender = Some(Gender::Male);
  input.birth_date = NaiveDate::from_ymd_opt(1980, 2, 29);
  input.japanese_level = Some(JapaneseLevel::Intermediate);
  input.is_active_member = true;

  let p = s.add_person(input).await.unwrap();
  let fetched = s.get_person(p.person_id).await.unwrap().unwrap();

  assert_eq!(fetched, p);
  assert_eq!(fetched.full_name(), "Carlos Kenji Sato López");
  assert_eq!(fetched.state, "Sinaloa");
  assert!(fetched.accepts_communications);
  assert_eq!(fetched.birth_date, NaiveDate::from_ymd_opt(1980, 2, 29));
}

#[tokio::test]
async fn add_person_requires_family() {
  let s = store().await;
  let missing = Uuid::new_v4();
  let err = s
    .add_person(NewPerson::new(missing, "Ana", "Yamamoto", Generation::Yonsei))
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::FamilyNotFound(id) if id == missing));
}

#[tokio::test]
async fn list_persons_filtered_by_family() {
  let s = store().await;
  let tanaka = family(&s, "Tanaka").await;
  let sato = family(&s, "Sato").await;
  person(&s, tanaka, "Hiroshi").await;
  person(&s, tanaka, "María Elena").await;
  person(&s, sato, "Carlos").await;

  assert_eq!(s.list_persons(None).await.unwrap().len(), 3);
  let members = s.list_persons(Some(tanaka)).await.unwrap();
  assert_eq!(members.len(), 2);
  assert!(members.iter().all(|p| p.family_id == tanaka));
}

#[tokio::test]
async fn delete_missing_person_errors() {
  let s = store().await;
  let err = s.delete_person(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(core_err(err), CoreError::PersonNotFound(_)));
}

// ─── Genealogy ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_and_get_relation() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let child = person(&s, fid, "María Elena").await;
  let father = person(&s, fid, "Hiroshi").await;

  let mut input =
    NewGenealogyRelation::new(child.person_id, father.person_id, RelationType::Father);
  input.notes = Some("from the 1960 family register".into());

  let r = s.record_relation(input).await.unwrap();
  assert!(!r.is_confirmed());
  assert!(r.confirmation_date.is_none());

  let fetched = s.get_relation(r.relation_id).await.unwrap().unwrap();
  assert_eq!(fetched, r);
  assert_eq!(fetched.relation_type, RelationType::Father);
  assert_eq!(fetched.notes.as_deref(), Some("from the 1960 family register"));
}

#[tokio::test]
async fn self_reference_is_rejected() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let p = person(&s, fid, "Hiroshi").await;

  let err = s
    .record_relation(NewGenealogyRelation::new(
      p.person_id,
      p.person_id,
      RelationType::Brother,
    ))
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::SelfReference(id) if id == p.person_id));
}

#[tokio::test]
async fn duplicate_triple_is_rejected() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let b = person(&s, fid, "Yuki").await;

  let input = NewGenealogyRelation::new(a.person_id, b.person_id, RelationType::Sister);
  s.record_relation(input.clone()).await.unwrap();

  let err = s.record_relation(input).await.unwrap_err();
  assert!(matches!(
    core_err(err),
    CoreError::DuplicateRelation { relation_type: RelationType::Sister, .. }
  ));

  // A different label between the same pair is a distinct relation.
  s.record_relation(NewGenealogyRelation::new(
    a.person_id,
    b.person_id,
    RelationType::SisterInLaw,
  ))
  .await
  .unwrap();
}

#[tokio::test]
async fn relation_to_missing_person_is_rejected() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let ghost = Uuid::new_v4();

  let err = s
    .record_relation(NewGenealogyRelation::new(a.person_id, ghost, RelationType::Son))
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::PersonNotFound(id) if id == ghost));
}

#[tokio::test]
async fn confirm_relation_persists_stamp() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let b = person(&s, fid, "Yuki").await;

  let r = s
    .record_relation(NewGenealogyRelation::new(a.person_id, b.person_id, RelationType::Wife))
    .await
    .unwrap();

  let confirmed = s.confirm_relation(r.relation_id).await.unwrap();
  assert!(confirmed.is_confirmed());
  assert!(confirmed.confirmation_date.is_some());

  let fetched = s.get_relation(r.relation_id).await.unwrap().unwrap();
  assert!(fetched.confirmed_by_both_parties);
  assert_eq!(fetched.confirmation_date, confirmed.confirmation_date);
}

#[tokio::test]
async fn confirm_missing_relation_errors() {
  let s = store().await;
  let err = s.confirm_relation(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(core_err(err), CoreError::RelationNotFound(_)));
}

#[tokio::test]
async fn update_notes_keeps_confirmation() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let b = person(&s, fid, "Yuki").await;

  let r = s
    .record_relation(NewGenealogyRelation::new(
      a.person_id,
      b.person_id,
      RelationType::CousinFemale,
    ))
    .await
    .unwrap();
  s.confirm_relation(r.relation_id).await.unwrap();

  let updated = s
    .update_relation_notes(r.relation_id, Some("met at the 2023 matsuri".into()))
    .await
    .unwrap();
  assert_eq!(updated.notes.as_deref(), Some("met at the 2023 matsuri"));
  assert!(updated.is_confirmed());

  let cleared = s.update_relation_notes(r.relation_id, None).await.unwrap();
  assert!(cleared.notes.is_none());
  let fetched = s.get_relation(r.relation_id).await.unwrap().unwrap();
  assert!(fetched.notes.is_none());
  assert!(fetched.is_confirmed());
}

#[tokio::test]
async fn delete_relation() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let b = person(&s, fid, "Yuki").await;

  let r = s
    .record_relation(NewGenealogyRelation::new(a.person_id, b.person_id, RelationType::Aunt))
    .await
    .unwrap();
  s.delete_relation(r.relation_id).await.unwrap();
  assert!(s.get_relation(r.relation_id).await.unwrap().is_none());

  let err = s.delete_relation(r.relation_id).await.unwrap_err();
  assert!(matches!(core_err(err), CoreError::RelationNotFound(_)));
}

#[tokio::test]
async fn deleting_either_person_cascades_relations() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let b = person(&s, fid, "Yuki").await;
  let c = person(&s, fid, "Hiroshi").await;

  let ab = s
    .record_relation(NewGenealogyRelation::new(a.person_id, b.person_id, RelationType::Sister))
    .await
    .unwrap();
  let cb = s
    .record_relation(NewGenealogyRelation::new(c.person_id, b.person_id, RelationType::Daughter))
    .await
    .unwrap();
  let ac = s
    .record_relation(NewGenealogyRelation::new(a.person_id, c.person_id, RelationType::Father))
    .await
    .unwrap();

  // `b` is the relative side of two relations.
  s.delete_person(b.person_id).await.unwrap();
  assert!(s.get_relation(ab.relation_id).await.unwrap().is_none());
  assert!(s.get_relation(cb.relation_id).await.unwrap().is_none());
  assert!(s.get_relation(ac.relation_id).await.unwrap().is_some());

  // `a` is the recording side of the last one.
  s.delete_person(a.person_id).await.unwrap();
  assert!(s.get_relation(ac.relation_id).await.unwrap().is_none());
}

#[tokio::test]
async fn relations_for_person_covers_both_sides() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let b = person(&s, fid, "Yuki").await;
  let c = person(&s, fid, "Hiroshi").await;

  s.record_relation(NewGenealogyRelation::new(a.person_id, b.person_id, RelationType::Sister))
    .await
    .unwrap();
  s.record_relation(NewGenealogyRelation::new(c.person_id, a.person_id, RelationType::Son))
    .await
    .unwrap();
  s.record_relation(NewGenealogyRelation::new(b.person_id, c.person_id, RelationType::Father))
    .await
    .unwrap();

  assert_eq!(s.relations_for_person(a.person_id).await.unwrap().len(), 2);
  assert_eq!(s.relations_for_person(b.person_id).await.unwrap().len(), 2);
  assert!(s.relations_for_person(Uuid::new_v4()).await.unwrap().is_empty());
}

// ─── Kinships ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn kinships_view_from_each_side() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let me = person(&s, fid, "Yuki").await;
  let grandpa = person(&s, fid, "Hiroshi").await;
  let brother = person(&s, fid, "Kenji").await;
  let nephew_side = person(&s, fid, "Taro").await;

  // Recorded by me.
  s.record_relation(NewGenealogyRelation::new(
    me.person_id,
    grandpa.person_id,
    RelationType::Grandfather,
  ))
  .await
  .unwrap();
  let sibling = s
    .record_relation(NewGenealogyRelation::new(
      me.person_id,
      brother.person_id,
      RelationType::Brother,
    ))
    .await
    .unwrap();
  // Recorded by someone else: I am Taro's aunt, so Taro is my cousin_male.
  s.record_relation(NewGenealogyRelation::new(
    nephew_side.person_id,
    me.person_id,
    RelationType::Aunt,
  ))
  .await
  .unwrap();
  s.confirm_relation(sibling.relation_id).await.unwrap();

  let all = s
    .kinships(me.person_id, &RelationQuery::default())
    .await
    .unwrap();
  assert_eq!(all.len(), 3);

  let from_taro = all
    .iter()
    .find(|k| k.relative_id == nephew_side.person_id)
    .unwrap();
  assert_eq!(from_taro.relation_type, RelationType::CousinMale);
  assert_eq!(from_taro.family, FamilyCategory::Cousin);

  let ancestors = s
    .kinships(me.person_id, &RelationQuery {
      lineage: Some(Lineage::Ancestors),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(ancestors.len(), 1);
  assert_eq!(ancestors[0].relative_id, grandpa.person_id);
  assert_eq!(ancestors[0].generational_offset, -2);

  let confirmed = s
    .kinships(me.person_id, &RelationQuery {
      confirmed: Some(true),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(confirmed.len(), 1);
  assert_eq!(confirmed[0].relative_id, brother.person_id);

  // The grandfather sees a descendant.
  let grandpa_view = s
    .kinships(grandpa.person_id, &RelationQuery::default())
    .await
    .unwrap();
  assert_eq!(grandpa_view.len(), 1);
  assert_eq!(grandpa_view[0].relation_type, RelationType::Grandson);
  assert_eq!(grandpa_view[0].lineage(), Lineage::Descendants);
}

#[tokio::test]
async fn kinships_for_missing_person_errors() {
  let s = store().await;
  let err = s
    .kinships(Uuid::new_v4(), &RelationQuery::default())
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::PersonNotFound(_)));
}

// ─── Concurrent edits ────────────────────────────────────────────────────────

#[tokio::test]
async fn notes_edit_racing_confirmation_keeps_both() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let b = person(&s, fid, "Yuki").await;
  let r = relation(&s, &a, &b, RelationType::Brother).await;

  let (confirmed, noted) = tokio::join!(
    s.confirm_relation(r.relation_id),
    s.update_relation_notes(r.relation_id, Some("note".into())),
  );
  confirmed.unwrap();
  noted.unwrap();

  let stored = s.get_relation(r.relation_id).await.unwrap().unwrap();
  assert!(stored.is_confirmed());
  assert!(stored.confirmation_date.is_some());
  assert_eq!(stored.notes.as_deref(), Some("note"));
}

#[tokio::test]
async fn many_notes_edits_never_undo_confirmation() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let b = person(&s, fid, "Yuki").await;
  let r = relation(&s, &a, &b, RelationType::Sister).await;

  let edits: Vec<_> = (0..8)
    .map(|i| {
      let s = s.clone();
      tokio::spawn(async move {
        s.update_relation_notes(r.relation_id, Some(format!("edit {i}"))).await
      })
    })
    .collect();
  let confirm = {
    let s = s.clone();
    tokio::spawn(async move { s.confirm_relation(r.relation_id).await })
  };

  for edit in edits {
    edit.await.unwrap().unwrap();
  }
  confirm.await.unwrap().unwrap();

  let stored = s.get_relation(r.relation_id).await.unwrap().unwrap();
  assert!(stored.is_confirmed());
  assert!(stored.notes.as_deref().is_some_and(|n| n.starts_with("edit ")));
}

// ─── Schema backstops ────────────────────────────────────────────────────────

fn genealogy_insert(
  person_id: Uuid,
  relative_id: Uuid,
  relation_type: &str,
  confirmed: u8,
  confirmation_date: &str,
) -> String {
  let now = Utc::now().to_rfc3339();
  format!(
    "INSERT INTO genealogy (relation_id, person_id, relative_id, relation_type,
       confirmed_by_both_parties, confirmation_date, created_at, updated_at)
     VALUES ('{}', '{person_id}', '{relative_id}', '{relation_type}',
       {confirmed}, {confirmation_date}, '{now}', '{now}')",
    Uuid::new_v4(),
  )
}

#[tokio::test]
async fn schema_rejects_self_reference() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;

  let err = raw_sql(
    &s,
    genealogy_insert(a.person_id, a.person_id, "brother", 0, "NULL"),
  )
  .await
  .unwrap_err();
  assert_eq!(extended_code(err), ffi::SQLITE_CONSTRAINT_CHECK);
}

#[tokio::test]
async fn schema_rejects_duplicate_triple() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let b = person(&s, fid, "Yuki").await;
  relation(&s, &a, &b, RelationType::Sister).await;

  let err = raw_sql(
    &s,
    genealogy_insert(a.person_id, b.person_id, "sister", 0, "NULL"),
  )
  .await
  .unwrap_err();
  assert_eq!(extended_code(err), ffi::SQLITE_CONSTRAINT_UNIQUE);

  // The reverse direction is a different row.
  raw_sql(
    &s,
    genealogy_insert(b.person_id, a.person_id, "sister", 0, "NULL"),
  )
  .await
  .unwrap();
}

#[tokio::test]
async fn schema_rejects_unknown_relation_label() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let b = person(&s, fid, "Yuki").await;

  let err = raw_sql(
    &s,
    genealogy_insert(a.person_id, b.person_id, "godmother", 0, "NULL"),
  )
  .await
  .unwrap_err();
  assert_eq!(extended_code(err), ffi::SQLITE_CONSTRAINT_CHECK);
}

#[tokio::test]
async fn schema_ties_confirmation_flag_to_date() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let b = person(&s, fid, "Yuki").await;

  // Flag without a date.
  let err = raw_sql(
    &s,
    genealogy_insert(a.person_id, b.person_id, "brother", 1, "NULL"),
  )
  .await
  .unwrap_err();
  assert_eq!(extended_code(err), ffi::SQLITE_CONSTRAINT_CHECK);

  // Date without the flag.
  let err = raw_sql(
    &s,
    genealogy_insert(a.person_id, b.person_id, "brother", 0, "'2024-01-01T00:00:00+00:00'"),
  )
  .await
  .unwrap_err();
  assert_eq!(extended_code(err), ffi::SQLITE_CONSTRAINT_CHECK);

  // Updates are held to the same rule.
  let r = relation(&s, &a, &b, RelationType::Brother).await;
  let err = raw_sql(
    &s,
    format!(
      "UPDATE genealogy SET confirmed_by_both_parties = 1
       WHERE relation_id = '{}'",
      r.relation_id
    ),
  )
  .await
  .unwrap_err();
  assert_eq!(extended_code(err), ffi::SQLITE_CONSTRAINT_CHECK);

  s.confirm_relation(r.relation_id).await.unwrap();
  let err = raw_sql(
    &s,
    format!(
      "UPDATE genealogy SET confirmation_date = NULL WHERE relation_id = '{}'",
      r.relation_id
    ),
  )
  .await
  .unwrap_err();
  assert_eq!(extended_code(err), ffi::SQLITE_CONSTRAINT_CHECK);
}

#[tokio::test]
async fn schema_refuses_deleting_family_with_members() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  person(&s, fid, "Kenji").await;

  let err = raw_sql(&s, format!("DELETE FROM families WHERE family_id = '{fid}'"))
    .await
    .unwrap_err();
  assert_eq!(extended_code(err), ffi::SQLITE_CONSTRAINT_FOREIGNKEY);
}

#[tokio::test]
async fn constraint_code_tells_unique_from_foreign_key() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let b = person(&s, fid, "Yuki").await;
  relation(&s, &a, &b, RelationType::Sister).await;

  let duplicate = raw_sql(
    &s,
    genealogy_insert(a.person_id, b.person_id, "sister", 0, "NULL"),
  )
  .await
  .unwrap_err();
  assert_eq!(
    crate::store::constraint_code(&duplicate),
    Some(ffi::SQLITE_CONSTRAINT_UNIQUE)
  );

  let dangling = raw_sql(
    &s,
    genealogy_insert(a.person_id, Uuid::new_v4(), "sister", 0, "NULL"),
  )
  .await
  .unwrap_err();
  assert_eq!(
    crate::store::constraint_code(&dangling),
    Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
  );
}

#[tokio::test]
async fn relation_to_person_removed_behind_the_store_is_not_found() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Kenji").await;
  let b = person(&s, fid, "Yuki").await;
  raw_sql(&s, format!("DELETE FROM persons WHERE person_id = '{}'", b.person_id))
    .await
    .unwrap();

  let err = s
    .record_relation(NewGenealogyRelation::new(a.person_id, b.person_id, RelationType::Son))
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::PersonNotFound(id) if id == b.person_id));
}

// ─── Companies ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn company_fields_roundtrip() {
  let s = store().await;
  let fid = family(&s, "Sato").await;
  let owner = person(&s, fid, "Kenji").await;

  let mut input = NewCompany::new(owner.person_id, "Sushi Kenji");
  input.sector = Some("Restaurantes".into());
  input.founded_on = NaiveDate::from_ymd_opt(1998, 5, 4);
  input.employee_count = Some(12);

  let c = s.add_company(input).await.unwrap();
  let fetched = s.get_company(c.company_id).await.unwrap().unwrap();
  assert_eq!(fetched, c);
  assert!(fetched.is_restaurant());
  assert_eq!(fetched.state, "Sinaloa");
  assert_eq!(s.list_companies().await.unwrap().len(), 1);
}

#[tokio::test]
async fn one_company_per_owner() {
  let s = store().await;
  let fid = family(&s, "Sato").await;
  let owner = person(&s, fid, "Kenji").await;
  s.add_company(NewCompany::new(owner.person_id, "Sushi Kenji"))
    .await
    .unwrap();

  let err = s
    .add_company(NewCompany::new(owner.person_id, "Ferretería Sato"))
    .await
    .unwrap_err();
  assert!(
    matches!(core_err(err), CoreError::OwnerHasCompany(id) if id == owner.person_id)
  );
}

#[tokio::test]
async fn company_owner_must_exist() {
  let s = store().await;
  let ghost = Uuid::new_v4();
  let err = s
    .add_company(NewCompany::new(ghost, "Sushi Kenji"))
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::PersonNotFound(id) if id == ghost));
}

#[tokio::test]
async fn owner_cannot_be_deleted_while_company_exists() {
  let s = store().await;
  let fid = family(&s, "Sato").await;
  let owner = person(&s, fid, "Kenji").await;
  let c = s
    .add_company(NewCompany::new(owner.person_id, "Sushi Kenji"))
    .await
    .unwrap();

  let err = s.delete_person(owner.person_id).await.unwrap_err();
  assert!(
    matches!(core_err(err), CoreError::PersonOwnsCompany(id) if id == owner.person_id)
  );

  s.delete_company(c.company_id).await.unwrap();
  s.delete_person(owner.person_id).await.unwrap();

  let err = s.delete_company(c.company_id).await.unwrap_err();
  assert!(matches!(core_err(err), CoreError::CompanyNotFound(_)));
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn events_list_earliest_first() {
  let s = store().await;
  let now = Utc::now();
  let later = s
    .add_event(NewEvent::new("Undokai", EventKind::Sports, now + Duration::days(60)))
    .await
    .unwrap();
  let sooner = s
    .add_event(NewEvent::new("Bon Odori", EventKind::Matsuri, now + Duration::days(5)))
    .await
    .unwrap();

  let events = s.list_events().await.unwrap();
  let ids: Vec<_> = events.iter().map(|e| e.event_id).collect();
  assert_eq!(ids, [sooner.event_id, later.event_id]);
  assert_eq!(events[0], sooner);
}

#[tokio::test]
async fn event_organizer_must_exist() {
  let s = store().await;
  let mut input = NewEvent::new("Bon Odori", EventKind::Matsuri, Utc::now());
  input.organizer_id = Some(Uuid::new_v4());
  let err = s.add_event(input).await.unwrap_err();
  assert!(matches!(core_err(err), CoreError::PersonNotFound(_)));
}

#[tokio::test]
async fn deleting_organizer_keeps_event() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let organizer = person(&s, fid, "Hiroshi").await;
  let mut input = NewEvent::new("Bon Odori", EventKind::Matsuri, Utc::now());
  input.organizer_id = Some(organizer.person_id);
  let e = s.add_event(input).await.unwrap();

  s.delete_person(organizer.person_id).await.unwrap();
  let fetched = s.get_event(e.event_id).await.unwrap().unwrap();
  assert!(fetched.organizer_id.is_none());
}

#[tokio::test]
async fn set_event_status_touches_only_status() {
  let s = store().await;
  let mut input = NewEvent::new("Bon Odori", EventKind::Matsuri, Utc::now());
  input.venue = Some("Casa Nikkei".into());
  let e = s.add_event(input).await.unwrap();

  let published = s
    .set_event_status(e.event_id, EventStatus::Published)
    .await
    .unwrap();
  assert!(published.is_published());
  assert_eq!(published.venue.as_deref(), Some("Casa Nikkei"));

  let err = s
    .set_event_status(Uuid::new_v4(), EventStatus::Finished)
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::EventNotFound(_)));
}

// ─── Participation ───────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_list_participation() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let p = person(&s, fid, "Yuki").await;
  let eid = event(&s, None).await;

  let mut input = NewParticipation::new(p.person_id, eid);
  input.companions = 2;
  let part = s.register_participation(input).await.unwrap();
  assert_eq!(part.status, ParticipationStatus::Registered);

  let fetched = s
    .get_participation(part.participation_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched, part);
  assert_eq!(s.participations_for_event(eid).await.unwrap(), [part.clone()]);
  assert_eq!(s.participations_for_person(p.person_id).await.unwrap(), [part]);
}

#[tokio::test]
async fn second_registration_is_a_duplicate() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let p = person(&s, fid, "Yuki").await;
  let eid = event(&s, None).await;

  s.register_participation(NewParticipation::new(p.person_id, eid))
    .await
    .unwrap();
  let err = s
    .register_participation(NewParticipation::new(p.person_id, eid))
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::DuplicateParticipation { .. }));
}

#[tokio::test]
async fn capacity_counts_companions_and_ignores_cancellations() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Yuki").await;
  let b = person(&s, fid, "Kenji").await;
  let eid = event(&s, Some(4)).await;

  let mut group = NewParticipation::new(a.person_id, eid);
  group.companions = 2;
  let first = s.register_participation(group).await.unwrap();

  let mut pair = NewParticipation::new(b.person_id, eid);
  pair.companions = 1;
  let err = s.register_participation(pair.clone()).await.unwrap_err();
  assert!(matches!(core_err(err), CoreError::EventFull(id) if id == eid));

  s.transition_participation(first.participation_id, ParticipationAction::Cancel)
    .await
    .unwrap();
  s.register_participation(pair).await.unwrap();
}

#[tokio::test]
async fn racing_registrations_do_not_overbook() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Yuki").await;
  let b = person(&s, fid, "Kenji").await;
  let eid = event(&s, Some(1)).await;

  let (ra, rb) = tokio::join!(
    s.register_participation(NewParticipation::new(a.person_id, eid)),
    s.register_participation(NewParticipation::new(b.person_id, eid)),
  );
  assert_eq!([ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count(), 1);
  assert_eq!(s.participations_for_event(eid).await.unwrap().len(), 1);
}

#[tokio::test]
async fn closed_or_missing_events_refuse_registration() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let p = person(&s, fid, "Yuki").await;
  let eid = event(&s, None).await;
  s.set_event_status(eid, EventStatus::Cancelled).await.unwrap();

  let err = s
    .register_participation(NewParticipation::new(p.person_id, eid))
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::EventClosed(id) if id == eid));

  let err = s
    .register_participation(NewParticipation::new(p.person_id, Uuid::new_v4()))
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::EventNotFound(_)));

  let open = event(&s, None).await;
  let err = s
    .register_participation(NewParticipation::new(Uuid::new_v4(), open))
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::PersonNotFound(_)));
}

#[tokio::test]
async fn participation_lifecycle_is_persisted() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let p = person(&s, fid, "Yuki").await;
  let eid = event(&s, None).await;
  let part = s
    .register_participation(NewParticipation::new(p.person_id, eid))
    .await
    .unwrap();
  let id = part.participation_id;

  let confirmed = s
    .transition_participation(id, ParticipationAction::Confirm)
    .await
    .unwrap();
  assert!(confirmed.is_confirmed());
  assert!(confirmed.confirmation_date.is_some());

  let attended = s
    .transition_participation(id, ParticipationAction::Attend)
    .await
    .unwrap();
  assert!(attended.attended());
  assert_eq!(attended.confirmation_date, confirmed.confirmation_date);

  let err = s
    .transition_participation(id, ParticipationAction::Cancel)
    .await
    .unwrap_err();
  assert!(matches!(
    core_err(err),
    CoreError::InvalidTransition { from: ParticipationStatus::Attended, .. }
  ));

  let rated = s
    .rate_participation(id, 5, Some("otsukaresama".into()))
    .await
    .unwrap();
  assert_eq!(rated.rating, Some(5));
  assert_eq!(rated.status, ParticipationStatus::Attended);
  assert_eq!(s.get_participation(id).await.unwrap().unwrap(), rated);
}

#[tokio::test]
async fn rating_out_of_range_or_missing_errors() {
  let s = store().await;
  let err = s
    .rate_participation(Uuid::new_v4(), 9, None)
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::InvalidRating(9)));

  let err = s
    .rate_participation(Uuid::new_v4(), 3, None)
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::ParticipationNotFound(_)));
}

#[tokio::test]
async fn participations_go_with_person_and_event() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let a = person(&s, fid, "Yuki").await;
  let b = person(&s, fid, "Kenji").await;
  let eid = event(&s, None).await;
  let pa = s
    .register_participation(NewParticipation::new(a.person_id, eid))
    .await
    .unwrap();
  let pb = s
    .register_participation(NewParticipation::new(b.person_id, eid))
    .await
    .unwrap();

  s.delete_person(a.person_id).await.unwrap();
  assert!(s.get_participation(pa.participation_id).await.unwrap().is_none());

  s.delete_event(eid).await.unwrap();
  assert!(s.get_participation(pb.participation_id).await.unwrap().is_none());

  let err = s.participations_for_event(eid).await.unwrap_err();
  assert!(matches!(core_err(err), CoreError::EventNotFound(_)));
}

#[tokio::test]
async fn delete_participation_twice_errors() {
  let s = store().await;
  let fid = family(&s, "Tanaka").await;
  let p = person(&s, fid, "Yuki").await;
  let eid = event(&s, None).await;
  let part = s
    .register_participation(NewParticipation::new(p.person_id, eid))
    .await
    .unwrap();

  s.delete_participation(part.participation_id).await.unwrap();
  let err = s
    .delete_participation(part.participation_id)
    .await
    .unwrap_err();
  assert!(matches!(core_err(err), CoreError::ParticipationNotFound(_)));
}
