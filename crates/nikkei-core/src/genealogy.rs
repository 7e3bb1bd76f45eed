//! Genealogy relations: a recorded familial link between two persons.
//!
//! A relation is owned by neither endpoint. It is mutated only by
//! confirmation and note edits, and it is removed when either person is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  kinship::{FamilyCategory, Lineage, RelationType},
};

// ─── Relation ────────────────────────────────────────────────────────────────

/// "`relative_id` is the `relation_type` of `person_id`."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenealogyRelation {
  pub relation_id:               Uuid,
  pub person_id:                 Uuid,
  pub relative_id:               Uuid,
  pub relation_type:             RelationType,
  pub confirmed_by_both_parties: bool,
  /// Set together with `confirmed_by_both_parties`, never on its own.
  pub confirmation_date:         Option<DateTime<Utc>>,
  pub notes:                     Option<String>,
  pub created_at:                DateTime<Utc>,
  pub updated_at:                DateTime<Utc>,
}

impl GenealogyRelation {
  /// Build an unconfirmed relation from validated input.
  pub fn from_new(input: NewGenealogyRelation, now: DateTime<Utc>) -> Self {
    Self {
      relation_id: Uuid::new_v4(),
      person_id: input.person_id,
      relative_id: input.relative_id,
      relation_type: input.relation_type,
      confirmed_by_both_parties: false,
      confirmation_date: None,
      notes: input.notes,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn is_confirmed(&self) -> bool { self.confirmed_by_both_parties }

  /// Mark the relation as acknowledged by both persons, stamped with the
  /// current time. Calling it again re-stamps the date.
  pub fn confirm(&mut self) { self.confirm_at(Utc::now()); }

  pub fn confirm_at(&mut self, at: DateTime<Utc>) {
    self.confirmed_by_both_parties = true;
    self.confirmation_date = Some(at);
    self.updated_at = at;
  }

  pub fn family(&self) -> FamilyCategory { self.relation_type.family() }

  pub fn inverse_type(&self) -> RelationType { self.relation_type.inverse() }

  pub fn generational_offset(&self) -> i8 {
    self.relation_type.generational_offset()
  }

  pub fn is_parent_child(&self) -> bool {
    self.family() == FamilyCategory::ParentChild
  }

  pub fn is_marital(&self) -> bool { self.family() == FamilyCategory::Marital }

  pub fn is_sibling(&self) -> bool { self.family() == FamilyCategory::Sibling }

  pub fn is_grandparent_grandchild(&self) -> bool {
    self.family() == FamilyCategory::GrandparentGrandchild
  }

  pub fn is_aunt_uncle(&self) -> bool {
    self.family() == FamilyCategory::AuntUncleNiece
  }

  pub fn is_cousin(&self) -> bool { self.family() == FamilyCategory::Cousin }

  pub fn is_in_law(&self) -> bool { self.family() == FamilyCategory::InLaw }

  /// The relation as seen by `viewer`.
  ///
  /// The recording person sees the stored label; the relative sees the
  /// inverse label pointing back at the recording person. Anyone else gets
  /// `None`.
  pub fn seen_from(&self, viewer: Uuid) -> Option<Kinship> {
    let (relative_id, relation_type) = if viewer == self.person_id {
      (self.relative_id, self.relation_type)
    } else if viewer == self.relative_id {
      (self.person_id, self.relation_type.inverse())
    } else {
      return None;
    };

    Some(Kinship {
      relation_id: self.relation_id,
      relative_id,
      relation_type,
      family: relation_type.family(),
      generational_offset: relation_type.generational_offset(),
      confirmed: self.confirmed_by_both_parties,
    })
  }
}

// ─── NewGenealogyRelation ────────────────────────────────────────────────────

/// Input to [`crate::store::RegistryStore::record_relation`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGenealogyRelation {
  pub person_id:     Uuid,
  pub relative_id:   Uuid,
  pub relation_type: RelationType,
  #[serde(default)]
  pub notes:         Option<String>,
}

impl NewGenealogyRelation {
  pub fn new(
    person_id: Uuid,
    relative_id: Uuid,
    relation_type: RelationType,
  ) -> Self {
    Self { person_id, relative_id, relation_type, notes: None }
  }

  /// Reject a relation from a person to themselves.
  pub fn validate(&self) -> Result<()> {
    if self.person_id == self.relative_id {
      return Err(Error::SelfReference(self.person_id));
    }
    Ok(())
  }
}

// ─── Kinship ─────────────────────────────────────────────────────────────────

/// One relation viewed from one of its endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kinship {
  pub relation_id:         Uuid,
  /// The other endpoint.
  pub relative_id:         Uuid,
  /// How the relative relates to the viewer.
  pub relation_type:       RelationType,
  pub family:              FamilyCategory,
  pub generational_offset: i8,
  pub confirmed:           bool,
}

impl Kinship {
  pub fn lineage(&self) -> Lineage {
    Lineage::from_offset(self.generational_offset)
  }
}

/// Filter over a person's kinships. Empty fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelationQuery {
  pub category:  Option<FamilyCategory>,
  pub lineage:   Option<Lineage>,
  pub confirmed: Option<bool>,
}

impl RelationQuery {
  pub fn matches(&self, kinship: &Kinship) -> bool {
    self.category.is_none_or(|c| c == kinship.family)
      && self.lineage.is_none_or(|l| l == kinship.lineage())
      && self.confirmed.is_none_or(|c| c == kinship.confirmed)
  }
}
