//! The relation-type vocabulary and the classifier built on it.
//!
//! The vocabulary is closed: every [`RelationType`] variant knows its family
//! category, its inverse, and its generational offset, so the classifier is
//! total over the enum. The `*_label` functions work on raw strings and fall
//! back to neutral values (`Unclassified`, identity, `0`) for anything outside
//! the vocabulary.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{Error, Result};

// ─── Vocabulary ──────────────────────────────────────────────────────────────

/// How the relative relates to the recording person, i.e. "the relative is
/// the person's `<RelationType>`".
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RelationType {
  // ── Parent / child ──────────────────────────────────────────────────────
  Father,
  Mother,
  Son,
  Daughter,

  // ── Marital ─────────────────────────────────────────────────────────────
  Husband,
  Wife,

  // ── Siblings ────────────────────────────────────────────────────────────
  Brother,
  Sister,

  // ── Grandparent / grandchild ────────────────────────────────────────────
  Grandfather,
  Grandmother,
  Grandson,
  Granddaughter,

  // ── Extended ────────────────────────────────────────────────────────────
  Uncle,
  Aunt,
  CousinMale,
  CousinFemale,

  // ── In-laws ─────────────────────────────────────────────────────────────
  BrotherInLaw,
  SisterInLaw,
  SonInLaw,
  DaughterInLaw,
  FatherInLaw,
  MotherInLaw,
}

/// Semantic family a relation type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyCategory {
  ParentChild,
  Marital,
  Sibling,
  GrandparentGrandchild,
  AuntUncleNiece,
  Cousin,
  InLaw,
  /// Only produced for labels outside the vocabulary.
  Unclassified,
}

/// Generation bucket relative to the subject person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lineage {
  Ancestors,
  SameGeneration,
  Descendants,
}

impl Lineage {
  /// Bucket a signed generational offset: negative is an ancestor generation.
  pub fn from_offset(offset: i8) -> Self {
    match offset {
      o if o < 0 => Self::Ancestors,
      0 => Self::SameGeneration,
      _ => Self::Descendants,
    }
  }
}

impl RelationType {
  /// Parse a wire label, rejecting anything outside the vocabulary.
  pub fn from_label(label: &str) -> Result<Self> {
    label
      .parse()
      .map_err(|_| Error::InvalidRelationType(label.to_owned()))
  }

  /// The snake_case wire label, e.g. `"brother_in_law"`.
  pub fn label(self) -> &'static str { self.into() }

  /// Every relation type, in declaration order.
  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  pub fn family(self) -> FamilyCategory {
    use RelationType::*;
    match self {
      Father | Mother | Son | Daughter => FamilyCategory::ParentChild,
      Husband | Wife => FamilyCategory::Marital,
      Brother | Sister => FamilyCategory::Sibling,
      Grandfather | Grandmother | Grandson | Granddaughter => {
        FamilyCategory::GrandparentGrandchild
      }
      Uncle | Aunt => FamilyCategory::AuntUncleNiece,
      CousinMale | CousinFemale => FamilyCategory::Cousin,
      BrotherInLaw | SisterInLaw | SonInLaw | DaughterInLaw | FatherInLaw
      | MotherInLaw => FamilyCategory::InLaw,
    }
  }

  /// The label the relative would use for the recording person.
  ///
  /// Gendered pairs collapse onto the masculine form. Uncle and aunt map to
  /// `CousinMale`, whose own inverse is `CousinMale`, so this is not an
  /// involution for that family.
  pub fn inverse(self) -> Self {
    use RelationType::*;
    match self {
      Father | Mother => Son,
      Son | Daughter => Father,
      Husband => Wife,
      Wife => Husband,
      Brother | Sister => Brother,
      Grandfather | Grandmother => Grandson,
      Grandson | Granddaughter => Grandfather,
      Uncle | Aunt => CousinMale,
      CousinMale | CousinFemale => CousinMale,
      BrotherInLaw | SisterInLaw => BrotherInLaw,
      SonInLaw | DaughterInLaw => FatherInLaw,
      FatherInLaw | MotherInLaw => SonInLaw,
    }
  }

  /// Signed generation distance of the relative: negative for ancestors,
  /// positive for descendants.
  pub fn generational_offset(self) -> i8 {
    use RelationType::*;
    match self {
      Grandfather | Grandmother => -2,
      Father | Mother | Uncle | Aunt | FatherInLaw | MotherInLaw => -1,
      Husband | Wife | Brother | Sister | CousinMale | CousinFemale
      | BrotherInLaw | SisterInLaw => 0,
      Son | Daughter | SonInLaw | DaughterInLaw => 1,
      Grandson | Granddaughter => 2,
    }
  }

  pub fn lineage(self) -> Lineage {
    Lineage::from_offset(self.generational_offset())
  }
}

// ─── Lenient string-level classifier ─────────────────────────────────────────

/// Category for a raw label; `Unclassified` when it is not in the vocabulary.
pub fn classify_label(label: &str) -> FamilyCategory {
  RelationType::from_label(label)
    .map(RelationType::family)
    .unwrap_or(FamilyCategory::Unclassified)
}

/// Inverse of a raw label; unknown labels come back unchanged.
pub fn inverse_label(label: &str) -> Cow<'_, str> {
  match RelationType::from_label(label) {
    Ok(rt) => Cow::Borrowed(rt.inverse().label()),
    Err(_) => Cow::Borrowed(label),
  }
}

/// Generational offset of a raw label; `0` when it is not in the vocabulary.
pub fn generational_offset_label(label: &str) -> i8 {
  RelationType::from_label(label)
    .map(RelationType::generational_offset)
    .unwrap_or(0)
}
