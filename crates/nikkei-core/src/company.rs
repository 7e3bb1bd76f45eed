//! Member-owned businesses listed in the community directory.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::person::DEFAULT_STATE;

/// Sector label the directory uses for restaurants.
pub const RESTAURANT_SECTOR: &str = "Restaurantes";

/// A business owned by exactly one person; a person owns at most one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
  pub company_id:          Uuid,
  pub owner_id:            Uuid,
  pub name:                String,
  pub legal_name:          Option<String>,
  /// Mexican taxpayer id (RFC).
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
  pub founded_on:          Option<NaiveDate>,
  pub employee_count:      Option<u32>,
  pub listed_in_directory: bool,
  pub products_services:   Option<String>,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

impl Company {
  pub fn is_restaurant(&self) -> bool {
    self.sector.as_deref() == Some(RESTAURANT_SECTOR)
  }

  pub fn has_website(&self) -> bool {
    self.website.as_deref().is_some_and(|w| !w.is_empty())
  }
}

fn default_state() -> String { DEFAULT_STATE.to_owned() }

fn default_true() -> bool { true }

/// Input to [`crate::store::RegistryStore::add_company`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompany {
  pub owner_id:            Uuid,
  pub name:                String,
  #[serde(default)]
  pub legal_name:          Option<String>,
  #[serde(default)]
  pub tax_id:              Option<String>,
  #[serde(default)]
  pub line_of_business:    Option<String>,
  #[serde(default)]
  pub sector:              Option<String>,
  #[serde(default)]
  pub description:         Option<String>,
  #[serde(default)]
  pub phone:               Option<String>,
  #[serde(default)]
  pub email:               Option<String>,
  #[serde(default)]
  pub website:             Option<String>,
  #[serde(default)]
  pub address:             Option<String>,
  #[serde(default)]
  pub city:                Option<String>,
  #[serde(default = "default_state")]
  pub state:               String,
  #[serde(default)]
  pub postal_code:         Option<String>,
  #[serde(default)]
  pub founded_on:          Option<NaiveDate>,
  #[serde(default)]
  pub employee_count:      Option<u32>,
  #[serde(default = "default_true")]
  pub listed_in_directory: bool,
  #[serde(default)]
  pub products_services:   Option<String>,
}

impl NewCompany {
  pub fn new(owner_id: Uuid, name: impl Into<String>) -> Self {
    Self {
      owner_id,
      name: name.into(),
      legal_name: None,
      tax_id: None,
      line_of_business: None,
      sector: None,
      description: None,
      phone: None,
      email: None,
      website: None,
      address: None,
      city: None,
      state: default_state(),
      postal_code: None,
      founded_on: None,
      employee_count: None,
      listed_in_directory: true,
      products_services: None,
    }
  }

  pub fn into_company(self, now: DateTime<Utc>) -> Company {
    Company {
      company_id:          Uuid::new_v4(),
      owner_id:            self.owner_id,
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
      founded_on:          self.founded_on,
      employee_count:      self.employee_count,
      listed_in_directory: self.listed_in_directory,
      products_services:   self.products_services,
      created_at:          now,
      updated_at:          now,
    }
  }
}
