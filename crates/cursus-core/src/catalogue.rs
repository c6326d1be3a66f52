//! Training catalogues and the skills they teach.

use serde::{Deserialize, Serialize};

/// Whether completing the training grants a certification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Certifying,
  NonCertifying,
}

/// A competency taught by catalogues and evaluated per participant.
/// The description is unique across all skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
  pub skill_id:    i64,
  pub description: String,
}

/// A reusable training course definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
  pub catalogue_id:  i64,
  pub name:          String,
  pub description:   Option<String>,
  pub objective:     Option<String>,
  pub prerequisites: Option<String>,
  pub category:      Category,
}

/// A catalogue together with its linked skills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueDetail {
  #[serde(flatten)]
  pub catalogue: Catalogue,
  pub skills:    Vec<Skill>,
}

/// Input to catalogue create and update.
///
/// `skills` holds free-text skill descriptions; each one is resolved to an
/// existing skill or created. On update the list replaces the previous links
/// entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCatalogue {
  pub name:          String,
  pub description:   Option<String>,
  pub objective:     Option<String>,
  pub prerequisites: Option<String>,
  pub category:      Category,
  #[serde(default)]
  pub skills:        Vec<String>,
}
