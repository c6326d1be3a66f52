//! Error types for `cursus-core`.
//!
//! Every domain failure is a distinct variant so callers branch on the variant
//! rather than on message text.

use std::fmt;

use thiserror::Error;

/// The kind of record a [`Error::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
  Agent,
  Trainer,
  Catalogue,
  Skill,
  Cabinet,
  Session,
  Participant,
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Agent => "agent",
      Self::Trainer => "trainer",
      Self::Catalogue => "catalogue",
      Self::Skill => "skill",
      Self::Cabinet => "cabinet",
      Self::Session => "session",
      Self::Participant => "participant",
    })
  }
}

/// A uniqueness rule was violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Conflict {
  #[error("an agent with matricule {0:?} already exists")]
  AgentExists(String),

  #[error("a cabinet named {0:?} already exists")]
  CabinetNameTaken(String),

  #[error("a skill described as {0:?} already exists")]
  SkillExists(String),

  #[error("agent {matricule} is already enrolled in session {session}")]
  AlreadyEnrolled { matricule: String, session: i64 },

  #[error("skill {0:?} is listed more than once for the catalogue")]
  DuplicateSkill(String),
}

/// A domain rule forbids the requested change in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidState {
  #[error("a trainer is required for internal training")]
  TrainerRequired,

  #[error("a cabinet is required for external training")]
  CabinetRequired,

  #[error("cabinet {0} is used by training sessions")]
  CabinetInUse(i64),

  #[error("catalogue {0} is used by training sessions")]
  CatalogueInUse(i64),

  #[error("skill {0} is used by training catalogues")]
  SkillInCatalogue(i64),

  #[error("skill {0} is used by evaluations")]
  SkillEvaluated(i64),

  #[error("agent {0} is still the trainer of training sessions")]
  TrainerAssigned(String),
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} not found: {1}")]
  NotFound(Entity, String),

  #[error(transparent)]
  Conflict(#[from] Conflict),

  #[error(transparent)]
  InvalidState(#[from] InvalidState),

  #[error("validation failed: {0}")]
  Validation(String),
}

impl Error {
  pub fn not_found(entity: Entity, key: impl ToString) -> Self {
    Self::NotFound(entity, key.to_string())
  }

  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implemented by storage backend errors so higher layers can recover the
/// domain-level cause of a failure without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The domain error behind this failure, if it is one. `None` means an
  /// infrastructure failure (driver error, transaction misuse, ...).
  fn domain(&self) -> Option<&Error>;
}

impl StoreError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn not_found_message_names_entity_and_key() {
    let err = Error::not_found(Entity::Agent, "A-001");
    assert_eq!(err.to_string(), "agent not found: A-001");
  }

  #[test]
  fn domain_variants_are_transparent() {
    let err = Error::from(InvalidState::TrainerRequired);
    assert_eq!(err.to_string(), "a trainer is required for internal training");
    assert!(matches!(
      err.domain(),
      Some(Error::InvalidState(InvalidState::TrainerRequired))
    ));
  }
}
