//! Training sessions — scheduled instances of a catalogue — and their
//! enrolled participants.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  catalogue::Category,
  error::InvalidState,
};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Who delivers the session: an in-house trainer or an external cabinet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
  Internal,
  External,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
  #[default]
  InProgress,
  Finished,
}

// ─── Facilitator ─────────────────────────────────────────────────────────────

/// The single party responsible for a session. Internal sessions have a
/// trainer and never a cabinet; external sessions the reverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Facilitator {
  Trainer(String),
  Cabinet(i64),
}

impl Facilitator {
  /// Apply the type/trainer/cabinet exclusivity rule. The reference that does
  /// not match the type is discarded.
  pub fn resolve(
    session_type: SessionType,
    trainer_matricule: Option<String>,
    cabinet_id: Option<i64>,
  ) -> Result<Self> {
    match session_type {
      SessionType::Internal => trainer_matricule
        .filter(|m| !m.trim().is_empty())
        .map(Self::Trainer)
        .ok_or_else(|| InvalidState::TrainerRequired.into()),
      SessionType::External => cabinet_id
        .map(Self::Cabinet)
        .ok_or_else(|| InvalidState::CabinetRequired.into()),
    }
  }

  pub fn trainer(&self) -> Option<&str> {
    match self {
      Self::Trainer(m) => Some(m),
      Self::Cabinet(_) => None,
    }
  }

  pub fn cabinet(&self) -> Option<i64> {
    match self {
      Self::Trainer(_) => None,
      Self::Cabinet(id) => Some(*id),
    }
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub code:              i64,
  pub catalogue_id:      i64,
  pub start_date:        NaiveDate,
  pub end_date:          NaiveDate,
  pub session_type:      SessionType,
  pub status:            SessionStatus,
  /// Set only for internal sessions. May be cleared when the trainer's agent
  /// record is deleted.
  pub trainer_matricule: Option<String>,
  /// Set only for external sessions.
  pub cabinet_id:        Option<i64>,
}

/// Listing row with the names of the referenced records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
  #[serde(flatten)]
  pub session:            Session,
  pub catalogue_name:     String,
  pub catalogue_category: Category,
  pub trainer_name:       Option<String>,
  pub cabinet_name:       Option<String>,
  pub participant_count:  i64,
}

/// An enrolled agent as listed on a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollee {
  pub matricule:    String,
  pub name:         String,
  pub job_function: Option<String>,
  pub hire_date:    Option<NaiveDate>,
}

/// A session with its catalogue, facilitator details and participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetail {
  #[serde(flatten)]
  pub session:               Session,
  pub catalogue_name:        String,
  pub catalogue_description: Option<String>,
  pub catalogue_objective:   Option<String>,
  pub catalogue_category:    Category,
  pub trainer_name:          Option<String>,
  pub cabinet_name:          Option<String>,
  pub cabinet_phone:         Option<String>,
  pub cabinet_location:      Option<String>,
  pub participants:          Vec<Enrollee>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::TrainingStore::create_session`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
  pub catalogue_id:      i64,
  pub start_date:        NaiveDate,
  pub end_date:          NaiveDate,
  pub session_type:      SessionType,
  #[serde(default)]
  pub status:            SessionStatus,
  pub trainer_matricule: Option<String>,
  pub cabinet_id:        Option<i64>,
  /// Matricules to enroll right away. Unknown or duplicate entries are
  /// skipped.
  #[serde(default)]
  pub participants:      Vec<String>,
}

impl NewSession {
  pub fn facilitator(&self) -> Result<Facilitator> {
    Facilitator::resolve(
      self.session_type,
      self.trainer_matricule.clone(),
      self.cabinet_id,
    )
  }
}

/// Input to [`crate::store::TrainingStore::update_session`]. The catalogue of
/// a session cannot change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUpdate {
  pub start_date:        NaiveDate,
  pub end_date:          NaiveDate,
  pub session_type:      SessionType,
  #[serde(default)]
  pub status:            SessionStatus,
  pub trainer_matricule: Option<String>,
  pub cabinet_id:        Option<i64>,
}

impl SessionUpdate {
  pub fn facilitator(&self) -> Result<Facilitator> {
    Facilitator::resolve(
      self.session_type,
      self.trainer_matricule.clone(),
      self.cabinet_id,
    )
  }
}
