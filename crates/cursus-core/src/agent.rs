//! Agents — the employees of the organisation — and their optional trainer
//! extension.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An employee record, identified by its matricule.
///
/// `trainer_domain` is set when the agent also has a trainer row; such an
/// agent may lead internal sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
  pub matricule:      String,
  pub name:           String,
  pub job_function:   Option<String>,
  pub hire_date:      Option<NaiveDate>,
  pub trainer_domain: Option<String>,
}

impl Agent {
  pub fn is_trainer(&self) -> bool { self.trainer_domain.is_some() }
}

/// Input to [`crate::store::TrainingStore::create_agent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAgent {
  pub matricule:      String,
  pub name:           String,
  pub job_function:   Option<String>,
  pub hire_date:      Option<NaiveDate>,
  /// When present, a trainer row with this domain is created alongside.
  pub trainer_domain: Option<String>,
}

/// Input to [`crate::store::TrainingStore::update_agent`].
///
/// The trainer extension follows `trainer_domain`: present creates or updates
/// it, absent removes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentUpdate {
  pub name:           String,
  pub job_function:   Option<String>,
  pub hire_date:      Option<NaiveDate>,
  pub trainer_domain: Option<String>,
}

impl NewAgent {
  pub fn into_agent(self) -> Agent {
    Agent {
      matricule:      self.matricule,
      name:           self.name,
      job_function:   self.job_function,
      hire_date:      self.hire_date,
      trainer_domain: self.trainer_domain,
    }
  }
}
