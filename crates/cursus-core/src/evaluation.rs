//! Skill evaluations: per-participant scores and the derived matrix and
//! summaries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalogue::{Category, Skill};

/// Scores are on a 0–20 scale.
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 20.0;

/// Average score at or above which a participant is admitted.
pub const ADMISSION_THRESHOLD: f64 = 10.0;

/// One row of the batch accepted by
/// [`crate::store::TrainingStore::save_evaluations`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationInput {
  pub session_code: i64,
  pub matricule:    String,
  pub skill_id:     i64,
  pub score:        f64,
}

/// A stored evaluation as listed for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
  pub session_code:     i64,
  pub matricule:        String,
  pub skill_id:         i64,
  pub score:            f64,
  pub participant_name: String,
  pub skill:            String,
}

/// A stored evaluation as listed for a participant, with its training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantEvaluation {
  pub session_code:   i64,
  pub skill_id:       i64,
  pub skill:          String,
  pub score:          f64,
  pub start_date:     NaiveDate,
  pub end_date:       NaiveDate,
  pub catalogue_name: String,
}

/// A flat `(matricule, skill, score)` row as read for matrix building.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
  pub matricule: String,
  pub skill_id:  i64,
  pub score:     f64,
}

// ─── Matrix ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixCell {
  pub skill_id: i64,
  pub skill:    String,
  /// `None` when no score has been recorded for this skill.
  pub score:    Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRow {
  pub matricule: String,
  pub name:      String,
  pub scores:    Vec<MatrixCell>,
  pub average:   Option<f64>,
  pub admitted:  Option<bool>,
}

/// Every enrolled participant against every skill of the session's catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMatrix {
  pub session_code: i64,
  pub skills:       Vec<Skill>,
  pub participants: Vec<MatrixRow>,
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Who was evaluated, and in which training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
  pub matricule:          String,
  pub name:               String,
  pub job_function:       Option<String>,
  pub catalogue_name:     String,
  pub catalogue_category: Category,
  pub start_date:         NaiveDate,
  pub end_date:           NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillScore {
  pub skill: String,
  pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationStats {
  pub total_skills:        usize,
  pub average_score:       Option<f64>,
  pub admitted:            Option<bool>,
  pub admission_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
  pub participant: ParticipantInfo,
  pub evaluations: Vec<SkillScore>,
  pub summary:     EvaluationStats,
}
