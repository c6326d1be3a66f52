//! The `TrainingStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `cursus-store-sqlite`).
//! The HTTP layer (`cursus-api`) depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  agent::{Agent, AgentUpdate, NewAgent},
  attendance::{
    AttendanceInput, AttendanceRecord, AttendanceSummary, RosterEntry,
    TrainingCalendar,
  },
  batch::BatchReport,
  cabinet::{Cabinet, CabinetDetail, CabinetSummary, NewCabinet},
  catalogue::{CatalogueDetail, NewCatalogue, Skill},
  error::StoreError,
  evaluation::{
    EvaluationInput, EvaluationMatrix, EvaluationRecord, EvaluationSummary,
    ParticipantEvaluation,
  },
  session::{Enrollee, NewSession, SessionDetail, SessionSummary, SessionUpdate},
};

/// Abstraction over a Cursus training store backend.
///
/// Lookups of a single record return `Ok(None)` when it does not exist.
/// Operations scoped to a record that must exist (updates, deletes, nested
/// listings) fail with [`crate::Error::NotFound`] instead.
///
/// Every write runs as one unit of work: it either applies completely or
/// leaves the store unchanged.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TrainingStore: Send + Sync {
  type Error: StoreError;

  // ── Agents ────────────────────────────────────────────────────────────

  /// All agents ordered by name, with their trainer domain if any.
  fn list_agents(
    &self,
  ) -> impl Future<Output = Result<Vec<Agent>, Self::Error>> + Send + '_;

  /// Agents that have a trainer row, ordered by name.
  fn list_trainers(
    &self,
  ) -> impl Future<Output = Result<Vec<Agent>, Self::Error>> + Send + '_;

  fn get_agent(
    &self,
    matricule: String,
  ) -> impl Future<Output = Result<Option<Agent>, Self::Error>> + Send + '_;

  /// Fails with a conflict if the matricule is taken.
  fn create_agent(
    &self,
    input: NewAgent,
  ) -> impl Future<Output = Result<Agent, Self::Error>> + Send + '_;

  /// Replace the agent's attributes and reconcile its trainer row with
  /// `trainer_domain`.
  fn update_agent(
    &self,
    matricule: String,
    input: AgentUpdate,
  ) -> impl Future<Output = Result<Agent, Self::Error>> + Send + '_;

  /// Delete the agent after removing its enrollments, detaching it from the
  /// sessions it trains and removing its trainer row.
  fn delete_agent(
    &self,
    matricule: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Catalogues ────────────────────────────────────────────────────────

  /// All catalogues ordered by name, each with its skills.
  fn list_catalogues(
    &self,
  ) -> impl Future<Output = Result<Vec<CatalogueDetail>, Self::Error>> + Send + '_;

  fn get_catalogue(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<CatalogueDetail>, Self::Error>>
  + Send
  + '_;

  /// Create the catalogue, resolving each skill description to an existing
  /// skill or a new one, and link them.
  fn create_catalogue(
    &self,
    input: NewCatalogue,
  ) -> impl Future<Output = Result<CatalogueDetail, Self::Error>> + Send + '_;

  /// Replace the catalogue's attributes and its whole skill set.
  fn update_catalogue(
    &self,
    id: i64,
    input: NewCatalogue,
  ) -> impl Future<Output = Result<CatalogueDetail, Self::Error>> + Send + '_;

  /// Refused while any session uses the catalogue.
  fn delete_catalogue(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The catalogue's skills ordered by description.
  fn catalogue_skills(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Vec<Skill>, Self::Error>> + Send + '_;

  // ── Skills ────────────────────────────────────────────────────────────

  fn list_skills(
    &self,
  ) -> impl Future<Output = Result<Vec<Skill>, Self::Error>> + Send + '_;

  fn get_skill(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Skill>, Self::Error>> + Send + '_;

  fn create_skill(
    &self,
    description: String,
  ) -> impl Future<Output = Result<Skill, Self::Error>> + Send + '_;

  fn update_skill(
    &self,
    id: i64,
    description: String,
  ) -> impl Future<Output = Result<Skill, Self::Error>> + Send + '_;

  /// Refused while the skill is linked to a catalogue or evaluated.
  fn delete_skill(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Skills whose description contains `term`.
  fn search_skills(
    &self,
    term: String,
  ) -> impl Future<Output = Result<Vec<Skill>, Self::Error>> + Send + '_;

  // ── Cabinets ──────────────────────────────────────────────────────────

  fn list_cabinets(
    &self,
  ) -> impl Future<Output = Result<Vec<CabinetSummary>, Self::Error>> + Send + '_;

  fn get_cabinet(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<CabinetDetail>, Self::Error>> + Send + '_;

  fn create_cabinet(
    &self,
    input: NewCabinet,
  ) -> impl Future<Output = Result<Cabinet, Self::Error>> + Send + '_;

  fn update_cabinet(
    &self,
    id: i64,
    input: NewCabinet,
  ) -> impl Future<Output = Result<Cabinet, Self::Error>> + Send + '_;

  /// Refused while any session uses the cabinet.
  fn delete_cabinet(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Sessions run by the cabinet, most recent first.
  fn cabinet_sessions(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Vec<SessionSummary>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// All sessions, most recent start date first.
  fn list_sessions(
    &self,
  ) -> impl Future<Output = Result<Vec<SessionSummary>, Self::Error>> + Send + '_;

  fn get_session(
    &self,
    code: i64,
  ) -> impl Future<Output = Result<Option<SessionDetail>, Self::Error>> + Send + '_;

  /// Create a session and enroll its initial participants. Participants that
  /// cannot be enrolled are skipped.
  fn create_session(
    &self,
    input: NewSession,
  ) -> impl Future<Output = Result<SessionDetail, Self::Error>> + Send + '_;

  fn update_session(
    &self,
    code: i64,
    input: SessionUpdate,
  ) -> impl Future<Output = Result<SessionDetail, Self::Error>> + Send + '_;

  /// Delete the session with its evaluations, attendance and enrollments.
  fn delete_session(
    &self,
    code: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Enrolled agents ordered by name.
  fn session_participants(
    &self,
    code: i64,
  ) -> impl Future<Output = Result<Vec<Enrollee>, Self::Error>> + Send + '_;

  fn add_participant(
    &self,
    code: i64,
    matricule: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn remove_participant(
    &self,
    code: i64,
    matricule: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Attendance ────────────────────────────────────────────────────────

  /// Upsert a batch of attendance rows, reporting the outcome of each.
  fn record_attendance(
    &self,
    rows: Vec<AttendanceInput>,
  ) -> impl Future<Output = Result<BatchReport<AttendanceInput>, Self::Error>>
  + Send
  + '_;

  /// Recorded attendance of a session, optionally for one date, most recent
  /// date first.
  fn session_attendance(
    &self,
    code: i64,
    date: Option<NaiveDate>,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + '_;

  fn training_calendar(
    &self,
    code: i64,
  ) -> impl Future<Output = Result<TrainingCalendar, Self::Error>> + Send + '_;

  /// Every participant with their status on `date`.
  fn attendance_roster(
    &self,
    code: i64,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<RosterEntry>, Self::Error>> + Send + '_;

  fn attendance_summary(
    &self,
    code: i64,
    matricule: String,
  ) -> impl Future<Output = Result<AttendanceSummary, Self::Error>> + Send + '_;

  // ── Evaluations ───────────────────────────────────────────────────────

  /// Upsert a batch of scores, reporting the outcome of each.
  fn save_evaluations(
    &self,
    rows: Vec<EvaluationInput>,
  ) -> impl Future<Output = Result<BatchReport<EvaluationInput>, Self::Error>>
  + Send
  + '_;

  fn session_evaluations(
    &self,
    code: i64,
  ) -> impl Future<Output = Result<Vec<EvaluationRecord>, Self::Error>> + Send + '_;

  /// Skills of the session's catalogue, ordered by description.
  fn session_skills(
    &self,
    code: i64,
  ) -> impl Future<Output = Result<Vec<Skill>, Self::Error>> + Send + '_;

  fn evaluation_matrix(
    &self,
    code: i64,
  ) -> impl Future<Output = Result<EvaluationMatrix, Self::Error>> + Send + '_;

  fn evaluation_summary(
    &self,
    code: i64,
    matricule: String,
  ) -> impl Future<Output = Result<EvaluationSummary, Self::Error>> + Send + '_;

  /// Every score of an agent across sessions, optionally restricted to one.
  fn participant_evaluations(
    &self,
    matricule: String,
    session: Option<i64>,
  ) -> impl Future<Output = Result<Vec<ParticipantEvaluation>, Self::Error>>
  + Send
  + '_;
}
