//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use cursus_core::{
  Error as CoreError,
  agent::{AgentUpdate, NewAgent},
  attendance::{AttendanceInput, AttendanceStatus},
  batch::RowOutcome,
  cabinet::NewCabinet,
  catalogue::{Category, NewCatalogue},
  error::{Conflict, Entity, InvalidState, StoreError as _},
  evaluation::EvaluationInput,
  session::{NewSession, SessionStatus, SessionType, SessionUpdate},
  store::TrainingStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, d).unwrap() }

fn agent(matricule: &str, name: &str, domain: Option<&str>) -> NewAgent {
  NewAgent {
    matricule:      matricule.into(),
    name:           name.into(),
    job_function:   Some("Technician".into()),
    hire_date:      NaiveDate::from_ymd_opt(2020, 1, 15),
    trainer_domain: domain.map(Into::into),
  }
}

fn catalogue(name: &str, skills: &[&str]) -> NewCatalogue {
  NewCatalogue {
    name:          name.into(),
    description:   None,
    objective:     Some("Operate safely".into()),
    prerequisites: None,
    category:      Category::Certifying,
    skills:        skills.iter().map(|s| s.to_string()).collect(),
  }
}

fn internal(catalogue_id: i64, trainer: &str, participants: &[&str]) -> NewSession {
  NewSession {
    catalogue_id,
    start_date: day(4),
    end_date: day(8),
    session_type: SessionType::Internal,
    status: SessionStatus::InProgress,
    trainer_matricule: Some(trainer.into()),
    cabinet_id: None,
    participants: participants.iter().map(|p| p.to_string()).collect(),
  }
}

fn domain(err: &Error) -> &CoreError {
  err.domain().expect("domain error")
}

/// One trainer, two enrolled participants (Alice, Bob) and one agent who is
/// not enrolled, in an internal session over a two-skill catalogue.
struct Fixture {
  store:        SqliteStore,
  session:      i64,
  catalogue_id: i64,
  safety:       i64,
  welding:      i64,
}

async fn fixture() -> Fixture {
  let s = store().await;
  s.create_agent(agent("T1", "Trainer", Some("Welding"))).await.unwrap();
  s.create_agent(agent("P1", "Alice", None)).await.unwrap();
  s.create_agent(agent("P2", "Bob", None)).await.unwrap();
  s.create_agent(agent("P3", "Carol", None)).await.unwrap();

  let cat = s
    .create_catalogue(catalogue("Welding 101", &["Safety", "Welding"]))
    .await
    .unwrap();
  let session = s
    .create_session(internal(cat.catalogue.catalogue_id, "T1", &["P1", "P2"]))
    .await
    .unwrap();

  Fixture {
    store:        s,
    session:      session.session.code,
    catalogue_id: cat.catalogue.catalogue_id,
    safety:       cat.skills[0].skill_id,
    welding:      cat.skills[1].skill_id,
  }
}

fn score(session: i64, matricule: &str, skill: i64, score: f64) -> EvaluationInput {
  EvaluationInput {
    session_code: session,
    matricule: matricule.into(),
    skill_id: skill,
    score,
  }
}

fn presence(
  session: i64,
  matricule: &str,
  d: u32,
  status: AttendanceStatus,
) -> AttendanceInput {
  AttendanceInput {
    session_code: session,
    matricule: matricule.into(),
    date: day(d),
    status,
  }
}

// ─── Agents ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_agent() {
  let s = store().await;
  let created = s.create_agent(agent("A1", "Zoe", Some("Safety"))).await.unwrap();
  assert!(created.is_trainer());

  let fetched = s.get_agent("A1".into()).await.unwrap().unwrap();
  assert_eq!(fetched, created);
  assert!(s.get_agent("missing".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn agents_are_listed_by_name_and_trainers_filtered() {
  let s = store().await;
  s.create_agent(agent("A1", "Zoe", None)).await.unwrap();
  s.create_agent(agent("A2", "Adam", Some("Electricity"))).await.unwrap();

  let names: Vec<_> = s
    .list_agents()
    .await
    .unwrap()
    .into_iter()
    .map(|a| a.name)
    .collect();
  assert_eq!(names, vec!["Adam", "Zoe"]);

  let trainers = s.list_trainers().await.unwrap();
  assert_eq!(trainers.len(), 1);
  assert_eq!(trainers[0].trainer_domain.as_deref(), Some("Electricity"));
}

#[tokio::test]
async fn duplicate_matricule_conflicts() {
  let s = store().await;
  s.create_agent(agent("A1", "Zoe", None)).await.unwrap();
  let err = s.create_agent(agent("A1", "Other", None)).await.unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::Conflict(Conflict::AgentExists(m)) if m == "A1"
  ));
}

#[tokio::test]
async fn update_agent_adds_and_removes_trainer_row() {
  let s = store().await;
  s.create_agent(agent("A1", "Zoe", None)).await.unwrap();

  let update = |domain: Option<&str>| AgentUpdate {
    name:           "Zoe B".into(),
    job_function:   None,
    hire_date:      None,
    trainer_domain: domain.map(Into::into),
  };

  let a = s.update_agent("A1".into(), update(Some("Safety"))).await.unwrap();
  assert_eq!(a.name, "Zoe B");
  assert_eq!(a.trainer_domain.as_deref(), Some("Safety"));

  let a = s.update_agent("A1".into(), update(Some("Fire"))).await.unwrap();
  assert_eq!(a.trainer_domain.as_deref(), Some("Fire"));

  let a = s.update_agent("A1".into(), update(None)).await.unwrap();
  assert!(!a.is_trainer());
  assert_eq!(s.count_rows("trainers").await.unwrap(), 0);
}

#[tokio::test]
async fn trainer_row_kept_while_assigned() {
  let f = fixture().await;
  let err = f
    .store
    .update_agent("T1".into(), AgentUpdate {
      name:           "Trainer".into(),
      job_function:   None,
      hire_date:      None,
      trainer_domain: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::InvalidState(InvalidState::TrainerAssigned(_))
  ));
  let t = f.store.get_agent("T1".into()).await.unwrap().unwrap();
  assert_eq!(t.name, "Trainer");
  assert!(t.is_trainer());
}

#[tokio::test]
async fn update_missing_agent_is_not_found() {
  let s = store().await;
  let err = s
    .update_agent("nobody".into(), AgentUpdate {
      name:           "x".into(),
      job_function:   None,
      hire_date:      None,
      trainer_domain: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotFound(Entity::Agent, _)));
}

#[tokio::test]
async fn delete_agent_cascades() {
  let f = fixture().await;
  let s = &f.store;
  s.add_participant(f.session, "T1".into()).await.unwrap();
  s.save_evaluations(vec![score(f.session, "T1", f.safety, 12.0)])
    .await
    .unwrap();
  s.record_attendance(vec![presence(f.session, "T1", 4, AttendanceStatus::Present)])
    .await
    .unwrap();

  s.delete_agent("T1".into()).await.unwrap();

  assert!(s.get_agent("T1".into()).await.unwrap().is_none());
  assert_eq!(s.count_rows("trainers").await.unwrap(), 0);
  assert_eq!(s.count_rows("evaluations").await.unwrap(), 0);
  assert_eq!(s.count_rows("attendance").await.unwrap(), 0);

  let session = s.get_session(f.session).await.unwrap().unwrap();
  assert_eq!(session.session.trainer_matricule, None);
  let enrolled: Vec<_> =
    session.participants.iter().map(|p| p.matricule.as_str()).collect();
  assert_eq!(enrolled, vec!["P1", "P2"]);
}

#[tokio::test]
async fn delete_unknown_agent_changes_nothing() {
  let f = fixture().await;
  let before = f.store.count_rows("agents").await.unwrap();

  let err = f.store.delete_agent("ghost".into()).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotFound(Entity::Agent, k) if k == "ghost"));

  assert_eq!(f.store.count_rows("agents").await.unwrap(), before);
  assert_eq!(f.store.count_rows("participants").await.unwrap(), 2);
}

// ─── Catalogues & skills ─────────────────────────────────────────────────────

#[tokio::test]
async fn skill_reconciliation_is_idempotent() {
  let s = store().await;
  let a = s.create_catalogue(catalogue("A", &["Safety"])).await.unwrap();
  let b = s.create_catalogue(catalogue("B", &["Safety"])).await.unwrap();

  assert_eq!(a.skills[0].skill_id, b.skills[0].skill_id);
  assert_eq!(s.list_skills().await.unwrap().len(), 1);
}

#[tokio::test]
async fn catalogue_update_replaces_skill_set() {
  let s = store().await;
  let cat = s.create_catalogue(catalogue("C", &["A", "B"])).await.unwrap();
  let id = cat.catalogue.catalogue_id;
  let b_id = cat.skills.iter().find(|k| k.description == "B").unwrap().skill_id;

  let updated = s
    .update_catalogue(id, catalogue("C2", &["B", "C"]))
    .await
    .unwrap();
  assert_eq!(updated.catalogue.name, "C2");

  let skills: Vec<_> =
    updated.skills.iter().map(|k| k.description.as_str()).collect();
  assert_eq!(skills, vec!["B", "C"]);
  assert_eq!(
    updated.skills.iter().find(|k| k.description == "B").unwrap().skill_id,
    b_id
  );

  // "A" survives as a skill, only the link is gone.
  assert_eq!(s.list_skills().await.unwrap().len(), 3);
  assert_eq!(s.catalogue_skills(id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_skill_in_input_rolls_back() {
  let s = store().await;
  let err = s
    .create_catalogue(catalogue("Dup", &["Safety", "Safety"]))
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::Conflict(Conflict::DuplicateSkill(d)) if d == "Safety"
  ));
  assert!(s.list_catalogues().await.unwrap().is_empty());
  assert!(s.list_skills().await.unwrap().is_empty());
}

#[tokio::test]
async fn catalogue_in_use_cannot_be_deleted() {
  let f = fixture().await;
  let err = f.store.delete_catalogue(f.catalogue_id).await.unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::InvalidState(InvalidState::CatalogueInUse(_))
  ));

  let s = store().await;
  let cat = s.create_catalogue(catalogue("Free", &["X"])).await.unwrap();
  s.delete_catalogue(cat.catalogue.catalogue_id).await.unwrap();
  assert!(s.get_catalogue(cat.catalogue.catalogue_id).await.unwrap().is_none());
  assert_eq!(s.count_rows("catalogue_skills").await.unwrap(), 0);
}

#[tokio::test]
async fn skill_crud_and_guards() {
  let f = fixture().await;
  let s = &f.store;

  let err = s.create_skill("Safety".into()).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::Conflict(Conflict::SkillExists(_))));

  let err = s.delete_skill(f.safety).await.unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::InvalidState(InvalidState::SkillInCatalogue(_))
  ));

  let free = s.create_skill("Soldering".into()).await.unwrap();
  let renamed = s.update_skill(free.skill_id, "Brazing".into()).await.unwrap();
  assert_eq!(renamed.description, "Brazing");

  let err = s.update_skill(free.skill_id, "Welding".into()).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::Conflict(Conflict::SkillExists(_))));

  s.delete_skill(free.skill_id).await.unwrap();
  assert!(s.get_skill(free.skill_id).await.unwrap().is_none());
}

#[tokio::test]
async fn search_matches_substrings() {
  let s = store().await;
  s.create_skill("Arc welding".into()).await.unwrap();
  s.create_skill("Gas welding".into()).await.unwrap();
  s.create_skill("First aid".into()).await.unwrap();

  let hits = s.search_skills("weld".into()).await.unwrap();
  assert_eq!(hits.len(), 2);
  assert!(s.search_skills("100%".into()).await.unwrap().is_empty());
}

// ─── Cabinets ────────────────────────────────────────────────────────────────

fn cabinet(name: &str) -> NewCabinet {
  NewCabinet {
    name:     name.into(),
    phone:    Some("+33 1 23 45 67 89".into()),
    location: Some("Lyon".into()),
  }
}

#[tokio::test]
async fn cabinet_names_are_unique() {
  let s = store().await;
  let a = s.create_cabinet(cabinet("Acme")).await.unwrap();
  s.create_cabinet(cabinet("Beta")).await.unwrap();

  let err = s.create_cabinet(cabinet("Acme")).await.unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::Conflict(Conflict::CabinetNameTaken(_))
  ));

  let err = s.update_cabinet(a.cabinet_id, cabinet("Beta")).await.unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::Conflict(Conflict::CabinetNameTaken(_))
  ));
}

#[tokio::test]
async fn cabinet_used_by_session_cannot_be_deleted() {
  let s = store().await;
  let cab = s.create_cabinet(cabinet("Acme")).await.unwrap();
  let cat = s.create_catalogue(catalogue("C", &["X"])).await.unwrap();
  s.create_session(NewSession {
    session_type: SessionType::External,
    trainer_matricule: None,
    cabinet_id: Some(cab.cabinet_id),
    ..internal(cat.catalogue.catalogue_id, "", &[])
  })
  .await
  .unwrap();

  let listed = s.list_cabinets().await.unwrap();
  assert_eq!(listed[0].session_count, 1);
  assert_eq!(s.cabinet_sessions(cab.cabinet_id).await.unwrap().len(), 1);

  let detail = s.get_cabinet(cab.cabinet_id).await.unwrap().unwrap();
  assert_eq!(detail.sessions[0].catalogue_name, "C");

  let err = s.delete_cabinet(cab.cabinet_id).await.unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::InvalidState(InvalidState::CabinetInUse(_))
  ));
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn internal_session_requires_trainer() {
  let f = fixture().await;
  let err = f
    .store
    .create_session(NewSession {
      trainer_matricule: None,
      ..internal(f.catalogue_id, "", &[])
    })
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::InvalidState(InvalidState::TrainerRequired)
  ));
}

#[tokio::test]
async fn internal_session_drops_cabinet() {
  let f = fixture().await;
  let cab = f.store.create_cabinet(cabinet("Acme")).await.unwrap();
  let created = f
    .store
    .create_session(NewSession {
      cabinet_id: Some(cab.cabinet_id),
      ..internal(f.catalogue_id, "T1", &[])
    })
    .await
    .unwrap();
  assert_eq!(created.session.trainer_matricule.as_deref(), Some("T1"));
  assert_eq!(created.session.cabinet_id, None);
  assert_eq!(created.trainer_name.as_deref(), Some("Trainer"));
}

#[tokio::test]
async fn external_session_requires_cabinet_and_drops_trainer() {
  let f = fixture().await;
  let external = |cabinet_id| NewSession {
    session_type: SessionType::External,
    cabinet_id,
    ..internal(f.catalogue_id, "T1", &[])
  };

  let err = f.store.create_session(external(None)).await.unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::InvalidState(InvalidState::CabinetRequired)
  ));

  let cab = f.store.create_cabinet(cabinet("Acme")).await.unwrap();
  let created = f
    .store
    .create_session(external(Some(cab.cabinet_id)))
    .await
    .unwrap();
  assert_eq!(created.session.trainer_matricule, None);
  assert_eq!(created.session.cabinet_id, Some(cab.cabinet_id));
  assert_eq!(created.cabinet_location.as_deref(), Some("Lyon"));
}

#[tokio::test]
async fn session_references_must_exist() {
  let f = fixture().await;

  let err = f
    .store
    .create_session(internal(9999, "T1", &[]))
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotFound(Entity::Catalogue, _)));

  // P1 is an agent but not a trainer.
  let err = f
    .store
    .create_session(internal(f.catalogue_id, "P1", &[]))
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotFound(Entity::Trainer, _)));
}

#[tokio::test]
async fn unknown_initial_participants_are_skipped() {
  let f = fixture().await;
  let created = f
    .store
    .create_session(internal(f.catalogue_id, "T1", &["P1", "ghost", "P1"]))
    .await
    .unwrap();
  assert_eq!(created.participants.len(), 1);
  assert_eq!(created.participants[0].matricule, "P1");
}

#[tokio::test]
async fn update_session_reapplies_exclusivity() {
  let f = fixture().await;
  let cab = f.store.create_cabinet(cabinet("Acme")).await.unwrap();

  let updated = f
    .store
    .update_session(f.session, SessionUpdate {
      start_date:        day(11),
      end_date:          day(15),
      session_type:      SessionType::External,
      status:            SessionStatus::Finished,
      trainer_matricule: Some("T1".into()),
      cabinet_id:        Some(cab.cabinet_id),
    })
    .await
    .unwrap();
  assert_eq!(updated.session.trainer_matricule, None);
  assert_eq!(updated.session.cabinet_id, Some(cab.cabinet_id));
  assert_eq!(updated.session.status, SessionStatus::Finished);
  assert_eq!(updated.participants.len(), 2);
}

#[tokio::test]
async fn participants_enroll_once() {
  let f = fixture().await;
  let s = &f.store;

  s.add_participant(f.session, "P3".into()).await.unwrap();
  let err = s.add_participant(f.session, "P3".into()).await.unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::Conflict(Conflict::AlreadyEnrolled { .. })
  ));

  let err = s.add_participant(f.session, "ghost".into()).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotFound(Entity::Agent, _)));

  let names: Vec<_> = s
    .session_participants(f.session)
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.name)
    .collect();
  assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
}

#[tokio::test]
async fn removing_participant_drops_their_records() {
  let f = fixture().await;
  let s = &f.store;
  s.record_attendance(vec![presence(f.session, "P1", 4, AttendanceStatus::Present)])
    .await
    .unwrap();
  s.save_evaluations(vec![score(f.session, "P1", f.safety, 11.0)])
    .await
    .unwrap();

  s.remove_participant(f.session, "P1".into()).await.unwrap();
  assert_eq!(s.count_rows("attendance").await.unwrap(), 0);
  assert_eq!(s.count_rows("evaluations").await.unwrap(), 0);

  let err = s.remove_participant(f.session, "P1".into()).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotFound(Entity::Participant, _)));
}

#[tokio::test]
async fn delete_session_cascades() {
  let f = fixture().await;
  let s = &f.store;
  s.record_attendance(vec![presence(f.session, "P1", 4, AttendanceStatus::Present)])
    .await
    .unwrap();
  s.save_evaluations(vec![score(f.session, "P1", f.safety, 11.0)])
    .await
    .unwrap();

  s.delete_session(f.session).await.unwrap();

  for table in ["sessions", "participants", "attendance", "evaluations"] {
    assert_eq!(s.count_rows(table).await.unwrap(), 0, "{table}");
  }

  let err = s.delete_session(f.session).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotFound(Entity::Session, _)));
}

#[tokio::test]
async fn failed_session_delete_leaves_tables_unchanged() {
  let f = fixture().await;
  let s = &f.store;
  s.record_attendance(vec![presence(f.session, "P1", 4, AttendanceStatus::Present)])
    .await
    .unwrap();
  s.save_evaluations(vec![score(f.session, "P2", f.welding, 9.0)])
    .await
    .unwrap();

  s.execute_raw(
    "CREATE TRIGGER block_session_delete BEFORE DELETE ON sessions
     BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
  )
  .await
  .unwrap();

  let err = s.delete_session(f.session).await.unwrap_err();
  assert!(matches!(
    err,
    Error::DeletionFailed { entity: Entity::Session, .. }
  ));
  assert!(err.domain().is_none());

  assert_eq!(s.count_rows("sessions").await.unwrap(), 1);
  assert_eq!(s.count_rows("participants").await.unwrap(), 2);
  assert_eq!(s.count_rows("attendance").await.unwrap(), 1);
  assert_eq!(s.count_rows("evaluations").await.unwrap(), 1);
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn attendance_summary_rate() {
  let f = fixture().await;
  let rows = [
    (4, AttendanceStatus::Present),
    (5, AttendanceStatus::Present),
    (6, AttendanceStatus::Absent),
    (7, AttendanceStatus::Present),
    (8, AttendanceStatus::Absent),
  ]
  .into_iter()
  .map(|(d, st)| presence(f.session, "P1", d, st))
  .collect();
  f.store.record_attendance(rows).await.unwrap();

  let summary = f
    .store
    .attendance_summary(f.session, "P1".into())
    .await
    .unwrap();
  assert_eq!(summary.days.len(), 5);
  assert_eq!(summary.summary.present_days, 3);
  assert_eq!(summary.summary.absent_days, 2);
  assert_eq!(summary.summary.attendance_rate, 60.0);
}

#[tokio::test]
async fn attendance_upserts_and_reports_skips() {
  let f = fixture().await;
  let s = &f.store;

  s.record_attendance(vec![presence(f.session, "P1", 4, AttendanceStatus::Absent)])
    .await
    .unwrap();
  let report = s
    .record_attendance(vec![
      presence(f.session, "P1", 4, AttendanceStatus::Present),
      presence(f.session, "P3", 4, AttendanceStatus::Present),
    ])
    .await
    .unwrap();
  let outcomes: Vec<_> = report.rows.iter().map(|r| r.outcome).collect();
  assert_eq!(outcomes, vec![RowOutcome::Applied, RowOutcome::SkippedInvalid]);

  let recorded = s.session_attendance(f.session, Some(day(4))).await.unwrap();
  assert_eq!(recorded.len(), 1);
  assert_eq!(recorded[0].status, AttendanceStatus::Present);
  assert_eq!(recorded[0].participant_name, "Alice");
}

#[tokio::test]
async fn roster_defaults_to_absent() {
  let f = fixture().await;
  f.store
    .record_attendance(vec![presence(f.session, "P2", 5, AttendanceStatus::Present)])
    .await
    .unwrap();

  let roster = f.store.attendance_roster(f.session, day(5)).await.unwrap();
  let statuses: Vec<_> =
    roster.iter().map(|r| (r.name.as_str(), r.status)).collect();
  assert_eq!(statuses, vec![
    ("Alice", AttendanceStatus::Absent),
    ("Bob", AttendanceStatus::Present),
  ]);
}

#[tokio::test]
async fn calendar_lists_weekdays_with_flags() {
  let f = fixture().await;
  f.store
    .record_attendance(vec![presence(f.session, "P1", 6, AttendanceStatus::Present)])
    .await
    .unwrap();

  let cal = f.store.training_calendar(f.session).await.unwrap();
  assert_eq!(cal.days.len(), 5);
  let flagged: Vec<_> = cal
    .days
    .iter()
    .filter(|d| d.has_attendance)
    .map(|d| d.date)
    .collect();
  assert_eq!(flagged, vec![day(6)]);

  let err = f.store.training_calendar(9999).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotFound(Entity::Session, _)));
}

#[tokio::test]
async fn empty_batches_are_rejected() {
  let f = fixture().await;
  let err = f.store.record_attendance(vec![]).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::Validation(_)));
  let err = f.store.save_evaluations(vec![]).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::Validation(_)));
}

#[tokio::test]
async fn summary_requires_enrollment() {
  let f = fixture().await;
  let err = f
    .store
    .attendance_summary(f.session, "P3".into())
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::NotFound(Entity::Participant, _)));
}

// ─── Evaluations ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_skips_invalid_evaluations() {
  let f = fixture().await;
  let stray = f.store.create_skill("Painting".into()).await.unwrap();

  let report = f
    .store
    .save_evaluations(vec![
      score(f.session, "P1", f.safety, 12.0),
      score(f.session, "P3", f.safety, 14.0),
      score(f.session, "P1", stray.skill_id, 18.0),
    ])
    .await
    .unwrap();
  assert_eq!(report.applied(), 1);
  assert_eq!(report.skipped(), 2);
  assert_eq!(report.rows[1].outcome, RowOutcome::SkippedInvalid);

  let stored = f.store.session_evaluations(f.session).await.unwrap();
  assert_eq!(stored.len(), 1);
  assert_eq!(stored[0].matricule, "P1");
  assert_eq!(stored[0].skill, "Safety");
}

#[tokio::test]
async fn out_of_range_score_rejects_batch() {
  let f = fixture().await;
  let err = f
    .store
    .save_evaluations(vec![
      score(f.session, "P1", f.safety, 12.0),
      score(f.session, "P2", f.safety, 21.0),
    ])
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::Validation(_)));
  assert_eq!(f.store.count_rows("evaluations").await.unwrap(), 0);
}

#[tokio::test]
async fn evaluation_matrix_fills_missing_scores_with_null() {
  let f = fixture().await;
  f.store
    .save_evaluations(vec![score(f.session, "P1", f.safety, 15.0)])
    .await
    .unwrap();

  let m = f.store.evaluation_matrix(f.session).await.unwrap();
  assert_eq!(m.skills.len(), 2);
  assert_eq!(m.participants.len(), 2);

  let p1 = &m.participants[0];
  assert_eq!(p1.matricule, "P1");
  assert_eq!(p1.scores[0].score, Some(15.0));
  assert_eq!(p1.scores[1].score, None);
  assert_eq!(p1.average, Some(15.0));
  assert_eq!(p1.admitted, Some(true));

  let p2 = &m.participants[1];
  assert_eq!(p2.scores.iter().filter(|c| c.score.is_none()).count(), 2);
  assert_eq!(p2.average, None);
  assert_eq!(p2.admitted, None);
}

#[tokio::test]
async fn rescoring_overwrites_and_summarises() {
  let f = fixture().await;
  let s = &f.store;
  s.save_evaluations(vec![
    score(f.session, "P2", f.safety, 4.0),
    score(f.session, "P2", f.welding, 9.0),
  ])
  .await
  .unwrap();
  s.save_evaluations(vec![score(f.session, "P2", f.safety, 8.0)])
    .await
    .unwrap();

  let summary = s.evaluation_summary(f.session, "P2".into()).await.unwrap();
  assert_eq!(summary.participant.name, "Bob");
  assert_eq!(summary.participant.catalogue_name, "Welding 101");
  assert_eq!(summary.summary.total_skills, 2);
  assert_eq!(summary.summary.average_score, Some(8.5));
  assert_eq!(summary.summary.admitted, Some(false));
  assert_eq!(summary.summary.admission_threshold, 10.0);

  let all = s.participant_evaluations("P2".into(), None).await.unwrap();
  assert_eq!(all.len(), 2);
  let other = s
    .participant_evaluations("P2".into(), Some(f.session + 1))
    .await
    .unwrap();
  assert!(other.is_empty());
}

#[tokio::test]
async fn skill_with_evaluations_cannot_be_deleted() {
  let f = fixture().await;
  let s = &f.store;
  s.save_evaluations(vec![score(f.session, "P1", f.welding, 10.0)])
    .await
    .unwrap();
  // Unlink the skill so only the evaluation keeps it alive.
  s.update_catalogue(f.catalogue_id, catalogue("Welding 101", &["Safety"]))
    .await
    .unwrap();

  let err = s.delete_skill(f.welding).await.unwrap_err();
  assert!(matches!(
    domain(&err),
    CoreError::InvalidState(InvalidState::SkillEvaluated(_))
  ));
}
