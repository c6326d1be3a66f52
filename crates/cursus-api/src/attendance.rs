//! Handlers for `/attendance` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/attendance` | Body: `{"records":[...]}`, per-row outcomes |
//! | `GET`  | `/attendance/session/{code}` | Optional `?date=YYYY-MM-DD` |
//! | `GET`  | `/attendance/session/{code}/dates` | Weekday calendar |
//! | `GET`  | `/attendance/session/{code}/roster?date=` | Unrecorded ⇒ absent |
//! | `GET`  | `/attendance/session/{code}/participant/{matricule}` | Rate summary |

use std::sync::Arc;

use axum::extract::State;
use chrono::NaiveDate;
use cursus_core::{
  attendance::{
    AttendanceInput, AttendanceRecord, AttendanceSummary, RosterEntry,
    TrainingCalendar,
  },
  batch::BatchReport,
  store::TrainingStore,
};
use serde::Deserialize;
use tracing::info;

use crate::{
  envelope::Envelope,
  error::ApiError,
  extract::{JsonBody, PathParams, QueryParams},
  validate,
};

#[derive(Debug, Deserialize)]
pub struct RecordBody {
  pub records: Vec<AttendanceInput>,
}

#[derive(Debug, Deserialize)]
pub struct DateFilter {
  pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct RosterParams {
  pub date: NaiveDate,
}

/// `POST /attendance`
pub async fn record<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<RecordBody>,
) -> Result<Envelope<BatchReport<AttendanceInput>>, ApiError>
where
  S: TrainingStore,
{
  validate::non_empty("records", &body.records)?;
  body
    .records
    .iter()
    .try_for_each(|r| validate::required("matricule", &r.matricule))?;

  let report = store
    .record_attendance(body.records)
    .await
    .map_err(ApiError::store)?;

  let (applied, skipped) = (report.applied(), report.skipped());
  info!(applied, skipped, "attendance recorded");
  Ok(
    Envelope::data(report)
      .with_message(format!("{applied} recorded, {skipped} skipped"))
      .with_count(applied),
  )
}

/// `GET /attendance/session/{code}[?date=<date>]`
pub async fn by_session<S>(
  State(store): State<Arc<S>>,
  PathParams(code): PathParams<i64>,
  QueryParams(filter): QueryParams<DateFilter>,
) -> Result<Envelope<Vec<AttendanceRecord>>, ApiError>
where
  S: TrainingStore,
{
  let records = store
    .session_attendance(code, filter.date)
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::list(records))
}

/// `GET /attendance/session/{code}/dates`
pub async fn dates<S>(
  State(store): State<Arc<S>>,
  PathParams(code): PathParams<i64>,
) -> Result<Envelope<TrainingCalendar>, ApiError>
where
  S: TrainingStore,
{
  let calendar = store.training_calendar(code).await.map_err(ApiError::store)?;
  let days = calendar.days.len();
  Ok(Envelope::data(calendar).with_count(days))
}

/// `GET /attendance/session/{code}/roster?date=<date>`
pub async fn roster<S>(
  State(store): State<Arc<S>>,
  PathParams(code): PathParams<i64>,
  QueryParams(params): QueryParams<RosterParams>,
) -> Result<Envelope<Vec<RosterEntry>>, ApiError>
where
  S: TrainingStore,
{
  let roster = store
    .attendance_roster(code, params.date)
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::list(roster))
}

/// `GET /attendance/session/{code}/participant/{matricule}`
pub async fn summary<S>(
  State(store): State<Arc<S>>,
  PathParams((code, matricule)): PathParams<(i64, String)>,
) -> Result<Envelope<AttendanceSummary>, ApiError>
where
  S: TrainingStore,
{
  let summary = store
    .attendance_summary(code, matricule)
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::data(summary))
}
