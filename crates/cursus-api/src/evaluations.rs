//! Handlers for `/evaluations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/evaluations` | Body: `{"evaluations":[...]}`, scores 0–20 |
//! | `GET`  | `/evaluations/session/{code}` | |
//! | `GET`  | `/evaluations/session/{code}/skills` | Skills of the catalogue |
//! | `GET`  | `/evaluations/session/{code}/matrix` | Participants × skills |
//! | `GET`  | `/evaluations/session/{code}/participant/{matricule}` | Summary |
//! | `GET`  | `/evaluations/participant/{matricule}` | Optional `?session=` |

use std::sync::Arc;

use axum::extract::State;
use cursus_core::{
  batch::BatchReport,
  catalogue::Skill,
  evaluation::{
    EvaluationInput, EvaluationMatrix, EvaluationRecord, EvaluationSummary,
    ParticipantEvaluation,
  },
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
pub struct SaveBody {
  pub evaluations: Vec<EvaluationInput>,
}

#[derive(Debug, Deserialize)]
pub struct SessionFilter {
  pub session: Option<i64>,
}

/// `POST /evaluations`
pub async fn save<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<SaveBody>,
) -> Result<Envelope<BatchReport<EvaluationInput>>, ApiError>
where
  S: TrainingStore,
{
  validate::non_empty("evaluations", &body.evaluations)?;
  for row in &body.evaluations {
    validate::required("matricule", &row.matricule)?;
    validate::score(row.score)?;
  }

  let report = store
    .save_evaluations(body.evaluations)
    .await
    .map_err(ApiError::store)?;

  let (applied, skipped) = (report.applied(), report.skipped());
  info!(applied, skipped, "evaluations saved");
  Ok(
    Envelope::data(report)
      .with_message(format!("{applied} saved, {skipped} skipped"))
      .with_count(applied),
  )
}

/// `GET /evaluations/session/{code}`
pub async fn by_session<S>(
  State(store): State<Arc<S>>,
  PathParams(code): PathParams<i64>,
) -> Result<Envelope<Vec<EvaluationRecord>>, ApiError>
where
  S: TrainingStore,
{
  let records = store
    .session_evaluations(code)
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::list(records))
}

/// `GET /evaluations/session/{code}/skills`
pub async fn skills<S>(
  State(store): State<Arc<S>>,
  PathParams(code): PathParams<i64>,
) -> Result<Envelope<Vec<Skill>>, ApiError>
where
  S: TrainingStore,
{
  let skills = store.session_skills(code).await.map_err(ApiError::store)?;
  Ok(Envelope::list(skills))
}

/// `GET /evaluations/session/{code}/matrix`
pub async fn matrix<S>(
  State(store): State<Arc<S>>,
  PathParams(code): PathParams<i64>,
) -> Result<Envelope<EvaluationMatrix>, ApiError>
where
  S: TrainingStore,
{
  let matrix = store.evaluation_matrix(code).await.map_err(ApiError::store)?;
  let rows = matrix.participants.len();
  Ok(Envelope::data(matrix).with_count(rows))
}

/// `GET /evaluations/session/{code}/participant/{matricule}`
pub async fn summary<S>(
  State(store): State<Arc<S>>,
  PathParams((code, matricule)): PathParams<(i64, String)>,
) -> Result<Envelope<EvaluationSummary>, ApiError>
where
  S: TrainingStore,
{
  let summary = store
    .evaluation_summary(code, matricule)
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::data(summary))
}

/// `GET /evaluations/participant/{matricule}[?session=<code>]`
pub async fn by_participant<S>(
  State(store): State<Arc<S>>,
  PathParams(matricule): PathParams<String>,
  QueryParams(filter): QueryParams<SessionFilter>,
) -> Result<Envelope<Vec<ParticipantEvaluation>>, ApiError>
where
  S: TrainingStore,
{
  let scores = store
    .participant_evaluations(matricule, filter.session)
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::list(scores))
}
