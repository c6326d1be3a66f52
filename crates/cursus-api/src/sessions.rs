//! Handlers for `/sessions` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/sessions` | Most recent first |
//! | `POST`   | `/sessions` | Optional initial `participants` |
//! | `GET`    | `/sessions/{code}` | With facilitator and participants |
//! | `PUT`    | `/sessions/{code}` | Same type rules as creation |
//! | `DELETE` | `/sessions/{code}` | Cascades to scores and attendance |
//! | `GET`    | `/sessions/{code}/participants` | |
//! | `POST`   | `/sessions/{code}/participants` | Body: `{"matricule":"..."}` |
//! | `DELETE` | `/sessions/{code}/participants/{matricule}` | |

use std::sync::Arc;

use axum::extract::State;
use cursus_core::{
  session::{Enrollee, NewSession, SessionDetail, SessionSummary, SessionUpdate},
  store::TrainingStore,
};
use serde::Deserialize;

use crate::{
  envelope::Envelope,
  error::ApiError,
  extract::{JsonBody, PathParams},
  validate,
};

#[derive(Debug, Deserialize)]
pub struct EnrollBody {
  pub matricule: String,
}

// ─── Sessions ─────────────────────────────────────────────────────────────────

/// `GET /sessions`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Envelope<Vec<SessionSummary>>, ApiError>
where
  S: TrainingStore,
{
  let sessions = store.list_sessions().await.map_err(ApiError::store)?;
  Ok(Envelope::list(sessions))
}

/// `GET /sessions/{code}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  PathParams(code): PathParams<i64>,
) -> Result<Envelope<SessionDetail>, ApiError>
where
  S: TrainingStore,
{
  let session = store
    .get_session(code)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("session not found: {code}")))?;
  Ok(Envelope::data(session))
}

/// `POST /sessions`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewSession>,
) -> Result<Envelope<SessionDetail>, ApiError>
where
  S: TrainingStore,
{
  validate::date_range(body.start_date, body.end_date)?;
  let session = store.create_session(body).await.map_err(ApiError::store)?;
  Ok(Envelope::data(session).with_message("session created").created())
}

/// `PUT /sessions/{code}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  PathParams(code): PathParams<i64>,
  JsonBody(body): JsonBody<SessionUpdate>,
) -> Result<Envelope<SessionDetail>, ApiError>
where
  S: TrainingStore,
{
  validate::date_range(body.start_date, body.end_date)?;
  let session = store
    .update_session(code, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::data(session).with_message("session updated"))
}

/// `DELETE /sessions/{code}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  PathParams(code): PathParams<i64>,
) -> Result<Envelope<()>, ApiError>
where
  S: TrainingStore,
{
  store.delete_session(code).await.map_err(ApiError::store)?;
  Ok(Envelope::message(format!("session {code} deleted")))
}

// ─── Participants ─────────────────────────────────────────────────────────────

/// `GET /sessions/{code}/participants`
pub async fn participants<S>(
  State(store): State<Arc<S>>,
  PathParams(code): PathParams<i64>,
) -> Result<Envelope<Vec<Enrollee>>, ApiError>
where
  S: TrainingStore,
{
  let enrolled = store
    .session_participants(code)
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::list(enrolled))
}

/// `POST /sessions/{code}/participants`
pub async fn enroll<S>(
  State(store): State<Arc<S>>,
  PathParams(code): PathParams<i64>,
  JsonBody(body): JsonBody<EnrollBody>,
) -> Result<Envelope<()>, ApiError>
where
  S: TrainingStore,
{
  validate::required("matricule", &body.matricule)?;
  store
    .add_participant(code, body.matricule.clone())
    .await
    .map_err(ApiError::store)?;
  Ok(
    Envelope::message(format!(
      "agent {} enrolled in session {code}",
      body.matricule
    ))
    .created(),
  )
}

/// `DELETE /sessions/{code}/participants/{matricule}`
pub async fn withdraw<S>(
  State(store): State<Arc<S>>,
  PathParams((code, matricule)): PathParams<(i64, String)>,
) -> Result<Envelope<()>, ApiError>
where
  S: TrainingStore,
{
  store
    .remove_participant(code, matricule.clone())
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::message(format!(
    "agent {matricule} removed from session {code}"
  )))
}
