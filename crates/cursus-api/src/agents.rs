//! Handlers for `/agents` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/agents` | |
//! | `POST`   | `/agents` | 409 if the matricule is taken |
//! | `GET`    | `/agents/trainers` | Agents with a trainer domain |
//! | `GET`    | `/agents/{matricule}` | 404 if not found |
//! | `PUT`    | `/agents/{matricule}` | Trainer row follows `trainer_domain` |
//! | `DELETE` | `/agents/{matricule}` | Cascades to enrollments and sessions |

use std::sync::Arc;

use axum::extract::State;
use cursus_core::{
  agent::{Agent, AgentUpdate, NewAgent},
  store::TrainingStore,
};

use crate::{
  envelope::Envelope,
  error::ApiError,
  extract::{JsonBody, PathParams},
  validate,
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /agents`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Envelope<Vec<Agent>>, ApiError>
where
  S: TrainingStore,
{
  let agents = store.list_agents().await.map_err(ApiError::store)?;
  Ok(Envelope::list(agents))
}

/// `GET /agents/trainers`
pub async fn trainers<S>(
  State(store): State<Arc<S>>,
) -> Result<Envelope<Vec<Agent>>, ApiError>
where
  S: TrainingStore,
{
  let trainers = store.list_trainers().await.map_err(ApiError::store)?;
  Ok(Envelope::list(trainers))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /agents/{matricule}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  PathParams(matricule): PathParams<String>,
) -> Result<Envelope<Agent>, ApiError>
where
  S: TrainingStore,
{
  let agent = store
    .get_agent(matricule.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("agent not found: {matricule}")))?;
  Ok(Envelope::data(agent))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /agents`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewAgent>,
) -> Result<Envelope<Agent>, ApiError>
where
  S: TrainingStore,
{
  validate::required("matricule", &body.matricule)?;
  validate::required("name", &body.name)?;
  validate::not_blank("trainer_domain", body.trainer_domain.as_deref())?;

  let agent = store.create_agent(body).await.map_err(ApiError::store)?;
  Ok(Envelope::data(agent).with_message("agent created").created())
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /agents/{matricule}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  PathParams(matricule): PathParams<String>,
  JsonBody(body): JsonBody<AgentUpdate>,
) -> Result<Envelope<Agent>, ApiError>
where
  S: TrainingStore,
{
  validate::required("name", &body.name)?;
  validate::not_blank("trainer_domain", body.trainer_domain.as_deref())?;

  let agent = store
    .update_agent(matricule, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::data(agent).with_message("agent updated"))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /agents/{matricule}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  PathParams(matricule): PathParams<String>,
) -> Result<Envelope<()>, ApiError>
where
  S: TrainingStore,
{
  store
    .delete_agent(matricule.clone())
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::message(format!("agent {matricule} deleted")))
}
