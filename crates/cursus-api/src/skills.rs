//! Handlers for `/skills` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/skills` | |
//! | `POST`   | `/skills` | Body: `{"description":"..."}`, 409 if taken |
//! | `GET`    | `/skills/search?q=` | `q` needs at least 2 characters |
//! | `GET`    | `/skills/{id}` | 404 if not found |
//! | `PUT`    | `/skills/{id}` | |
//! | `DELETE` | `/skills/{id}` | 400 while linked or evaluated |

use std::sync::Arc;

use axum::extract::State;
use cursus_core::{catalogue::Skill, store::TrainingStore};
use serde::Deserialize;

use crate::{
  envelope::Envelope,
  error::ApiError,
  extract::{JsonBody, PathParams, QueryParams},
  validate,
};

#[derive(Debug, Deserialize)]
pub struct SkillBody {
  pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub q: Option<String>,
}

/// `GET /skills`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Envelope<Vec<Skill>>, ApiError>
where
  S: TrainingStore,
{
  let skills = store.list_skills().await.map_err(ApiError::store)?;
  Ok(Envelope::list(skills))
}

/// `GET /skills/search?q=<term>`
pub async fn search<S>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<SearchParams>,
) -> Result<Envelope<Vec<Skill>>, ApiError>
where
  S: TrainingStore,
{
  let term = validate::search_term(params.q.as_deref())?;
  let skills = store.search_skills(term).await.map_err(ApiError::store)?;
  Ok(Envelope::list(skills))
}

/// `GET /skills/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<i64>,
) -> Result<Envelope<Skill>, ApiError>
where
  S: TrainingStore,
{
  let skill = store
    .get_skill(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("skill not found: {id}")))?;
  Ok(Envelope::data(skill))
}

/// `POST /skills`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<SkillBody>,
) -> Result<Envelope<Skill>, ApiError>
where
  S: TrainingStore,
{
  validate::required("description", &body.description)?;
  let skill = store
    .create_skill(body.description.trim().to_owned())
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::data(skill).with_message("skill created").created())
}

/// `PUT /skills/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<i64>,
  JsonBody(body): JsonBody<SkillBody>,
) -> Result<Envelope<Skill>, ApiError>
where
  S: TrainingStore,
{
  validate::required("description", &body.description)?;
  let skill = store
    .update_skill(id, body.description.trim().to_owned())
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::data(skill).with_message("skill updated"))
}

/// `DELETE /skills/{id}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<i64>,
) -> Result<Envelope<()>, ApiError>
where
  S: TrainingStore,
{
  store.delete_skill(id).await.map_err(ApiError::store)?;
  Ok(Envelope::message(format!("skill {id} deleted")))
}
