//! Handlers for `/catalogues` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/catalogues` | Each catalogue with its skills |
//! | `POST`   | `/catalogues` | Body `skills` lists skill descriptions |
//! | `GET`    | `/catalogues/{id}` | 404 if not found |
//! | `PUT`    | `/catalogues/{id}` | Replaces the skill set |
//! | `DELETE` | `/catalogues/{id}` | 400 while used by a session |
//! | `GET`    | `/catalogues/{id}/skills` | |

use std::sync::Arc;

use axum::extract::State;
use cursus_core::{
  catalogue::{CatalogueDetail, NewCatalogue, Skill},
  store::TrainingStore,
};

use crate::{
  envelope::Envelope,
  error::ApiError,
  extract::{JsonBody, PathParams},
  validate,
};

fn check(body: &NewCatalogue) -> Result<(), ApiError> {
  validate::required("name", &body.name)?;
  body
    .skills
    .iter()
    .try_for_each(|s| validate::required("skill description", s))
}

/// `GET /catalogues`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Envelope<Vec<CatalogueDetail>>, ApiError>
where
  S: TrainingStore,
{
  let catalogues = store.list_catalogues().await.map_err(ApiError::store)?;
  Ok(Envelope::list(catalogues))
}

/// `GET /catalogues/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<i64>,
) -> Result<Envelope<CatalogueDetail>, ApiError>
where
  S: TrainingStore,
{
  let catalogue = store
    .get_catalogue(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("catalogue not found: {id}")))?;
  Ok(Envelope::data(catalogue))
}

/// `POST /catalogues`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewCatalogue>,
) -> Result<Envelope<CatalogueDetail>, ApiError>
where
  S: TrainingStore,
{
  check(&body)?;
  let catalogue = store.create_catalogue(body).await.map_err(ApiError::store)?;
  Ok(Envelope::data(catalogue).with_message("catalogue created").created())
}

/// `PUT /catalogues/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<i64>,
  JsonBody(body): JsonBody<NewCatalogue>,
) -> Result<Envelope<CatalogueDetail>, ApiError>
where
  S: TrainingStore,
{
  check(&body)?;
  let catalogue = store
    .update_catalogue(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::data(catalogue).with_message("catalogue updated"))
}

/// `DELETE /catalogues/{id}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<i64>,
) -> Result<Envelope<()>, ApiError>
where
  S: TrainingStore,
{
  store.delete_catalogue(id).await.map_err(ApiError::store)?;
  Ok(Envelope::message(format!("catalogue {id} deleted")))
}

/// `GET /catalogues/{id}/skills`
pub async fn skills<S>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<i64>,
) -> Result<Envelope<Vec<Skill>>, ApiError>
where
  S: TrainingStore,
{
  let skills = store.catalogue_skills(id).await.map_err(ApiError::store)?;
  Ok(Envelope::list(skills))
}
