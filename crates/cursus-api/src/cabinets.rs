//! Handlers for `/cabinets` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/cabinets` | With per-cabinet session counts |
//! | `POST`   | `/cabinets` | 409 if the name is taken |
//! | `GET`    | `/cabinets/{id}` | With the sessions it runs |
//! | `PUT`    | `/cabinets/{id}` | |
//! | `DELETE` | `/cabinets/{id}` | 400 while used by a session |
//! | `GET`    | `/cabinets/{id}/sessions` | |

use std::sync::Arc;

use axum::extract::State;
use cursus_core::{
  cabinet::{Cabinet, CabinetDetail, CabinetSummary, NewCabinet},
  session::SessionSummary,
  store::TrainingStore,
};

use crate::{
  envelope::Envelope,
  error::ApiError,
  extract::{JsonBody, PathParams},
  validate,
};

fn check(body: &NewCabinet) -> Result<(), ApiError> {
  validate::required("name", &body.name)?;
  validate::not_blank("phone", body.phone.as_deref())?;
  validate::not_blank("location", body.location.as_deref())
}

/// `GET /cabinets`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Envelope<Vec<CabinetSummary>>, ApiError>
where
  S: TrainingStore,
{
  let cabinets = store.list_cabinets().await.map_err(ApiError::store)?;
  Ok(Envelope::list(cabinets))
}

/// `GET /cabinets/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<i64>,
) -> Result<Envelope<CabinetDetail>, ApiError>
where
  S: TrainingStore,
{
  let cabinet = store
    .get_cabinet(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("cabinet not found: {id}")))?;
  Ok(Envelope::data(cabinet))
}

/// `POST /cabinets`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewCabinet>,
) -> Result<Envelope<Cabinet>, ApiError>
where
  S: TrainingStore,
{
  check(&body)?;
  let cabinet = store.create_cabinet(body).await.map_err(ApiError::store)?;
  Ok(Envelope::data(cabinet).with_message("cabinet created").created())
}

/// `PUT /cabinets/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<i64>,
  JsonBody(body): JsonBody<NewCabinet>,
) -> Result<Envelope<Cabinet>, ApiError>
where
  S: TrainingStore,
{
  check(&body)?;
  let cabinet = store
    .update_cabinet(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Envelope::data(cabinet).with_message("cabinet updated"))
}

/// `DELETE /cabinets/{id}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<i64>,
) -> Result<Envelope<()>, ApiError>
where
  S: TrainingStore,
{
  store.delete_cabinet(id).await.map_err(ApiError::store)?;
  Ok(Envelope::message(format!("cabinet {id} deleted")))
}

/// `GET /cabinets/{id}/sessions`
pub async fn sessions<S>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<i64>,
) -> Result<Envelope<Vec<SessionSummary>>, ApiError>
where
  S: TrainingStore,
{
  let sessions = store.cabinet_sessions(id).await.map_err(ApiError::store)?;
  Ok(Envelope::list(sessions))
}
