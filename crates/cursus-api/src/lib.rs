//! JSON REST API for Cursus.
//!
//! Exposes an axum [`Router`] backed by any
//! [`cursus_core::store::TrainingStore`]. Successful responses use the
//! [`Envelope`]; failures render through [`ApiError`]. Auth, CORS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cursus_api::api_router(store.clone()))
//! ```

pub mod agents;
pub mod attendance;
pub mod cabinets;
pub mod catalogues;
pub mod envelope;
pub mod error;
pub mod evaluations;
pub mod extract;
pub mod sessions;
pub mod skills;
pub mod validate;


use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use cursus_core::store::TrainingStore;

pub use envelope::Envelope;
pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: TrainingStore + 'static,
{
  Router::new()
    // Agents
    .route("/agents", get(agents::list::<S>).post(agents::create::<S>))
    .route("/agents/trainers", get(agents::trainers::<S>))
    .route(
      "/agents/{matricule}",
      get(agents::get_one::<S>)
        .put(agents::update::<S>)
        .delete(agents::delete::<S>),
    )
    // Catalogues
    .route(
      "/catalogues",
      get(catalogues::list::<S>).post(catalogues::create::<S>),
    )
    .route(
      "/catalogues/{id}",
      get(catalogues::get_one::<S>)
        .put(catalogues::update::<S>)
        .delete(catalogues::delete::<S>),
    )
    .route("/catalogues/{id}/skills", get(catalogues::skills::<S>))
    // Skills
    .route("/skills", get(skills::list::<S>).post(skills::create::<S>))
    .route("/skills/search", get(skills::search::<S>))
    .route(
      "/skills/{id}",
      get(skills::get_one::<S>)
        .put(skills::update::<S>)
        .delete(skills::delete::<S>),
    )
    // Cabinets
    .route("/cabinets", get(cabinets::list::<S>).post(cabinets::create::<S>))
    .route(
      "/cabinets/{id}",
      get(cabinets::get_one::<S>)
        .put(cabinets::update::<S>)
        .delete(cabinets::delete::<S>),
    )
    .route("/cabinets/{id}/sessions", get(cabinets::sessions::<S>))
    // Sessions
    .route("/sessions", get(sessions::list::<S>).post(sessions::create::<S>))
    .route(
      "/sessions/{code}",
      get(sessions::get_one::<S>)
        .put(sessions::update::<S>)
        .delete(sessions::delete::<S>),
    )
    .route(
      "/sessions/{code}/participants",
      get(sessions::participants::<S>).post(sessions::enroll::<S>),
    )
    .route(
      "/sessions/{code}/participants/{matricule}",
      delete(sessions::withdraw::<S>),
    )
    // Attendance
    .route("/attendance", post(attendance::record::<S>))
    .route("/attendance/session/{code}", get(attendance::by_session::<S>))
    .route("/attendance/session/{code}/dates", get(attendance::dates::<S>))
    .route("/attendance/session/{code}/roster", get(attendance::roster::<S>))
    .route(
      "/attendance/session/{code}/participant/{matricule}",
      get(attendance::summary::<S>),
    )
    // Evaluations
    .route("/evaluations", post(evaluations::save::<S>))
    .route(
      "/evaluations/session/{code}",
      get(evaluations::by_session::<S>),
    )
    .route(
      "/evaluations/session/{code}/skills",
      get(evaluations::skills::<S>),
    )
    .route(
      "/evaluations/session/{code}/matrix",
      get(evaluations::matrix::<S>),
    )
    .route(
      "/evaluations/session/{code}/participant/{matricule}",
      get(evaluations::summary::<S>),
    )
    .route(
      "/evaluations/participant/{matricule}",
      get(evaluations::by_participant::<S>),
    )
    .with_state(store)
}
