//! HTTP server assembly for Cursus.
//!
//! Mounts the [`cursus_api`] router under `/api` behind an optional
//! bearer-token gate, and adds the health endpoint, CORS, request tracing and
//! the catch-all 404.

pub mod auth;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::{HeaderValue, header::InvalidHeaderValue},
  middleware,
  routing::get,
};
use chrono::Utc;
use cursus_api::{ApiError, Envelope, api_router};
use cursus_core::store::TrainingStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};

use auth::{AuthConfig, require_token};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CURSUS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub database_path:   PathBuf,
  /// Allowed CORS origin; any origin when unset or `*`.
  pub cors_origin:     Option<String>,
  /// argon2 hash of the bearer token. The gate is off when unset.
  pub auth_token_hash: Option<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_string(),
      port:            3000,
      database_path:   PathBuf::from("cursus.db"),
      cors_origin:     None,
      auth_token_hash: None,
    }
  }
}

impl ServerConfig {
  pub fn auth(&self) -> Option<AuthConfig> {
    self
      .auth_token_hash
      .clone()
      .map(|token_hash| AuthConfig { token_hash })
  }

  pub fn cors(&self) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = match self.cors_origin.as_deref() {
      None | Some("*") => AllowOrigin::any(),
      Some(origin) => AllowOrigin::exact(HeaderValue::from_str(origin)?),
    };
    Ok(
      CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any),
    )
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router for `store`.
pub fn router<S>(store: Arc<S>, auth: Option<AuthConfig>, cors: CorsLayer) -> Router
where
  S: TrainingStore + 'static,
{
  let mut api = api_router(store);
  if let Some(auth) = auth {
    api = api.route_layer(middleware::from_fn_with_state(
      Arc::new(auth),
      require_token,
    ));
  }
  // Added after the gate so health checks need no token.
  let api = api.route("/health", get(health));

  Router::new()
    .nest("/api", api)
    .fallback(not_found)
    .layer(TraceLayer::new_for_http())
    .layer(cors)
}

/// `GET /api/health`
async fn health() -> Envelope<Value> {
  Envelope::data(json!({ "status": "ok", "timestamp": Utc::now() }))
    .with_message("Cursus API is running")
}

async fn not_found() -> ApiError {
  ApiError::NotFound("route not found".to_owned())
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use cursus_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn app(token: Option<&str>) -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let config = ServerConfig {
      auth_token_hash: token.map(|t| auth::hash_token(t).unwrap()),
      ..ServerConfig::default()
    };
    router(Arc::new(store), config.auth(), config.cors().unwrap())
  }

  async fn get(
    app: Router,
    uri: &str,
    token: Option<&str>,
  ) -> (StatusCode, serde_json::Value) {
    let mut req = Request::builder().uri(uri);
    if let Some(token) = token {
      req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let resp = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn health_needs_no_token() {
    let (status, body) = get(app(Some("s3cret")).await, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
  }

  #[tokio::test]
  async fn api_requires_token_when_configured() {
    let (status, body) = get(app(Some("s3cret")).await, "/api/agents", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) =
      get(app(Some("s3cret")).await, "/api/agents", Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) =
      get(app(Some("s3cret")).await, "/api/agents", Some("s3cret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
  }

  #[tokio::test]
  async fn gate_is_off_without_hash() {
    let (status, _) = get(app(None).await, "/api/agents", None).await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn unmatched_routes_get_not_found_envelope() {
    for uri in ["/nope", "/api/nope"] {
      let (status, body) = get(app(None).await, uri, None).await;
      assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
      assert_eq!(body, serde_json::json!({ "success": false, "message": "route not found" }));
    }
  }

  #[tokio::test]
  async fn cors_echoes_configured_origin() {
    let config = ServerConfig {
      cors_origin: Some("https://training.example".into()),
      ..ServerConfig::default()
    };
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = router(Arc::new(store), None, config.cors().unwrap());

    let req = Request::builder()
      .uri("/api/health")
      .header(header::ORIGIN, "https://training.example")
      .body(Body::empty())
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(
      resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
      "https://training.example"
    );
  }

  #[test]
  fn invalid_origin_is_rejected() {
    let config = ServerConfig {
      cors_origin: Some("bad\norigin".into()),
      ..ServerConfig::default()
    };
    assert!(config.cors().is_err());
  }
}
