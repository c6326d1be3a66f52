//! Bearer-token gate.
//!
//! The server stores only the argon2 PHC hash of the shared token; requests
//! present the token itself in `Authorization: Bearer <token>`.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use cursus_api::ApiError;
use rand_core::OsRng;
use tracing::debug;

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub token_hash: String,
}

/// Check the request's bearer token against `config`.
pub fn verify_bearer(headers: &HeaderMap, config: &AuthConfig) -> Result<(), ApiError> {
  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash =
    PasswordHash::new(&config.token_hash).map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(token.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)
}

/// Middleware rejecting requests without a valid bearer token.
pub async fn require_token(
  State(config): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Response {
  if let Err(e) = verify_bearer(req.headers(), &config) {
    debug!(path = %req.uri().path(), "rejected unauthenticated request");
    return e.into_response();
  }
  next.run(req).await
}

/// The argon2 PHC hash of `token`, suitable for `auth_token_hash`.
pub fn hash_token(token: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(token.as_bytes(), &salt)?.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  fn config(token: &str) -> AuthConfig {
    AuthConfig { token_hash: hash_token(token).unwrap() }
  }

  fn headers(value: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    map
  }

  #[test]
  fn correct_token() {
    let config = config("s3cret");
    assert!(verify_bearer(&headers("Bearer s3cret"), &config).is_ok());
  }

  #[test]
  fn wrong_token() {
    let config = config("s3cret");
    assert!(matches!(
      verify_bearer(&headers("Bearer nope"), &config),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn missing_header() {
    let config = config("s3cret");
    assert!(matches!(
      verify_bearer(&HeaderMap::new(), &config),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn basic_scheme_is_refused() {
    let config = config("s3cret");
    assert!(matches!(
      verify_bearer(&headers("Basic s3cret"), &config),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn malformed_hash_refuses_everything() {
    let config = AuthConfig { token_hash: "not-a-phc-string".into() };
    assert!(verify_bearer(&headers("Bearer anything"), &config).is_err());
  }
}
