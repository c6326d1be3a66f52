//! The success envelope: `{"success": true, "data"?, "message"?, "count"?}`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  data:    Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  count:   Option<usize>,
  #[serde(skip)]
  status:  StatusCode,
}

impl<T> Envelope<T> {
  pub fn data(data: T) -> Self {
    Self {
      success: true,
      data:    Some(data),
      message: None,
      count:   None,
      status:  StatusCode::OK,
    }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }

  pub fn with_count(mut self, count: usize) -> Self {
    self.count = Some(count);
    self
  }

  /// Respond with `201 Created`.
  pub fn created(mut self) -> Self {
    self.status = StatusCode::CREATED;
    self
  }
}

impl<T> Envelope<Vec<T>> {
  /// A listing, counted.
  pub fn list(items: Vec<T>) -> Self {
    let count = items.len();
    Self::data(items).with_count(count)
  }
}

impl Envelope<()> {
  /// A bare acknowledgement without data.
  pub fn message(message: impl Into<String>) -> Self {
    Self {
      success: true,
      data:    None,
      message: Some(message.into()),
      count:   None,
      status:  StatusCode::OK,
    }
  }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
  fn into_response(self) -> Response {
    (self.status, Json(self)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn list_carries_count() {
    let value = serde_json::to_value(Envelope::list(vec![1, 2, 3])).unwrap();
    assert_eq!(value, json!({ "success": true, "data": [1, 2, 3], "count": 3 }));
  }

  #[test]
  fn message_omits_data() {
    let value = serde_json::to_value(Envelope::message("deleted")).unwrap();
    assert_eq!(value, json!({ "success": true, "message": "deleted" }));
  }

  #[test]
  fn created_sets_status() {
    let res = Envelope::data("x").created().into_response();
    assert_eq!(res.status(), StatusCode::CREATED);
  }
}
