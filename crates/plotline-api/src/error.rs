//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::multipart::MultipartError,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use plotline_intake::IntakeError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// A field the client can fix.
  #[error("{0}")]
  BadRequest(String),

  /// A document the OCR could not read.
  #[error("could not read the uploaded document: {0}")]
  Unreadable(String),

  /// An external service failed; retrying later may work.
  #[error("service temporarily unavailable: {0}")]
  Unavailable(String),

  /// The submission was saved as a draft; the names must be typed in.
  #[error(
    "the names on the land transfer document could not be read ({reason}); \
     please enter them manually"
  )]
  Draft { submission_id: Uuid, reason: String },

  #[error(transparent)]
  Multipart(#[from] MultipartError),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<IntakeError> for ApiError {
  fn from(e: IntakeError) -> Self {
    match e {
      IntakeError::Validation { .. } => Self::BadRequest(e.to_string()),
      IntakeError::Extraction(_) | IntakeError::Geometry(_) => Self::Unreadable(e.to_string()),
      IntakeError::LocationLookup(_) | IntakeError::DocumentStore { .. } => {
        Self::Unavailable(e.to_string())
      }
      IntakeError::NotFound(id) => Self::NotFound(format!("submission {id} not found")),
      IntakeError::Scratch(_) => Self::Internal(e.to_string()),
      IntakeError::Store(inner) => Self::Store(inner),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) | ApiError::Draft { .. } => StatusCode::BAD_REQUEST,
      ApiError::Unreadable(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Multipart(e) => e.status(),
      ApiError::Internal(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let body = match &self {
      ApiError::Draft { submission_id, .. } => {
        json!({ "error": self.to_string(), "submission_id": submission_id })
      }
      _ => json!({ "error": self.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}
