//! Handlers for `/verify` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use plotline_core::{store::SubmissionStore, submission::Verification};
use plotline_intake::Intake;
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /verify/{id}`: the target of the QR code printed on a delivered
/// sketch.
pub async fn verify<S>(
  State(intake): State<Arc<Intake<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Verification>, ApiError>
where
  S: SubmissionStore,
{
  Ok(Json(intake.verify(id).await?))
}
