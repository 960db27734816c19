//! Handlers for `/extract` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/extract/extract-transfer-names` | `multipart/form-data` with one `image` part; returns `{"ownerName","transferredTo"}` |

use std::sync::Arc;

use axum::{Json, extract::{Multipart, State}};
use plotline_core::{store::SubmissionStore, submission::PartyNames};
use plotline_intake::Intake;

use crate::{error::ApiError, submissions::read_file};

/// `POST /extract/extract-transfer-names`
///
/// Reads the names off a transfer document so the intake form can be
/// prefilled. Either name may come back empty.
pub async fn transfer_names<S>(
  State(intake): State<Arc<Intake<S>>>,
  mut multipart: Multipart,
) -> Result<Json<PartyNames>, ApiError>
where
  S: SubmissionStore,
{
  let mut image = None;
  while let Some(field) = multipart.next_field().await? {
    if field.name() == Some("image") {
      image = read_file(field).await?;
    }
  }
  let image = image.ok_or_else(|| ApiError::BadRequest("image: file is required".into()))?;

  Ok(Json(intake.read_names(&image).await?))
}
