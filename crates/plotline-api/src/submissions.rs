//! Handlers for `/submissions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/submissions` | Newest first |
//! | `POST` | `/submissions` | `multipart/form-data`; 201, or 400 with `submission_id` for a draft |
//! | `GET`  | `/submissions/{id}` | 404 if not found |
//! | `POST` | `/submissions/{id}/status` | Body: `{"status":"In Progress"}` |
//! | `POST` | `/submissions/{id}/fallback` | Body: `{"ownerName":..,"transferredTo":..}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Multipart, Path, State, multipart::Field},
  http::StatusCode,
  response::IntoResponse,
};
use plotline_core::{
  collab::UploadedDocument,
  store::SubmissionStore,
  submission::{PartyNames, Submission, SubmissionStatus},
};
use plotline_intake::{Intake, IntakeOutcome, IntakeRequest};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /submissions`
pub async fn list<S>(
  State(intake): State<Arc<Intake<S>>>,
) -> Result<Json<Vec<Submission>>, ApiError>
where
  S: SubmissionStore,
{
  Ok(Json(intake.list().await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /submissions`
pub async fn create<S>(
  State(intake): State<Arc<Intake<S>>>,
  multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubmissionStore,
{
  let request = read_form(multipart).await?;
  match intake.submit(request).await? {
    IntakeOutcome::Complete(submission) => Ok((StatusCode::CREATED, Json(submission))),
    IntakeOutcome::Draft { submission, reason } => Err(ApiError::Draft {
      submission_id: submission.submission_id,
      reason,
    }),
  }
}

/// Collect the form into an [`IntakeRequest`]. Unknown parts are skipped; an
/// empty file part counts as no file.
async fn read_form(mut multipart: Multipart) -> Result<IntakeRequest, ApiError> {
  let mut request = IntakeRequest::default();

  while let Some(field) = multipart.next_field().await? {
    let Some(name) = field.name().map(str::to_owned) else {
      continue;
    };

    let slot = match name.as_str() {
      "landTransfer" => &mut request.land_transfer,
      "idProof" => &mut request.id_proof,
      "utmSketch" => &mut request.utm_sketch,
      _ => {
        let text = field.text().await?;
        let target = match name.as_str() {
          "plotNumber" => &mut request.plot_number,
          "address" => &mut request.address,
          "landUse" => &mut request.land_use,
          "email" => &mut request.email,
          "mobile" => &mut request.mobile,
          "agentEmail" => &mut request.agent_email,
          "notes" => &mut request.notes,
          "sketchOption" => &mut request.sketch_option,
          "sketchType" => &mut request.sketch_type,
          "length" => &mut request.length,
          "width" => &mut request.width,
          "lat" => &mut request.lat,
          "lon" => &mut request.lon,
          "latLngCorners" => &mut request.lat_lng_corners,
          "ownerName" => &mut request.owner_name,
          "transferredTo" => &mut request.transferred_to,
          other => {
            tracing::debug!(field = other, "ignoring unknown form field");
            continue;
          }
        };
        *target = Some(text);
        continue;
      }
    };
    *slot = read_file(field).await?;
  }

  Ok(request)
}

pub(crate) async fn read_file(field: Field<'_>) -> Result<Option<UploadedDocument>, ApiError> {
  let file_name = field.file_name().unwrap_or_default().to_owned();
  let bytes = field.bytes().await?;

  if file_name.is_empty() && bytes.is_empty() {
    return Ok(None);
  }
  Ok(Some(UploadedDocument { file_name, bytes }))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /submissions/{id}`
pub async fn get_one<S>(
  State(intake): State<Arc<Intake<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Submission>, ApiError>
where
  S: SubmissionStore,
{
  Ok(Json(intake.get(id).await?))
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: String,
}

/// `POST /submissions/{id}/status`
pub async fn update_status<S>(
  State(intake): State<Arc<Intake<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Submission>, ApiError>
where
  S: SubmissionStore,
{
  let status: SubmissionStatus = body
    .status
    .parse()
    .map_err(|e: plotline_core::Error| ApiError::BadRequest(e.to_string()))?;
  Ok(Json(intake.update_status(id, status).await?))
}

// ─── Fallback correction ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackBody {
  #[serde(default)]
  pub owner_name:     String,
  #[serde(default)]
  pub transferred_to: String,
}

/// `POST /submissions/{id}/fallback`
pub async fn fallback<S>(
  State(intake): State<Arc<Intake<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<FallbackBody>,
) -> Result<Json<Submission>, ApiError>
where
  S: SubmissionStore,
{
  let names = PartyNames {
    owner_name:     body.owner_name,
    transferred_to: body.transferred_to,
  };
  Ok(Json(intake.correct_names(id, names).await?))
}
