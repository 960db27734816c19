//! The submission intake state machine.
//!
//! ```text
//! VALIDATING → GEOMETRY_NORMALIZED → DOCUMENTS_UPLOADED → EXTRACTING_NAMES
//!   → PERSISTED_DRAFT
//!   → LOCATION_RESOLVING → PERSISTED_COMPLETE
//! ```
//!
//! Any error before a persisted state is `REJECTED`: nothing is written to
//! the store. The draft branch is an outcome, not an error.

use std::{fmt, sync::Arc};

use plotline_core::{
  collab::{DocumentKind, DocumentStore, UploadedDocument},
  plot::PlotGeometry,
  store::SubmissionStore,
  submission::{
    NewSubmission, PartyNames, ResolvedLocation, StoredDocument, Submission,
    SubmissionDocuments, SubmissionStatus, Verification,
  },
};
use uuid::Uuid;

use crate::{
  ExtractionFailure, IntakeError, Result,
  extraction::{DocumentExtractor, Scratch},
  location::LocationResolver,
  request::{IntakeRequest, PendingGeometry, ValidatedIntake, validate},
};

// ─── States and outcomes ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeState {
  Validating,
  GeometryNormalized,
  DocumentsUploaded,
  ExtractingNames,
  LocationResolving,
  PersistedDraft,
  PersistedComplete,
  Rejected,
}

impl IntakeState {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Validating => "VALIDATING",
      Self::GeometryNormalized => "GEOMETRY_NORMALIZED",
      Self::DocumentsUploaded => "DOCUMENTS_UPLOADED",
      Self::ExtractingNames => "EXTRACTING_NAMES",
      Self::LocationResolving => "LOCATION_RESOLVING",
      Self::PersistedDraft => "PERSISTED_DRAFT",
      Self::PersistedComplete => "PERSISTED_COMPLETE",
      Self::Rejected => "REJECTED",
    }
  }
}

impl fmt::Display for IntakeState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// How a successful intake ended.
#[derive(Debug, Clone)]
pub enum IntakeOutcome {
  /// Persisted with status `New`.
  Complete(Submission),
  /// Persisted with status `draft`; the party names have to be supplied by
  /// hand through [`Intake::correct_names`].
  Draft {
    submission: Submission,
    reason:     String,
  },
}

impl IntakeOutcome {
  pub fn submission(&self) -> &Submission {
    match self {
      Self::Complete(submission) | Self::Draft { submission, .. } => submission,
    }
  }
}

// ─── Intake ──────────────────────────────────────────────────────────────────

/// Entry point for new submissions and the follow-up operations on them.
pub struct Intake<S> {
  store:     Arc<S>,
  extractor: DocumentExtractor,
  locations: LocationResolver,
  documents: Arc<dyn DocumentStore>,
}

impl<S: SubmissionStore> Intake<S> {
  pub fn new(
    store: Arc<S>,
    extractor: DocumentExtractor,
    locations: LocationResolver,
    documents: Arc<dyn DocumentStore>,
  ) -> Self {
    Self { store, extractor, locations, documents }
  }

  /// Run one intake request to a terminal state.
  pub async fn submit(&self, request: IntakeRequest) -> Result<IntakeOutcome> {
    let mut state = IntakeState::Validating;
    let result = self.run(request, &mut state).await;

    match &result {
      Ok(IntakeOutcome::Complete(s)) => {
        tracing::info!(submission_id = %s.submission_id, "submission accepted");
      }
      Ok(IntakeOutcome::Draft { submission, reason }) => {
        tracing::info!(
          submission_id = %submission.submission_id,
          %reason,
          "submission saved as draft"
        );
      }
      Err(e) => {
        tracing::warn!(
          state = %IntakeState::Rejected,
          rejected_in = %state,
          error = %e,
          "submission rejected"
        );
      }
    }
    result
  }

  async fn run(
    &self,
    request: IntakeRequest,
    state: &mut IntakeState,
  ) -> Result<IntakeOutcome> {
    enter(state, IntakeState::Validating);
    let ValidatedIntake {
      plot_number,
      address,
      land_use,
      contact,
      notes,
      sketch_type,
      geometry,
      manual_owner,
      manual_transferee,
      land_transfer,
      id_proof,
    } = validate(request)?;

    let scratch = Scratch::new().map_err(IntakeError::Scratch)?;

    // Option C reads the sketch before anything else. When the transfer
    // document is also present both OCR calls run side by side.
    let (geometry, sketch, early_names) = match geometry {
      PendingGeometry::Ready(geometry) => (geometry, None, None),
      PendingGeometry::AwaitingSketch { length, width, sketch } => {
        let (points, names) = match &land_transfer {
          Some(transfer) => {
            let (points, names) = tokio::join!(
              self.extractor.extract_utm_points(&scratch, &sketch),
              self.extractor.extract_party_names(&scratch, transfer),
            );
            (points, Some(names))
          }
          None => (self.extractor.extract_utm_points(&scratch, &sketch).await, None),
        };
        let geometry = PlotGeometry::SurveyedSketch { utm_coords: points?, length, width };
        (geometry, Some(sketch), names)
      }
    };
    let dimensions = geometry.dimensions()?.to_string();
    enter(state, IntakeState::GeometryNormalized);
    tracing::debug!(option = geometry.option().as_str(), %dimensions, "geometry normalized");

    let land_transfer = land_transfer
      .ok_or_else(|| IntakeError::validation("landTransfer", "file is required"))?;
    let id_proof =
      id_proof.ok_or_else(|| IntakeError::validation("idProof", "file is required"))?;

    let documents = SubmissionDocuments {
      land_transfer: self.upload(DocumentKind::LandTransfer, &land_transfer).await?,
      id_proof:      self.upload(DocumentKind::IdProof, &id_proof).await?,
      utm_sketch:    match &sketch {
        Some(sketch) => Some(self.upload(DocumentKind::UtmSketch, sketch).await?),
        None => None,
      },
    };
    enter(state, IntakeState::DocumentsUploaded);

    enter(state, IntakeState::ExtractingNames);
    let extracted = match early_names {
      Some(names) => names,
      None => self.extractor.extract_party_names(&scratch, &land_transfer).await,
    };
    drop(scratch);

    let (names, failure) =
      fill_names(extracted, manual_owner.as_deref(), manual_transferee.as_deref());

    let mut submission = NewSubmission {
      names,
      plot_number,
      address,
      land_use,
      contact,
      notes,
      sketch_type,
      geometry,
      location: ResolvedLocation::default(),
      dimensions,
      documents,
      status: SubmissionStatus::Draft,
    };

    if !submission.names.is_complete() {
      let reason = match failure {
        Some(failure) => failure.to_string(),
        None => missing_names_reason(&submission.names),
      };
      let submission = self.persist(submission).await?;
      enter(state, IntakeState::PersistedDraft);
      return Ok(IntakeOutcome::Draft { submission, reason });
    }

    enter(state, IntakeState::LocationResolving);
    let point = submission.geometry.representative_point()?;
    submission.location = self.locations.resolve(point).await?;
    submission.status = SubmissionStatus::New;

    let submission = self.persist(submission).await?;
    enter(state, IntakeState::PersistedComplete);
    Ok(IntakeOutcome::Complete(submission))
  }

  async fn upload(
    &self,
    kind: DocumentKind,
    document: &UploadedDocument,
  ) -> Result<StoredDocument> {
    self
      .documents
      .put(kind, document)
      .await
      .map_err(|source| IntakeError::DocumentStore { kind, source })
  }

  async fn persist(&self, submission: NewSubmission) -> Result<Submission> {
    self.store.create(submission).await.map_err(store_error)
  }

  /// Replace both party names and mark the submission `New`. Geometry,
  /// location and dimensions are not recomputed. Calling this again on a
  /// submission that is already `New` overwrites the names.
  pub async fn correct_names(&self, id: Uuid, names: PartyNames) -> Result<Submission> {
    let names = PartyNames {
      owner_name:     names.owner_name.trim().to_owned(),
      transferred_to: names.transferred_to.trim().to_owned(),
    };
    if names.owner_name.is_empty() {
      return Err(IntakeError::validation("ownerName", "is required"));
    }
    if names.transferred_to.is_empty() {
      return Err(IntakeError::validation("transferredTo", "is required"));
    }

    let submission = self
      .store
      .correct_names(id, names)
      .await
      .map_err(store_error)?
      .ok_or(IntakeError::NotFound(id))?;
    tracing::info!(submission_id = %id, "party names corrected");
    Ok(submission)
  }

  pub async fn update_status(&self, id: Uuid, status: SubmissionStatus) -> Result<Submission> {
    let submission = self
      .store
      .update_status(id, status)
      .await
      .map_err(store_error)?
      .ok_or(IntakeError::NotFound(id))?;
    tracing::info!(submission_id = %id, %status, "status updated");
    Ok(submission)
  }

  pub async fn get(&self, id: Uuid) -> Result<Submission> {
    self
      .store
      .get(id)
      .await
      .map_err(store_error)?
      .ok_or(IntakeError::NotFound(id))
  }

  /// All submissions, newest first.
  pub async fn list(&self) -> Result<Vec<Submission>> {
    self.store.list().await.map_err(store_error)
  }

  pub async fn verify(&self, id: Uuid) -> Result<Verification> {
    let submission = self.get(id).await?;
    Ok(Verification::from(&submission))
  }

  /// Read the party names off a transfer document without creating a
  /// submission, so a form can be prefilled. Nothing is stored.
  pub async fn read_names(&self, document: &UploadedDocument) -> Result<PartyNames> {
    let scratch = Scratch::new().map_err(IntakeError::Scratch)?;
    let names = self.extractor.extract_party_names(&scratch, document).await?;
    tracing::debug!(complete = names.is_complete(), "transfer names read");
    Ok(names)
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn enter(state: &mut IntakeState, next: IntakeState) {
  *state = next;
  tracing::debug!(state = %next, "intake state");
}

fn store_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> IntakeError {
  IntakeError::Store(Box::new(e))
}

/// Merge OCR output with the typed-in fallbacks. Typed-in values only fill
/// names the OCR left empty.
fn fill_names(
  extracted: std::result::Result<PartyNames, ExtractionFailure>,
  manual_owner: Option<&str>,
  manual_transferee: Option<&str>,
) -> (PartyNames, Option<ExtractionFailure>) {
  let (mut names, failure) = match extracted {
    Ok(names) => (names, None),
    Err(failure) => {
      tracing::warn!(error = %failure, "party name extraction failed");
      (PartyNames::default(), Some(failure))
    }
  };
  if names.owner_name.is_empty() {
    names.owner_name = manual_owner.unwrap_or_default().to_owned();
  }
  if names.transferred_to.is_empty() {
    names.transferred_to = manual_transferee.unwrap_or_default().to_owned();
  }
  (names, failure)
}

fn missing_names_reason(names: &PartyNames) -> String {
  match (names.owner_name.is_empty(), names.transferred_to.is_empty()) {
    (true, true) => "owner and transferee names could not be read".into(),
    (true, false) => "owner name could not be read".into(),
    _ => "transferee name could not be read".into(),
  }
}

#[cfg(test)]
mod tests {
  use plotline_core::collab::DocumentKind;

  use super::*;

  fn names(owner: &str, transferee: &str) -> PartyNames {
    PartyNames { owner_name: owner.into(), transferred_to: transferee.into() }
  }

  #[test]
  fn manual_names_fill_only_the_gaps() {
    let (merged, failure) =
      fill_names(Ok(names("ADA OBI", "")), Some("WRONG"), Some("EMEKA OBI"));
    assert_eq!(merged, names("ADA OBI", "EMEKA OBI"));
    assert!(failure.is_none());
  }

  #[test]
  fn failed_extraction_falls_back_to_manual_names() {
    let failure = ExtractionFailure::Empty { kind: DocumentKind::LandTransfer };
    let (merged, failure) = fill_names(Err(failure), Some("ADA OBI"), Some("EMEKA OBI"));
    assert!(merged.is_complete());
    assert!(failure.is_some());
  }

  #[test]
  fn missing_reason_names_the_gap() {
    assert_eq!(missing_names_reason(&names("", "X")), "owner name could not be read");
    assert_eq!(missing_names_reason(&names("X", "")), "transferee name could not be read");
  }

  #[test]
  fn state_names_match_the_lifecycle() {
    assert_eq!(IntakeState::PersistedDraft.to_string(), "PERSISTED_DRAFT");
    assert_eq!(IntakeState::Rejected.as_str(), "REJECTED");
  }
}
