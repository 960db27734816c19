//! Error taxonomy for the intake pipeline.

use std::time::Duration;

use plotline_core::{GeometryError, collab::{CollaboratorError, DocumentKind}};
use thiserror::Error;
use uuid::Uuid;

/// An OCR collaborator could not produce usable data from a document.
///
/// Recoverable for party names (the submission becomes a draft), fatal for
/// survey coordinates.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
  #[error("could not stage {kind} for extraction: {source}")]
  Staging {
    kind:   DocumentKind,
    #[source]
    source: std::io::Error,
  },

  #[error("{kind} extraction failed: {source}")]
  Collaborator {
    kind:   DocumentKind,
    #[source]
    source: CollaboratorError,
  },

  #[error("{kind} extraction timed out after {}s", .after.as_secs())]
  TimedOut { kind: DocumentKind, after: Duration },

  #[error("{kind} extraction returned malformed data: {reason}")]
  Malformed { kind: DocumentKind, reason: String },

  #[error("{kind} extraction returned nothing")]
  Empty { kind: DocumentKind },
}

/// The reverse-geocoding collaborator failed outright.
#[derive(Debug, Error)]
pub enum LocationLookupError {
  #[error("reverse geocoding failed: {0}")]
  Collaborator(#[source] CollaboratorError),

  #[error("reverse geocoding timed out after {}s", .0.as_secs())]
  TimedOut(Duration),
}

/// Why an intake request, status update, or correction was refused.
#[derive(Debug, Error)]
pub enum IntakeError {
  /// A client-correctable field; nothing was persisted.
  #[error("{field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  #[error(transparent)]
  Extraction(#[from] ExtractionFailure),

  #[error(transparent)]
  LocationLookup(#[from] LocationLookupError),

  #[error(transparent)]
  Geometry(#[from] GeometryError),

  #[error("submission not found: {0}")]
  NotFound(Uuid),

  #[error("could not store {kind}: {source}")]
  DocumentStore {
    kind:   DocumentKind,
    #[source]
    source: CollaboratorError,
  },

  #[error("could not create scratch space: {0}")]
  Scratch(#[source] std::io::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntakeError {
  pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Self::Validation { field, message: message.into() }
  }
}

pub type Result<T, E = IntakeError> = std::result::Result<T, E>;
