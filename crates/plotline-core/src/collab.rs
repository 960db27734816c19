//! Contracts for the external collaborators the intake pipeline calls.
//!
//! Each collaborator is an object-safe async trait so the pipeline can hold
//! them as `Arc<dyn …>` and tests can swap in fakes. Implementations report
//! failures as an opaque [`CollaboratorError`]; the pipeline decides what a
//! failure means for the submission.

use std::{fmt, path::Path};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{
  plot::{LatLon, UtmPoint},
  submission::StoredDocument,
};

pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

// ─── Documents ───────────────────────────────────────────────────────────────

/// The document slots a submission can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
  LandTransfer,
  IdProof,
  UtmSketch,
}

impl DocumentKind {
  /// Form field name of the slot.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::LandTransfer => "landTransfer",
      Self::IdProof => "idProof",
      Self::UtmSketch => "utmSketch",
    }
  }
}

impl fmt::Display for DocumentKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A document received with an intake request, held in memory.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
  pub file_name: String,
  pub bytes:     Bytes,
}

// ─── OCR ─────────────────────────────────────────────────────────────────────

/// Raw output of the name-extraction collaborator. Either field may be
/// missing or blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedNames {
  #[serde(default)]
  pub owner_name:     Option<String>,
  #[serde(default)]
  pub transferred_to: Option<String>,
}

/// Reads the previous owner and the transferee off a land-transfer document.
#[async_trait]
pub trait NameExtractor: Send + Sync {
  /// `artifact` is a temporary copy of the document that lives at least as
  /// long as the call.
  async fn extract_names(
    &self,
    artifact: &Path,
  ) -> Result<ExtractedNames, CollaboratorError>;
}

/// Reads the ordered corner coordinates off a scanned survey sketch.
#[async_trait]
pub trait UtmExtractor: Send + Sync {
  async fn extract_utm(
    &self,
    artifact: &Path,
  ) -> Result<Vec<UtmPoint>, CollaboratorError>;
}

// ─── Geocoding ───────────────────────────────────────────────────────────────

/// One component of a reverse-geocoded address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
  pub long_name: String,
  #[serde(default)]
  pub types:     Vec<String>,
}

impl AddressComponent {
  pub fn has_type(&self, ty: &str) -> bool {
    self.types.iter().any(|t| t == ty)
  }
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
  /// Address components for the most relevant result at `point`; an empty
  /// list when nothing is known about the location.
  async fn reverse_geocode(
    &self,
    point: LatLon,
  ) -> Result<Vec<AddressComponent>, CollaboratorError>;
}

// ─── Storage ─────────────────────────────────────────────────────────────────

/// Durable blob storage for uploaded documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
  /// Store `document` and return a retrievable URL for it. Called once per
  /// uploaded document.
  async fn put(
    &self,
    kind: DocumentKind,
    document: &UploadedDocument,
  ) -> Result<StoredDocument, CollaboratorError>;
}
