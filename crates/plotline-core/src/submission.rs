//! Submission, the aggregate root of the intake pipeline.
//!
//! A submission owns its geometry, resolved location and document records
//! outright; none of them has an identity of its own.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, plot::PlotGeometry};

// ─── Lifecycle enums ─────────────────────────────────────────────────────────

/// Order status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
  /// Persisted with party names still missing.
  #[serde(rename = "draft")]
  Draft,
  #[serde(rename = "New")]
  New,
  #[serde(rename = "In Progress")]
  InProgress,
  #[serde(rename = "Delivered")]
  Delivered,
}

impl SubmissionStatus {
  /// The stored and wire representation; matches the serde names above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Draft => "draft",
      Self::New => "New",
      Self::InProgress => "In Progress",
      Self::Delivered => "Delivered",
    }
  }
}

impl FromStr for SubmissionStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "draft" => Ok(Self::Draft),
      "New" => Ok(Self::New),
      "In Progress" => Ok(Self::InProgress),
      "Delivered" => Ok(Self::Delivered),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

impl fmt::Display for SubmissionStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Progress of the downstream sketch renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
  #[default]
  Pending,
  InProgress,
  Completed,
}

impl RenderStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::InProgress => "in_progress",
      Self::Completed => "completed",
    }
  }
}

impl FromStr for RenderStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(Self::Pending),
      "in_progress" => Ok(Self::InProgress),
      "completed" => Ok(Self::Completed),
      other => Err(Error::UnknownRenderStatus(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  #[default]
  Unpaid,
  Paid,
}

impl PaymentStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Unpaid => "unpaid",
      Self::Paid => "paid",
    }
  }
}

impl FromStr for PaymentStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "unpaid" => Ok(Self::Unpaid),
      "paid" => Ok(Self::Paid),
      other => Err(Error::UnknownPaymentStatus(other.to_owned())),
    }
  }
}

/// Which sketch pages the customer ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SketchType {
  #[serde(rename = "Static Only")]
  StaticOnly,
  #[serde(rename = "Satellite Only")]
  SatelliteOnly,
  #[serde(rename = "Both")]
  Both,
}

impl SketchType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::StaticOnly => "Static Only",
      Self::SatelliteOnly => "Satellite Only",
      Self::Both => "Both",
    }
  }
}

impl FromStr for SketchType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Static Only" => Ok(Self::StaticOnly),
      "Satellite Only" => Ok(Self::SatelliteOnly),
      "Both" => Ok(Self::Both),
      other => Err(Error::UnknownSketchType(other.to_owned())),
    }
  }
}

// ─── Owned records ───────────────────────────────────────────────────────────

/// Administrative location of the plot. Empty strings mean "unresolved".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLocation {
  pub country:  String,
  pub district: String,
}

/// Previous and new holder of the plot, as read from the transfer document
/// or typed in by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyNames {
  pub owner_name:     String,
  pub transferred_to: String,
}

impl PartyNames {
  pub fn is_complete(&self) -> bool {
    !self.owner_name.is_empty() && !self.transferred_to.is_empty()
  }
}

/// A document that has been handed to the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
  /// Original file name as uploaded.
  pub name: String,
  /// Durable retrieval URL.
  pub url:  String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDocuments {
  pub land_transfer: StoredDocument,
  pub id_proof:      StoredDocument,
  /// Present for sketch option C only.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub utm_sketch:    Option<StoredDocument>,
}

/// How to reach the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
  pub email:       String,
  pub mobile:      String,
  pub agent_email: Option<String>,
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// A persisted plot submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  /// Assigned by the store at creation; never changes.
  #[serde(rename = "submission_id")]
  pub submission_id:  Uuid,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
  #[serde(flatten)]
  pub names:          PartyNames,
  pub plot_number:    Option<String>,
  pub address:        String,
  pub land_use:       String,
  #[serde(flatten)]
  pub contact:        ContactDetails,
  pub notes:          Option<String>,
  pub sketch_type:    SketchType,
  #[serde(rename = "coordinates")]
  pub geometry:       PlotGeometry,
  #[serde(flatten)]
  pub location:       ResolvedLocation,
  /// `"<A>m x <B>m"`.
  pub dimensions:     String,
  pub documents:      SubmissionDocuments,
  pub status:         SubmissionStatus,
  pub render_status:  RenderStatus,
  pub payment_status: PaymentStatus,
}

/// Input to [`crate::store::SubmissionStore::create`].
/// Identifier and timestamps are always set by the store.
#[derive(Debug, Clone)]
pub struct NewSubmission {
  pub names:       PartyNames,
  pub plot_number: Option<String>,
  pub address:     String,
  pub land_use:    String,
  pub contact:     ContactDetails,
  pub notes:       Option<String>,
  pub sketch_type: SketchType,
  pub geometry:    PlotGeometry,
  pub location:    ResolvedLocation,
  pub dimensions:  String,
  pub documents:   SubmissionDocuments,
  pub status:      SubmissionStatus,
}

// ─── Verification ────────────────────────────────────────────────────────────

/// What a scanned sketch QR code reports about the submission behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
  /// Delivered with a finished render.
  #[serde(rename = "Authentic")]
  Authentic,
  /// Delivered, but the render has since been reopened or never finished.
  #[serde(rename = "Previously Edited")]
  PreviouslyEdited,
  #[serde(rename = "Invalid")]
  Invalid,
}

impl VerificationStatus {
  pub fn of(status: SubmissionStatus, render: RenderStatus) -> Self {
    match (status, render) {
      (SubmissionStatus::Delivered, RenderStatus::Completed) => Self::Authentic,
      (SubmissionStatus::Delivered, _) => Self::PreviouslyEdited,
      _ => Self::Invalid,
    }
  }
}

/// Public summary returned to whoever scans a delivered sketch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
  #[serde(rename = "submission_id")]
  pub submission_id:       Uuid,
  /// The owner named on the transfer document.
  pub client:              String,
  pub created_at:          DateTime<Utc>,
  pub coordinates:         PlotGeometry,
  pub verification_status: VerificationStatus,
}

impl From<&Submission> for Verification {
  fn from(s: &Submission) -> Self {
    Self {
      submission_id:       s.submission_id,
      client:              s.names.owner_name.clone(),
      created_at:          s.created_at,
      coordinates:         s.geometry.clone(),
      verification_status: VerificationStatus::of(s.status, s.render_status),
    }
  }
}
