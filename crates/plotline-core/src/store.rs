//! The `SubmissionStore` trait.
//!
//! Implemented by storage backends (e.g. `plotline-store-sqlite`). The intake
//! pipeline and the HTTP layer depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::submission::{NewSubmission, PartyNames, Submission, SubmissionStatus};

/// Abstraction over a submission store backend.
///
/// The store is the only shared state between concurrent intake requests.
/// It assigns identifiers at creation and guarantees they are unique; an
/// identifier is never reassigned and submissions are never deleted.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SubmissionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new submission. The store sets `submission_id`, both
  /// timestamps, and the pending render / unpaid payment defaults.
  fn create(
    &self,
    input: NewSubmission,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Retrieve a submission by identifier. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// All submissions, newest first.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// Overwrite the order status. Returns `None` if the identifier is unknown.
  fn update_status(
    &self,
    id: Uuid,
    status: SubmissionStatus,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// Overwrite both party names and set the status to
  /// [`SubmissionStatus::New`], whatever it was before. Geometry, location
  /// and dimensions are left untouched. Returns `None` if the identifier is
  /// unknown.
  fn correct_names(
    &self,
    id: Uuid,
    names: PartyNames,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;
}
