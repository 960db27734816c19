//! JSON REST API for Plotline.
//!
//! Exposes an axum [`Router`] over an [`Intake`] backed by any
//! [`SubmissionStore`]. Auth, TLS, body limits and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", plotline_api::api_router(intake.clone()))
//! ```

pub mod error;
pub mod extract;
pub mod submissions;
pub mod verify;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use plotline_core::store::SubmissionStore;
use plotline_intake::Intake;

pub use error::ApiError;

/// Build a fully-materialised API router for `intake`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(intake: Arc<Intake<S>>) -> Router<()>
where
  S: SubmissionStore + 'static,
{
  Router::new()
    .route(
      "/submissions",
      get(submissions::list::<S>).post(submissions::create::<S>),
    )
    .route("/submissions/{id}", get(submissions::get_one::<S>))
    .route("/submissions/{id}/status", post(submissions::update_status::<S>))
    .route("/submissions/{id}/fallback", post(submissions::fallback::<S>))
    .route("/extract/extract-transfer-names", post(extract::transfer_names::<S>))
    .route("/verify/{id}", get(verify::verify::<S>))
    .with_state(intake)
}
