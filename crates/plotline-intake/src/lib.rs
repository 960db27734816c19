//! Submission intake for Plotline.
//!
//! Turns a raw intake request into a persisted [`Submission`] by way of the
//! state machine in [`intake`]. The external collaborators it needs (OCR,
//! reverse geocoding, document storage) are reached through the traits in
//! [`plotline_core::collab`]; concrete implementations live in [`ocr`],
//! [`geocode`] and [`docstore`].
//!
//! [`Submission`]: plotline_core::submission::Submission

pub mod docstore;
pub mod error;
pub mod extraction;
pub mod geocode;
pub mod intake;
pub mod location;
pub mod ocr;
pub mod request;

pub use error::{ExtractionFailure, IntakeError, LocationLookupError, Result};
pub use intake::{Intake, IntakeOutcome, IntakeState};
pub use request::IntakeRequest;
