//! Error types for `plotline-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown submission status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown render status: {0:?}")]
  UnknownRenderStatus(String),

  #[error("unknown payment status: {0:?}")]
  UnknownPaymentStatus(String),

  #[error("unknown sketch type: {0:?}")]
  UnknownSketchType(String),

  #[error("unknown sketch option: {0:?}")]
  UnknownSketchOption(String),
}

/// Empty or malformed coordinate input handed to a geometry function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
  #[error("no coordinates supplied")]
  Empty,

  #[error("invalid UTM zone: {0:?}")]
  InvalidZone(String),

  #[error("coordinate is not a finite number")]
  NonFinite,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
