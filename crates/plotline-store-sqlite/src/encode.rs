//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings. Geometry and documents are compact JSON.
//! Enumerations use their wire strings. UUIDs are hyphenated lowercase.

use chrono::{DateTime, Utc};
use plotline_core::submission::{
  ContactDetails, PartyNames, ResolvedLocation, Submission,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` that feeds [`RawSubmission::from_row`].
pub const SUBMISSION_COLUMNS: &str = "
  submission_id, created_at, updated_at, owner_name, transferred_to,
  plot_number, address, land_use, email, mobile, agent_email, notes,
  sketch_type, geometry_json, country, district, dimensions,
  documents_json, status, render_status, payment_status";

/// A `submissions` row exactly as stored.
pub struct RawSubmission {
  pub submission_id:  String,
  pub created_at:     String,
  pub updated_at:     String,
  pub owner_name:     String,
  pub transferred_to: String,
  pub plot_number:    Option<String>,
  pub address:        String,
  pub land_use:       String,
  pub email:          String,
  pub mobile:         String,
  pub agent_email:    Option<String>,
  pub notes:          Option<String>,
  pub sketch_type:    String,
  pub geometry_json:  String,
  pub country:        String,
  pub district:       String,
  pub dimensions:     String,
  pub documents_json: String,
  pub status:         String,
  pub render_status:  String,
  pub payment_status: String,
}

impl RawSubmission {
  /// Read a row selected with [`SUBMISSION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      submission_id:  row.get(0)?,
      created_at:     row.get(1)?,
      updated_at:     row.get(2)?,
      owner_name:     row.get(3)?,
      transferred_to: row.get(4)?,
      plot_number:    row.get(5)?,
      address:        row.get(6)?,
      land_use:       row.get(7)?,
      email:          row.get(8)?,
      mobile:         row.get(9)?,
      agent_email:    row.get(10)?,
      notes:          row.get(11)?,
      sketch_type:    row.get(12)?,
      geometry_json:  row.get(13)?,
      country:        row.get(14)?,
      district:       row.get(15)?,
      dimensions:     row.get(16)?,
      documents_json: row.get(17)?,
      status:         row.get(18)?,
      render_status:  row.get(19)?,
      payment_status: row.get(20)?,
    })
  }

  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      submission_id:  decode_uuid(&self.submission_id)?,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
      names:          PartyNames {
        owner_name:     self.owner_name,
        transferred_to: self.transferred_to,
      },
      plot_number:    self.plot_number,
      address:        self.address,
      land_use:       self.land_use,
      contact:        ContactDetails {
        email:       self.email,
        mobile:      self.mobile,
        agent_email: self.agent_email,
      },
      notes:          self.notes,
      sketch_type:    self.sketch_type.parse()?,
      geometry:       serde_json::from_str(&self.geometry_json)?,
      location:       ResolvedLocation {
        country:  self.country,
        district: self.district,
      },
      dimensions:     self.dimensions,
      documents:      serde_json::from_str(&self.documents_json)?,
      status:         self.status.parse()?,
      render_status:  self.render_status.parse()?,
      payment_status: self.payment_status.parse()?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn datetime_round_trips_through_rfc3339() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }

  #[test]
  fn bad_datetime_is_a_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
