//! [`SqliteStore`], the SQLite implementation of [`SubmissionStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use plotline_core::{
  store::SubmissionStore,
  submission::{
    NewSubmission, PartyNames, PaymentStatus, RenderStatus, Submission,
    SubmissionStatus,
  },
};

use crate::{
  Error, Result,
  encode::{RawSubmission, SUBMISSION_COLUMNS, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Plotline submission store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load a row, or `None` if the identifier is unknown.
  async fn fetch(&self, id: Uuid) -> Result<Option<Submission>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE submission_id = ?1"
              ),
              rusqlite::params![id_str],
              RawSubmission::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }
}

// ─── SubmissionStore impl ────────────────────────────────────────────────────

impl SubmissionStore for SqliteStore {
  type Error = Error;

  async fn create(&self, input: NewSubmission) -> Result<Submission> {
    let now = Utc::now();
    let submission = Submission {
      submission_id:  Uuid::new_v4(),
      created_at:     now,
      updated_at:     now,
      names:          input.names,
      plot_number:    input.plot_number,
      address:        input.address,
      land_use:       input.land_use,
      contact:        input.contact,
      notes:          input.notes,
      sketch_type:    input.sketch_type,
      geometry:       input.geometry,
      location:       input.location,
      dimensions:     input.dimensions,
      documents:      input.documents,
      status:         input.status,
      render_status:  RenderStatus::default(),
      payment_status: PaymentStatus::default(),
    };

    let id_str         = encode_uuid(submission.submission_id);
    let at_str         = encode_dt(now);
    let owner_name     = submission.names.owner_name.clone();
    let transferred_to = submission.names.transferred_to.clone();
    let plot_number    = submission.plot_number.clone();
    let address        = submission.address.clone();
    let land_use       = submission.land_use.clone();
    let email          = submission.contact.email.clone();
    let mobile         = submission.contact.mobile.clone();
    let agent_email    = submission.contact.agent_email.clone();
    let notes          = submission.notes.clone();
    let sketch_option  = submission.geometry.option().as_str();
    let sketch_type    = submission.sketch_type.as_str();
    let geometry_json  = serde_json::to_string(&submission.geometry)?;
    let country        = submission.location.country.clone();
    let district       = submission.location.district.clone();
    let dimensions     = submission.dimensions.clone();
    let documents_json = serde_json::to_string(&submission.documents)?;
    let status         = submission.status.as_str();
    let render_status  = submission.render_status.as_str();
    let payment_status = submission.payment_status.as_str();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO submissions (
             submission_id, created_at, updated_at, owner_name, transferred_to,
             plot_number, address, land_use, email, mobile, agent_email, notes,
             sketch_option, sketch_type, geometry_json, country, district,
             dimensions, documents_json, status, render_status, payment_status
           ) VALUES (
             ?1, ?2, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
             ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21
           )",
          rusqlite::params![
            id_str,
            at_str,
            owner_name,
            transferred_to,
            plot_number,
            address,
            land_use,
            email,
            mobile,
            agent_email,
            notes,
            sketch_option,
            sketch_type,
            geometry_json,
            country,
            district,
            dimensions,
            documents_json,
            status,
            render_status,
            payment_status,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      submission_id = %submission.submission_id,
      status = %submission.status,
      "submission inserted"
    );
    Ok(submission)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Submission>> {
    self.fetch(id).await
  }

  async fn list(&self) -> Result<Vec<Submission>> {
    let raws: Vec<RawSubmission> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBMISSION_COLUMNS} FROM submissions
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], RawSubmission::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmission::into_submission).collect()
  }

  async fn update_status(
    &self,
    id:     Uuid,
    status: SubmissionStatus,
  ) -> Result<Option<Submission>> {
    let id_str     = encode_uuid(id);
    let at_str     = encode_dt(Utc::now());
    let status_str = status.as_str();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE submissions SET status = ?2, updated_at = ?3
           WHERE submission_id = ?1",
          rusqlite::params![id_str, status_str, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.fetch(id).await?.ok_or(Error::Vanished(id)).map(Some)
  }

  async fn correct_names(
    &self,
    id:    Uuid,
    names: PartyNames,
  ) -> Result<Option<Submission>> {
    let id_str     = encode_uuid(id);
    let at_str     = encode_dt(Utc::now());
    let status_str = SubmissionStatus::New.as_str();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE submissions
           SET owner_name = ?2, transferred_to = ?3, status = ?4, updated_at = ?5
           WHERE submission_id = ?1",
          rusqlite::params![
            id_str,
            names.owner_name,
            names.transferred_to,
            status_str,
            at_str,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.fetch(id).await?.ok_or(Error::Vanished(id)).map(Some)
  }
}
