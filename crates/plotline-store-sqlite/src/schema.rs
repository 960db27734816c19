//! SQL schema for the Plotline SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Rows are inserted once and updated in place; never deleted.
CREATE TABLE IF NOT EXISTS submissions (
    submission_id  TEXT PRIMARY KEY,
    created_at     TEXT NOT NULL,   -- RFC 3339 UTC; store-assigned
    updated_at     TEXT NOT NULL,
    owner_name     TEXT NOT NULL DEFAULT '',
    transferred_to TEXT NOT NULL DEFAULT '',
    plot_number    TEXT,
    address        TEXT NOT NULL,
    land_use       TEXT NOT NULL,
    email          TEXT NOT NULL,
    mobile         TEXT NOT NULL,
    agent_email    TEXT,
    notes          TEXT,
    sketch_option  TEXT NOT NULL,   -- 'A' | 'B' | 'C'; mirrors geometry_json
    sketch_type    TEXT NOT NULL,   -- 'Static Only' | 'Satellite Only' | 'Both'
    geometry_json  TEXT NOT NULL,   -- JSON-encoded PlotGeometry
    country        TEXT NOT NULL DEFAULT '',
    district       TEXT NOT NULL DEFAULT '',
    dimensions     TEXT NOT NULL DEFAULT '',
    documents_json TEXT NOT NULL,   -- JSON-encoded SubmissionDocuments
    status         TEXT NOT NULL,   -- 'draft' | 'New' | 'In Progress' | 'Delivered'
    render_status  TEXT NOT NULL DEFAULT 'pending',
    payment_status TEXT NOT NULL DEFAULT 'unpaid'
);

CREATE INDEX IF NOT EXISTS submissions_created_idx ON submissions(created_at);
CREATE INDEX IF NOT EXISTS submissions_status_idx  ON submissions(status);

PRAGMA user_version = 1;
";
