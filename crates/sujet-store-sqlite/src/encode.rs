//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` strings so lexicographic column order
//! equals chronological order; statuses as their snake_case names.

use chrono::NaiveDate;
use sujet_core::sujet::{Status, Sujet};

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn encode_status(s: Status) -> &'static str {
  match s {
    Status::NeedsEnrichment => "needs_enrichment",
    Status::Enriched => "enriched",
    Status::Skipped => "skipped",
    Status::Deleted => "deleted",
    Status::New => "new",
  }
}

pub fn decode_status(s: &str) -> Result<Status> {
  match s {
    "needs_enrichment" => Ok(Status::NeedsEnrichment),
    "enriched" => Ok(Status::Enriched),
    "skipped" => Ok(Status::Skipped),
    "deleted" => Ok(Status::Deleted),
    "new" => Ok(Status::New),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── Date ────────────────────────────────────────────────────────────────────

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String {
  d.format(DATE_FORMAT).to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `sujets` row, in the column order of
/// [`query::SUJET_COLUMNS`](crate::query::SUJET_COLUMNS).
pub struct RawSujet {
  pub id:            i64,
  pub original_text: String,
  pub ai_suggestion: String,
  pub user_notes:    String,
  pub user_tags:     String,
  pub person:        String,
  pub status:        String,
  pub view_count:    i64,
  pub date_created:  Option<String>,
}

impl RawSujet {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      original_text: row.get(1)?,
      ai_suggestion: row.get(2)?,
      user_notes:    row.get(3)?,
      user_tags:     row.get(4)?,
      person:        row.get(5)?,
      status:        row.get(6)?,
      view_count:    row.get(7)?,
      date_created:  row.get(8)?,
    })
  }

  pub fn into_sujet(self) -> Result<Sujet> {
    Ok(Sujet {
      id:            self.id,
      original_text: self.original_text,
      ai_suggestion: self.ai_suggestion,
      user_notes:    self.user_notes,
      user_tags:     self.user_tags,
      person:        self.person,
      status:        decode_status(&self.status)?,
      view_count:    self.view_count,
      date_created:  self
        .date_created
        .as_deref()
        .map(decode_date)
        .transpose()?,
    })
  }
}
