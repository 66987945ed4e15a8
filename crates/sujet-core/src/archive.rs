//! The archival sink — an external, append-only copy of mutated sujets.
//!
//! Archival is strictly best-effort: a sink failure never blocks, aborts,
//! or reorders the local mutation it mirrors. Callers surface failures as a
//! partial-success indicator and move on; there are no retries.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::sujet::{Status, Sujet};

/// The flat record handed to the sink: every sujet field plus the moment it
/// was logged. `status` may differ from the row's persisted status — a
/// delete archives the final snapshot with [`Status::Deleted`].
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveRecord {
  pub id:            i64,
  pub original_text: String,
  pub ai_suggestion: String,
  pub user_notes:    String,
  pub user_tags:     String,
  pub status:        Status,
  pub person:        String,
  pub view_count:    i64,
  pub date_created:  Option<NaiveDate>,
  pub logged_at:     DateTime<Utc>,
}

impl ArchiveRecord {
  /// Build a record from a snapshot, overriding the archived status.
  pub fn from_sujet(sujet: &Sujet, status: Status) -> Self {
    Self {
      id:            sujet.id,
      original_text: sujet.original_text.clone(),
      ai_suggestion: sujet.ai_suggestion.clone(),
      user_notes:    sujet.user_notes.clone(),
      user_tags:     sujet.user_tags.clone(),
      status,
      person:        sujet.person.clone(),
      view_count:    sujet.view_count,
      date_created:  sujet.date_created,
      logged_at:     Utc::now(),
    }
  }
}

/// The sink rejected the record or was unreachable. Carries a message the
/// caller can relay; never fatal to the local operation.
#[derive(Debug, Clone, Error)]
#[error("archival failed: {0}")]
pub struct ArchiveError(pub String);

/// A destination for archive records (e.g. a spreadsheet webhook).
pub trait ArchivalSink: Send + Sync {
  fn archive(
    &self,
    record: ArchiveRecord,
  ) -> impl Future<Output = Result<(), ArchiveError>> + Send + '_;
}
