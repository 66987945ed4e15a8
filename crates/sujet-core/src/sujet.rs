//! Sujet — a short personal note being curated.
//!
//! The body is stored in a canonical `"ID: <n> - <title>"` form so the id
//! survives round trips through external tools that only see the text.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Lifecycle marker for a sujet. Any write path may set any value; no
/// transition graph is enforced. `Deleted` never persists as a row state —
/// it appears only on archive records emitted while a row is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
  NeedsEnrichment,
  Enriched,
  Skipped,
  Deleted,
  New,
}

/// An immutable snapshot of one stored sujet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sujet {
  pub id:            i64,
  pub original_text: String,
  pub ai_suggestion: String,
  pub user_notes:    String,
  pub user_tags:     String,
  pub person:        String,
  pub status:        Status,
  pub view_count:    i64,
  pub date_created:  Option<NaiveDate>,
}

/// Input for single-record creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSujet {
  pub title:         String,
  #[serde(default)]
  pub ai_suggestion: String,
  #[serde(default)]
  pub user_notes:    String,
}

impl NewSujet {
  /// Presence check only; whitespace-only titles are rejected.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::InvalidInput("title must not be empty".into()));
    }
    Ok(())
  }
}

/// User-authored fields written together with the `enriched` transition.
#[derive(Debug, Clone, Deserialize)]
pub struct Enrichment {
  #[serde(default)]
  pub notes:  String,
  #[serde(default)]
  pub tags:   String,
  #[serde(default)]
  pub person: String,
}

/// One record of a bulk ingest batch.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportSujet {
  pub original_text: String,
  #[serde(default)]
  pub ai_suggestion: String,
}

/// Outcome of a bulk ingest: rows whose `original_text` already existed
/// verbatim are skipped, everything else is added.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ImportSummary {
  pub added:   usize,
  pub skipped: usize,
}

// ─── Canonical text form ─────────────────────────────────────────────────────

/// Render the canonical body for a sujet: `"ID: <id> - <title>"`.
pub fn compose_text(id: i64, title: &str) -> String {
  format!("ID: {id} - {}", title.trim())
}

/// Strip a leading `"ID: <n> - "` prefix from a title, if present.
///
/// Title edits sometimes arrive with the displayed prefix still attached;
/// the stored form must carry exactly one prefix.
pub fn strip_id_prefix(title: &str) -> &str {
  let trimmed = title.trim();
  let Some(rest) = trimmed.strip_prefix("ID:") else {
    return trimmed;
  };
  let rest = rest.trim_start();
  let digits = rest.chars().take_while(char::is_ascii_digit).count();
  if digits == 0 {
    return trimmed;
  }
  match rest[digits..].trim_start().strip_prefix('-') {
    Some(tail) => tail.trim_start(),
    None => trimmed,
  }
}

/// Split a comma-separated value list into trimmed, non-empty tokens.
pub fn split_csv(value: &str) -> Vec<String> {
  value
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}
