//! Archival sink implementations.
//!
//! The archival sink mirrors each mutated sujet to an external spreadsheet
//! for audit/history purposes. Delivery is strictly best-effort: callers
//! treat a failure as a partial success and never retry here.

use std::time::Duration;

use sujet_core::archive::{ArchivalSink, ArchiveError, ArchiveRecord};

// ─── Webhook sink ────────────────────────────────────────────────────────────

/// Delivers records as JSON to an append-row webhook (e.g. a spreadsheet
/// automation endpoint).
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct WebhookSink {
  client: reqwest::Client,
  url:    String,
}

impl WebhookSink {
  /// The sink must never stall a user-facing mutation for long.
  const TIMEOUT: Duration = Duration::from_secs(10);

  pub fn new(url: impl Into<String>) -> Result<Self, ArchiveError> {
    let client = reqwest::Client::builder()
      .timeout(Self::TIMEOUT)
      .build()
      .map_err(|e| ArchiveError(format!("failed to build HTTP client: {e}")))?;
    Ok(Self { client, url: url.into() })
  }
}

impl ArchivalSink for WebhookSink {
  async fn archive(&self, record: ArchiveRecord) -> Result<(), ArchiveError> {
    let id = record.id;
    let response = self
      .client
      .post(&self.url)
      .json(&record)
      .send()
      .await
      .map_err(|e| ArchiveError(format!("archive endpoint unreachable: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      return Err(ArchiveError(format!("archive endpoint returned {status}")));
    }

    tracing::debug!(sujet_id = id, "archived sujet");
    Ok(())
  }
}

// ─── Disabled sink ───────────────────────────────────────────────────────────

/// Used when no archive endpoint is configured. Reports success so an
/// unconfigured deployment is not perpetually "partially failing".
#[derive(Clone, Copy)]
pub struct NullSink;

impl ArchivalSink for NullSink {
  async fn archive(&self, record: ArchiveRecord) -> Result<(), ArchiveError> {
    tracing::debug!(sujet_id = record.id, "archival disabled; dropping record");
    Ok(())
  }
}
