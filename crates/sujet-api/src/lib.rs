//! JSON REST API for the sujet curation service.
//!
//! Exposes an axum [`Router`] backed by any [`SujetStore`] plus an
//! [`ArchivalSink`]. Transport, TLS, and auth concerns are the caller's
//! responsibility.
//!
//! The response contract: fetch-style endpoints answer with either
//! `{"status":"ok","sujet":{...}}` or the `{"status":"no_more_sujets"}`
//! sentinel (which is not an error); mutations answer with
//! `success`/`partial_success`/`error` envelopes.

pub mod browse;
pub mod error;
pub mod meta;
pub mod sujets;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use sujet_core::{archive::ArchivalSink, store::SujetStore, sujet::Sujet};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SUJET_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:        String,
  #[serde(default = "default_port")]
  pub port:        u16,
  #[serde(default = "default_db_path")]
  pub db_path:     PathBuf,
  /// Append-row webhook for the archival sink; archival is disabled when
  /// unset.
  #[serde(default)]
  pub archive_url: Option<String>,
}

fn default_host() -> String {
  "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
  5870
}

fn default_db_path() -> PathBuf {
  PathBuf::from("sujets.db")
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, A> {
  pub store: Arc<S>,
  pub sink:  Arc<A>,
}

impl<S, A> Clone for AppState<S, A> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), sink: Arc::clone(&self.sink) }
  }
}

// ─── Shared payloads ─────────────────────────────────────────────────────────

/// Envelope for fetch-style operations: either a full snapshot or the
/// "nothing matched" sentinel.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchResponse {
  Ok { sujet: Sujet },
  NoMoreSujets,
}

impl From<Option<Sujet>> for FetchResponse {
  fn from(sujet: Option<Sujet>) -> Self {
    match sujet {
      Some(sujet) => FetchResponse::Ok { sujet },
      None => FetchResponse::NoMoreSujets,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
pub fn router<S, A>(state: AppState<S, A>) -> Router
where
  S: SujetStore + 'static,
  A: ArchivalSink + 'static,
{
  Router::new()
    // Single records
    .route("/sujets", post(sujets::create::<S, A>))
    .route(
      "/sujets/{id}",
      get(sujets::get_one::<S, A>).delete(sujets::delete::<S, A>),
    )
    .route("/sujets/{id}/title", put(sujets::update_title::<S, A>))
    .route("/sujets/{id}/save", post(sujets::save::<S, A>))
    .route("/sujets/{id}/skip", post(sujets::skip::<S, A>))
    // Navigation
    .route("/sujets/at", get(browse::at_offset::<S, A>))
    .route("/sujets/count", get(browse::count::<S, A>))
    .route("/sujets/first", get(browse::first::<S, A>))
    .route("/sujets/last", get(browse::last::<S, A>))
    .route("/sujets/random", get(browse::random::<S, A>))
    .route("/sujets/{id}/adjacent", get(browse::adjacent::<S, A>))
    // Vocabulary
    .route("/tags", get(meta::tags::<S, A>))
    .route("/people", get(meta::people::<S, A>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{Arc, Mutex};

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use sujet_core::archive::{ArchiveError, ArchiveRecord};
  use sujet_core::sujet::Status;
  use sujet_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  /// Captures every record it receives; optionally fails afterwards to
  /// exercise the partial-success path.
  #[derive(Clone)]
  struct RecordingSink {
    records: Arc<Mutex<Vec<ArchiveRecord>>>,
    fail:    bool,
  }

  impl RecordingSink {
    fn new(fail: bool) -> Self {
      Self { records: Arc::new(Mutex::new(Vec::new())), fail }
    }

    fn recorded(&self) -> Vec<ArchiveRecord> {
      self.records.lock().unwrap().clone()
    }
  }

  impl ArchivalSink for RecordingSink {
    async fn archive(&self, record: ArchiveRecord) -> Result<(), ArchiveError> {
      self.records.lock().unwrap().push(record);
      if self.fail {
        Err(ArchiveError("sheet rejected the row".into()))
      } else {
        Ok(())
      }
    }
  }

  async fn make_state(
    fail_archival: bool,
  ) -> (AppState<SqliteStore, RecordingSink>, RecordingSink) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let sink = RecordingSink::new(fail_archival);
    let state =
      AppState { store: Arc::new(store), sink: Arc::new(sink.clone()) };
    (state, sink)
  }

  async fn request(
    state: &AppState<SqliteStore, RecordingSink>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    // Extractor rejections answer in plain text; everything of ours is JSON.
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
  }

  async fn create_titled(
    state: &AppState<SqliteStore, RecordingSink>,
    title: &str,
  ) -> i64 {
    let (status, body) =
      request(state, "POST", "/sujets", Some(json!({ "title": title }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["sujet"]["id"].as_i64().unwrap()
  }

  async fn save_tags(
    state: &AppState<SqliteStore, RecordingSink>,
    id: i64,
    tags: &str,
    person: &str,
  ) {
    let (status, _) = request(
      state,
      "POST",
      &format!("/sujets/{id}/save"),
      Some(json!({ "notes": "", "tags": tags, "person": person })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  // ── Create ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_201_with_canonical_snapshot() {
    let (state, _) = make_state(false).await;

    let (status, body) = request(
      &state,
      "POST",
      "/sujets",
      Some(json!({ "title": "buy milk" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    let id = body["sujet"]["id"].as_i64().unwrap();
    assert_eq!(body["sujet"]["original_text"], format!("ID: {id} - buy milk"));
    assert_eq!(body["sujet"]["status"], "new");
    assert_eq!(body["sujet"]["view_count"], 1);
    assert!(body["sujet"]["date_created"].is_string());
  }

  #[tokio::test]
  async fn create_with_blank_title_is_rejected() {
    let (state, _) = make_state(false).await;

    let (status, body) =
      request(&state, "POST", "/sujets", Some(json!({ "title": "   " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
  }

  // ── Fetch for display ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_one_counts_a_view() {
    let (state, _) = make_state(false).await;
    let id = create_titled(&state, "watched").await;

    let (status, body) =
      request(&state, "GET", &format!("/sujets/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sujet"]["view_count"], 2);
  }

  #[tokio::test]
  async fn get_one_missing_is_404() {
    let (state, _) = make_state(false).await;
    let (status, body) = request(&state, "GET", "/sujets/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
  }

  // ── Title ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_title_rewrites_the_body() {
    let (state, _) = make_state(false).await;
    let id = create_titled(&state, "old").await;

    let (status, body) = request(
      &state,
      "PUT",
      &format!("/sujets/{id}/title"),
      Some(json!({ "title": "renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sujet"]["original_text"], format!("ID: {id} - renamed"));

    let (status, _) = request(
      &state,
      "PUT",
      &format!("/sujets/{id}/title"),
      Some(json!({ "title": " " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
      &state,
      "PUT",
      "/sujets/999/title",
      Some(json!({ "title": "ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Save / skip and archival ───────────────────────────────────────────────

  #[tokio::test]
  async fn save_enriches_and_archives_the_snapshot() {
    let (state, sink) = make_state(false).await;
    let id = create_titled(&state, "raw").await;

    let (status, body) = request(
      &state,
      "POST",
      &format!("/sujets/{id}/save"),
      Some(json!({ "notes": "context", "tags": "AI", "person": "S" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let records = sink.recorded();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].status, Status::Enriched);
    assert_eq!(records[0].user_tags, "AI");

    let (_, body) = request(&state, "GET", &format!("/sujets/{id}"), None).await;
    assert_eq!(body["sujet"]["status"], "enriched");
    assert_eq!(body["sujet"]["person"], "S");
  }

  #[tokio::test]
  async fn archival_failure_downgrades_to_partial_success() {
    let (state, _) = make_state(true).await;
    let id = create_titled(&state, "flaky sheet").await;

    let (status, body) = request(
      &state,
      "POST",
      &format!("/sujets/{id}/save"),
      Some(json!({ "notes": "", "tags": "AI", "person": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(body["status"], "partial_success");

    // The local mutation stands regardless.
    let (_, body) = request(&state, "GET", &format!("/sujets/{id}"), None).await;
    assert_eq!(body["sujet"]["status"], "enriched");
  }

  #[tokio::test]
  async fn skip_changes_only_the_status() {
    let (state, sink) = make_state(false).await;
    let id = create_titled(&state, "later").await;
    save_tags(&state, id, "AI", "S").await;

    let (status, body) =
      request(&state, "POST", &format!("/sujets/{id}/skip"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    assert_eq!(sink.recorded().last().unwrap().status, Status::Skipped);

    let (_, body) = request(&state, "GET", &format!("/sujets/{id}"), None).await;
    assert_eq!(body["sujet"]["status"], "skipped");
    assert_eq!(body["sujet"]["user_tags"], "AI");
  }

  #[tokio::test]
  async fn skip_missing_is_404() {
    let (state, sink) = make_state(false).await;
    let (status, _) = request(&state, "POST", "/sujets/999/skip", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(sink.recorded().is_empty());
  }

  // ── Delete ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_removes_locally_and_archives_as_deleted() {
    let (state, sink) = make_state(false).await;
    let id = create_titled(&state, "doomed").await;

    let (status, body) =
      request(&state, "DELETE", &format!("/sujets/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let records = sink.recorded();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, Status::Deleted);

    let (status, _) = request(&state, "GET", &format!("/sujets/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_is_not_blocked_by_a_failing_sink() {
    let (state, _) = make_state(true).await;
    let id = create_titled(&state, "going anyway").await;

    let (status, body) =
      request(&state, "DELETE", &format!("/sujets/{id}"), None).await;
    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(body["status"], "partial_success");

    let (status, _) = request(&state, "GET", &format!("/sujets/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_missing_is_404() {
    let (state, sink) = make_state(false).await;
    let (status, _) = request(&state, "DELETE", "/sujets/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(sink.recorded().is_empty());
  }

  // ── Browsing ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn empty_store_answers_with_the_sentinel() {
    let (state, _) = make_state(false).await;

    for uri in ["/sujets/first", "/sujets/last", "/sujets/random", "/sujets/at?offset=3"] {
      let (status, body) = request(&state, "GET", uri, None).await;
      assert_eq!(status, StatusCode::OK, "{uri}");
      assert_eq!(body["status"], "no_more_sujets", "{uri}");
    }
  }

  #[tokio::test]
  async fn filtered_browse_walkthrough() {
    let (state, _) = make_state(false).await;
    create_titled(&state, "buy milk").await;
    let talk = create_titled(&state, "AI ethics talk").await;
    let photos = create_titled(&state, "vacation photos").await;
    save_tags(&state, talk, "AI", "").await;
    save_tags(&state, photos, "Travel", "").await;

    let (_, body) = request(&state, "GET", "/tags", None).await;
    assert_eq!(body["tags"], json!(["AI", "Travel"]));

    let (_, body) =
      request(&state, "GET", "/sujets/first?tags=AI", None).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sujet"]["id"].as_i64().unwrap(), talk);

    let (_, body) = request(
      &state,
      "GET",
      &format!("/sujets/{talk}/adjacent?direction=next&tags=AI"),
      None,
    )
    .await;
    assert_eq!(body["status"], "no_more_sujets");

    let (_, body) =
      request(&state, "GET", "/sujets/count?tags=AI,Travel", None).await;
    assert_eq!(body["count"], 2);

    let (_, body) = request(&state, "GET", "/sujets/count", None).await;
    assert_eq!(body["count"], 3);
  }

  #[tokio::test]
  async fn at_offset_and_order_parameters_drive_the_walk() {
    let (state, _) = make_state(false).await;
    let a = create_titled(&state, "a").await;
    let b = create_titled(&state, "b").await;
    let c = create_titled(&state, "c").await;

    let (_, body) = request(&state, "GET", "/sujets/at?offset=1", None).await;
    assert_eq!(body["sujet"]["id"].as_i64().unwrap(), b);

    let (_, body) =
      request(&state, "GET", "/sujets/at?offset=0&order=desc", None).await;
    assert_eq!(body["sujet"]["id"].as_i64().unwrap(), c);

    let (_, body) =
      request(&state, "GET", "/sujets/at?sort_by=random", None).await;
    assert_eq!(body["status"], "ok");
    assert!(
      [a, b, c].contains(&body["sujet"]["id"].as_i64().unwrap())
    );
  }

  #[tokio::test]
  async fn adjacent_walks_both_directions() {
    let (state, _) = make_state(false).await;
    let a = create_titled(&state, "a").await;
    let b = create_titled(&state, "b").await;
    let c = create_titled(&state, "c").await;

    let (_, body) = request(
      &state,
      "GET",
      &format!("/sujets/{b}/adjacent?direction=next"),
      None,
    )
    .await;
    assert_eq!(body["sujet"]["id"].as_i64().unwrap(), c);

    let (_, body) = request(
      &state,
      "GET",
      &format!("/sujets/{b}/adjacent?direction=prev"),
      None,
    )
    .await;
    assert_eq!(body["sujet"]["id"].as_i64().unwrap(), a);

    let (_, body) = request(
      &state,
      "GET",
      &format!("/sujets/{a}/adjacent?direction=prev"),
      None,
    )
    .await;
    assert_eq!(body["status"], "no_more_sujets");
  }

  #[tokio::test]
  async fn adjacent_with_missing_reference_is_404() {
    let (state, _) = make_state(false).await;
    let (status, body) =
      request(&state, "GET", "/sujets/999/adjacent?direction=next", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
  }

  #[tokio::test]
  async fn unparseable_direction_is_rejected_before_storage() {
    let (state, _) = make_state(false).await;
    let id = create_titled(&state, "here").await;

    let (status, _) = request(
      &state,
      "GET",
      &format!("/sujets/{id}/adjacent?direction=sideways"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn people_vocabulary_is_distinct_and_sorted() {
    let (state, _) = make_state(false).await;
    let a = create_titled(&state, "a").await;
    let b = create_titled(&state, "b").await;
    let c = create_titled(&state, "c").await;
    save_tags(&state, a, "", "Marie").await;
    save_tags(&state, b, "", "Alex").await;
    save_tags(&state, c, "", "Marie").await;

    let (_, body) = request(&state, "GET", "/people", None).await;
    assert_eq!(body["people"], json!(["Alex", "Marie"]));
  }
}
