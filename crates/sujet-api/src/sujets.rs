//! Handlers for single-sujet endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/sujets` | Body: [`NewSujet`]; 400 on blank title |
//! | `GET`    | `/sujets/:id` | Fetch for display — counts as a view |
//! | `PUT`    | `/sujets/:id/title` | Body: `{"title":"..."}` |
//! | `POST`   | `/sujets/:id/save` | Body: [`Enrichment`]; archives after the local write |
//! | `POST`   | `/sujets/:id/skip` | Archives after the local write |
//! | `DELETE` | `/sujets/:id` | Deletes locally, then archives with status `deleted` |
//!
//! Archival is best-effort: a sink failure downgrades the response to
//! `partial_success` (207) but never rolls back or blocks the local write.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use sujet_core::{
  archive::{ArchivalSink, ArchiveRecord},
  store::SujetStore,
  sujet::{Enrichment, NewSujet, Status, Sujet},
};

use crate::{AppState, FetchResponse, error::ApiError};

// ─── Response payloads ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SujetSaved {
  status: &'static str,
  sujet:  Sujet,
}

#[derive(Debug, Serialize)]
struct Ack {
  status:  &'static str,
  message: String,
}

/// 200 on full success, 207 when only archival failed.
fn ack(archive_failure: Option<String>, success_message: &str) -> Response {
  match archive_failure {
    None => (
      StatusCode::OK,
      Json(Ack { status: "success", message: success_message.to_owned() }),
    )
      .into_response(),
    Some(failure) => (
      StatusCode::MULTI_STATUS,
      Json(Ack {
        status:  "partial_success",
        message: format!("{success_message}, but archival failed: {failure}"),
      }),
    )
      .into_response(),
  }
}

/// Hand a record to the sink; a failure is logged and reported, never
/// propagated.
async fn archive_best_effort<A>(sink: &A, record: ArchiveRecord) -> Option<String>
where
  A: ArchivalSink,
{
  let id = record.id;
  match sink.archive(record).await {
    Ok(()) => None,
    Err(e) => {
      tracing::warn!(sujet_id = id, error = %e, "archival failed");
      Some(e.to_string())
    }
  }
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /sujets` — body: `{"title":"...", "ai_suggestion":"", "user_notes":""}`
pub async fn create<S, A>(
  State(state): State<AppState<S, A>>,
  Json(body): Json<NewSujet>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  body.validate()?;
  let sujet = state
    .store
    .create(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(SujetSaved { status: "success", sujet })))
}

// ─── Get one (fetch for display) ─────────────────────────────────────────────

/// `GET /sujets/:id` — returns the snapshot after counting the view.
pub async fn get_one<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<i64>,
) -> Result<Json<FetchResponse>, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  let sujet = state
    .store
    .increment_view(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(sujet_core::Error::NotFound(id))?;
  Ok(Json(FetchResponse::Ok { sujet }))
}

// ─── Title ───────────────────────────────────────────────────────────────────

#[derive(Debug, serde::Deserialize)]
pub struct TitleBody {
  pub title: String,
}

/// `PUT /sujets/:id/title`
pub async fn update_title<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<i64>,
  Json(body): Json<TitleBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  if body.title.trim().is_empty() {
    return Err(sujet_core::Error::InvalidInput("title must not be empty".into()).into());
  }
  let sujet = state
    .store
    .update_title(id, &body.title)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(sujet_core::Error::NotFound(id))?;
  Ok(Json(SujetSaved { status: "success", sujet }))
}

// ─── Save (enrich) ───────────────────────────────────────────────────────────

/// `POST /sujets/:id/save` — body: `{"notes":"...", "tags":"...", "person":"..."}`
pub async fn save<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<i64>,
  Json(body): Json<Enrichment>,
) -> Result<Response, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  let sujet = state
    .store
    .update_status(id, Status::Enriched, Some(body))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(sujet_core::Error::NotFound(id))?;

  let record = ArchiveRecord::from_sujet(&sujet, sujet.status);
  let failure = archive_best_effort(state.sink.as_ref(), record).await;
  Ok(ack(failure, "sujet saved"))
}

// ─── Skip ────────────────────────────────────────────────────────────────────

/// `POST /sujets/:id/skip`
pub async fn skip<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<i64>,
) -> Result<Response, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  let sujet = state
    .store
    .update_status(id, Status::Skipped, None)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(sujet_core::Error::NotFound(id))?;

  let record = ArchiveRecord::from_sujet(&sujet, sujet.status);
  let failure = archive_best_effort(state.sink.as_ref(), record).await;
  Ok(ack(failure, "sujet skipped"))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /sujets/:id` — the local row goes first; the archived copy
/// carries the transient `deleted` status.
pub async fn delete<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<i64>,
) -> Result<Response, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  let snapshot = state
    .store
    .delete(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(sujet_core::Error::NotFound(id))?;

  let record = ArchiveRecord::from_sujet(&snapshot, Status::Deleted);
  let failure = archive_best_effort(state.sink.as_ref(), record).await;
  Ok(ack(failure, "sujet deleted"))
}
