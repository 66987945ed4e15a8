//! Handlers for the filter vocabulary: `GET /tags` and `GET /people`.

use axum::{Json, extract::State};
use serde::Serialize;
use sujet_core::{archive::ArchivalSink, store::SujetStore};

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct TagsResponse {
  pub status: &'static str,
  pub tags:   Vec<String>,
}

/// `GET /tags` — every distinct tag, sorted.
pub async fn tags<S, A>(
  State(state): State<AppState<S, A>>,
) -> Result<Json<TagsResponse>, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  let tags = state
    .store
    .list_tags()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(TagsResponse { status: "ok", tags }))
}

#[derive(Debug, Serialize)]
pub struct PeopleResponse {
  pub status: &'static str,
  pub people: Vec<String>,
}

/// `GET /people` — every distinct non-empty person value, sorted.
pub async fn people<S, A>(
  State(state): State<AppState<S, A>>,
) -> Result<Json<PeopleResponse>, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  let people = state
    .store
    .list_people()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(PeopleResponse { status: "ok", people }))
}
