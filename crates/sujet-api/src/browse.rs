//! Handlers for filtered browsing and navigation.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/sujets/at` | `?offset=N` plus filters; the Nth matching record |
//! | `GET` | `/sujets/first`, `/sujets/last` | Edges of the filtered set |
//! | `GET` | `/sujets/random` | One arbitrary matching record |
//! | `GET` | `/sujets/:id/adjacent` | `?direction=next\|prev` plus filters |
//! | `GET` | `/sujets/count` | Matching-record count |
//!
//! `tags` and `people` are comma-separated; blank segments are dropped.
//! `order` is `asc`/`desc` and defaults to `asc`. Every row-returning
//! handler answers with the snapshot-or-sentinel envelope and counts the
//! fetched record as viewed.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use sujet_core::{
  archive::ArchivalSink,
  filter::{Direction, SortBy, SortOrder, SujetFilter},
  store::SujetStore,
  sujet::split_csv,
};

use crate::{AppState, FetchResponse, error::ApiError};

fn parse_filter(tags: Option<&str>, people: Option<&str>) -> SujetFilter {
  SujetFilter::new(
    tags.map(split_csv).unwrap_or_default(),
    people.map(split_csv).unwrap_or_default(),
  )
}

// ─── First / last / random ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct BrowseParams {
  pub tags:   Option<String>,
  pub people: Option<String>,
  #[serde(default)]
  pub order:  SortOrder,
}

/// `GET /sujets/first`
pub async fn first<S, A>(
  State(state): State<AppState<S, A>>,
  Query(params): Query<BrowseParams>,
) -> Result<Json<FetchResponse>, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  let filter = parse_filter(params.tags.as_deref(), params.people.as_deref());
  let sujet = state
    .store
    .first(&filter, params.order)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(sujet.into()))
}

/// `GET /sujets/last`
pub async fn last<S, A>(
  State(state): State<AppState<S, A>>,
  Query(params): Query<BrowseParams>,
) -> Result<Json<FetchResponse>, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  let filter = parse_filter(params.tags.as_deref(), params.people.as_deref());
  let sujet = state
    .store
    .last(&filter, params.order)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(sujet.into()))
}

/// `GET /sujets/random`
pub async fn random<S, A>(
  State(state): State<AppState<S, A>>,
  Query(params): Query<BrowseParams>,
) -> Result<Json<FetchResponse>, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  let filter = parse_filter(params.tags.as_deref(), params.people.as_deref());
  let sujet = state
    .store
    .random(&filter)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(sujet.into()))
}

// ─── At offset ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AtParams {
  pub tags:    Option<String>,
  pub people:  Option<String>,
  #[serde(default)]
  pub order:   SortOrder,
  #[serde(default)]
  pub offset:  u32,
  /// `sort_by=random` picks an arbitrary matching record; `offset` is then
  /// meaningless and ignored.
  pub sort_by: Option<SortBy>,
}

/// `GET /sujets/at?offset=N`
pub async fn at_offset<S, A>(
  State(state): State<AppState<S, A>>,
  Query(params): Query<AtParams>,
) -> Result<Json<FetchResponse>, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  let filter = parse_filter(params.tags.as_deref(), params.people.as_deref());
  let sujet = match params.sort_by.unwrap_or(SortBy::Id) {
    SortBy::Random => state.store.random(&filter).await,
    SortBy::Id => {
      state
        .store
        .at_offset(&filter, params.order, params.offset)
        .await
    }
  }
  .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(sujet.into()))
}

// ─── Adjacent ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AdjacentParams {
  pub tags:      Option<String>,
  pub people:    Option<String>,
  #[serde(default)]
  pub order:     SortOrder,
  pub direction: Direction,
}

/// `GET /sujets/:id/adjacent?direction=next|prev` — 404 when the reference
/// record itself is gone; the sentinel when the edge is reached.
pub async fn adjacent<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<i64>,
  Query(params): Query<AdjacentParams>,
) -> Result<Json<FetchResponse>, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  state
    .store
    .get(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(sujet_core::Error::NotFound(id))?;

  let filter = parse_filter(params.tags.as_deref(), params.people.as_deref());
  let sujet = state
    .store
    .adjacent(id, &filter, params.order, params.direction)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(sujet.into()))
}

// ─── Count ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CountResponse {
  pub status: &'static str,
  pub count:  u64,
}

/// `GET /sujets/count`
pub async fn count<S, A>(
  State(state): State<AppState<S, A>>,
  Query(params): Query<BrowseParams>,
) -> Result<Json<CountResponse>, ApiError>
where
  S: SujetStore,
  A: ArchivalSink,
{
  let filter = parse_filter(params.tags.as_deref(), params.people.as_deref());
  let count = state
    .store
    .count(&filter)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(CountResponse { status: "ok", count }))
}
