//! The `SujetStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `sujet-store-sqlite`).
//! Higher layers (`sujet-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  filter::{Direction, SortOrder, SujetFilter},
  sujet::{Enrichment, ImportSujet, ImportSummary, NewSujet, Status, Sujet},
};

/// Abstraction over a sujet store backend.
///
/// A missing id is a value-level condition: single-record operations return
/// `None` rather than an error, and the caller decides how to surface it.
/// Errors are reserved for storage failures.
///
/// Fetch-for-display semantics: `increment_view` is the only write path that
/// touches `view_count`, and every navigation operation below that returns a
/// row routes through it exactly once. `get` is the plain lookup used for
/// internal re-reads and never counts as a view.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SujetStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Single records ────────────────────────────────────────────────────

  /// Retrieve a snapshot by id without side effects.
  fn get(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Sujet>, Self::Error>> + Send + '_;

  /// Create a single sujet: `status = new`, `view_count = 1`,
  /// `date_created = today`, body in the canonical `"ID: <id> - <title>"`
  /// form. The id is assigned by the store and never reused, even after the
  /// row holding the current maximum is deleted.
  fn create(
    &self,
    input: NewSujet,
  ) -> impl Future<Output = Result<Sujet, Self::Error>> + Send + '_;

  /// Set `status`, and — only for the `Enriched` transition — overwrite the
  /// notes/tags/person fields from `enrichment`. Never touches `view_count`.
  fn update_status(
    &self,
    id: i64,
    status: Status,
    enrichment: Option<Enrichment>,
  ) -> impl Future<Output = Result<Option<Sujet>, Self::Error>> + Send + '_;

  /// Rewrite the body to `"ID: <id> - <new_title>"`, stripping any id
  /// prefix the caller left on the new title.
  fn update_title<'a>(
    &'a self,
    id: i64,
    new_title: &'a str,
  ) -> impl Future<Output = Result<Option<Sujet>, Self::Error>> + Send + 'a;

  /// Remove the row permanently and return its final snapshot. There is no
  /// soft delete.
  fn delete(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Sujet>, Self::Error>> + Send + '_;

  /// Add 1 to `view_count` and return the refreshed snapshot.
  fn increment_view(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Sujet>, Self::Error>> + Send + '_;

  // ── Vocabulary ────────────────────────────────────────────────────────

  /// Every distinct tag across all `user_tags` values, sorted.
  fn list_tags(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Every distinct non-empty `person` value, sorted.
  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Filtered navigation ───────────────────────────────────────────────

  /// Number of sujets matching `filter`.
  fn count<'a>(
    &'a self,
    filter: &'a SujetFilter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// First matching sujet under `(date_created, id)` in `order`; counts as
  /// a view.
  fn first<'a>(
    &'a self,
    filter: &'a SujetFilter,
    order: SortOrder,
  ) -> impl Future<Output = Result<Option<Sujet>, Self::Error>> + Send + 'a;

  /// Last matching sujet under `order`; counts as a view.
  fn last<'a>(
    &'a self,
    filter: &'a SujetFilter,
    order: SortOrder,
  ) -> impl Future<Output = Result<Option<Sujet>, Self::Error>> + Send + 'a;

  /// The `offset`-th matching sujet under `order`; counts as a view.
  fn at_offset<'a>(
    &'a self,
    filter: &'a SujetFilter,
    order: SortOrder,
    offset: u32,
  ) -> impl Future<Output = Result<Option<Sujet>, Self::Error>> + Send + 'a;

  /// One arbitrary matching sujet; counts as a view.
  fn random<'a>(
    &'a self,
    filter: &'a SujetFilter,
  ) -> impl Future<Output = Result<Option<Sujet>, Self::Error>> + Send + 'a;

  /// The sujet immediately next to / before `current_id` under `order`,
  /// restricted to `filter`; counts as a view. Returns `None` both at the
  /// edge of the filtered set and when `current_id` itself is gone —
  /// callers that must distinguish check existence first with [`get`].
  ///
  /// [`get`]: SujetStore::get
  fn adjacent<'a>(
    &'a self,
    current_id: i64,
    filter: &'a SujetFilter,
    order: SortOrder,
    direction: Direction,
  ) -> impl Future<Output = Result<Option<Sujet>, Self::Error>> + Send + 'a;

  // ── Bulk ingest ───────────────────────────────────────────────────────

  /// Ingest a batch: rows whose `original_text` already exists verbatim are
  /// skipped; new rows get `status = needs_enrichment`, `view_count = 0`,
  /// and no creation date.
  fn import(
    &self,
    batch: Vec<ImportSujet>,
  ) -> impl Future<Output = Result<ImportSummary, Self::Error>> + Send + '_;
}
