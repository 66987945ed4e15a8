//! [`SqliteStore`] — the SQLite implementation of [`SujetStore`].

use std::{collections::BTreeSet, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use sujet_core::{
  filter::{Direction, SortBy, SortOrder, SujetFilter},
  store::SujetStore,
  sujet::{
    compose_text, split_csv, strip_id_prefix, Enrichment, ImportSujet,
    ImportSummary, NewSujet, Status, Sujet,
  },
};

use crate::{
  encode::{encode_date, encode_status, RawSujet},
  query::{self, QueryPlan},
  schema::SCHEMA,
  Error, Result,
};

// ─── Row helpers (run inside connection calls) ───────────────────────────────

fn select_raw(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawSujet>> {
  conn
    .query_row(
      &format!("SELECT {} FROM sujets WHERE id = ?1", query::SUJET_COLUMNS),
      rusqlite::params![id],
      RawSujet::from_row,
    )
    .optional()
}

/// Like [`select_raw`] but for rows the caller just wrote — a missing row
/// surfaces as a database error rather than `None`.
fn reread_raw(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<RawSujet> {
  conn.query_row(
    &format!("SELECT {} FROM sujets WHERE id = ?1", query::SUJET_COLUMNS),
    rusqlite::params![id],
    RawSujet::from_row,
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A sujet store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Execute a row-returning plan, take the first row, mark it viewed, and
  /// return the refreshed snapshot. Shared by every navigation operation so
  /// each successful fetch counts as exactly one view.
  async fn fetch_one_and_touch(&self, plan: QueryPlan) -> Result<Option<Sujet>> {
    let raw: Option<RawSujet> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&plan.sql)?;
        let hit: Option<i64> = stmt
          .query_row(rusqlite::params_from_iter(plan.params), |row| row.get(0))
          .optional()?;

        let Some(id) = hit else {
          return Ok(None);
        };

        conn.execute(
          "UPDATE sujets SET view_count = view_count + 1 WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok(Some(reread_raw(conn, id)?))
      })
      .await?;

    raw.map(RawSujet::into_sujet).transpose()
  }
}

// ─── SujetStore impl ─────────────────────────────────────────────────────────

impl SujetStore for SqliteStore {
  type Error = Error;

  // ── Single records ──────────────────────────────────────────────────────

  async fn get(&self, id: i64) -> Result<Option<Sujet>> {
    let raw = self.conn.call(move |conn| Ok(select_raw(conn, id)?)).await?;
    raw.map(RawSujet::into_sujet).transpose()
  }

  async fn create(&self, input: NewSujet) -> Result<Sujet> {
    let today = encode_date(Utc::now().date_naive());

    let raw: RawSujet = self
      .conn
      .call(move |conn| {
        // The canonical body embeds the id, which is only known after the
        // insert; write a placeholder, then rewrite.
        conn.execute(
          "INSERT INTO sujets
             (original_text, ai_suggestion, user_notes, status, view_count, date_created)
           VALUES ('', ?1, ?2, 'new', 1, ?3)",
          rusqlite::params![input.ai_suggestion, input.user_notes, today],
        )?;
        let id = conn.last_insert_rowid();

        let text = compose_text(id, strip_id_prefix(&input.title));
        conn.execute(
          "UPDATE sujets SET original_text = ?1 WHERE id = ?2",
          rusqlite::params![text, id],
        )?;
        Ok(reread_raw(conn, id)?)
      })
      .await?;

    raw.into_sujet()
  }

  async fn update_status(
    &self,
    id: i64,
    status: Status,
    enrichment: Option<Enrichment>,
  ) -> Result<Option<Sujet>> {
    let status_str = encode_status(status).to_owned();

    let raw: Option<RawSujet> = self
      .conn
      .call(move |conn| {
        let changed = match (status, enrichment) {
          (Status::Enriched, Some(e)) => conn.execute(
            "UPDATE sujets
             SET status = ?1, user_notes = ?2, user_tags = ?3, person = ?4
             WHERE id = ?5",
            rusqlite::params![status_str, e.notes, e.tags, e.person, id],
          )?,
          _ => conn.execute(
            "UPDATE sujets SET status = ?1 WHERE id = ?2",
            rusqlite::params![status_str, id],
          )?,
        };

        if changed == 0 {
          return Ok(None);
        }
        Ok(Some(reread_raw(conn, id)?))
      })
      .await?;

    raw.map(RawSujet::into_sujet).transpose()
  }

  async fn update_title(&self, id: i64, new_title: &str) -> Result<Option<Sujet>> {
    let text = compose_text(id, strip_id_prefix(new_title));

    let raw: Option<RawSujet> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE sujets SET original_text = ?1 WHERE id = ?2",
          rusqlite::params![text, id],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(Some(reread_raw(conn, id)?))
      })
      .await?;

    raw.map(RawSujet::into_sujet).transpose()
  }

  async fn delete(&self, id: i64) -> Result<Option<Sujet>> {
    let raw: Option<RawSujet> = self
      .conn
      .call(move |conn| {
        let Some(existing) = select_raw(conn, id)? else {
          return Ok(None);
        };
        conn.execute("DELETE FROM sujets WHERE id = ?1", rusqlite::params![id])?;
        Ok(Some(existing))
      })
      .await?;

    raw.map(RawSujet::into_sujet).transpose()
  }

  async fn increment_view(&self, id: i64) -> Result<Option<Sujet>> {
    let raw: Option<RawSujet> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE sujets SET view_count = view_count + 1 WHERE id = ?1",
          rusqlite::params![id],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(Some(reread_raw(conn, id)?))
      })
      .await?;

    raw.map(RawSujet::into_sujet).transpose()
  }

  // ── Vocabulary ──────────────────────────────────────────────────────────

  async fn list_tags(&self) -> Result<Vec<String>> {
    let values: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT user_tags FROM sujets WHERE user_tags != ''")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut tags = BTreeSet::new();
    for value in &values {
      tags.extend(split_csv(value));
    }
    Ok(tags.into_iter().collect())
  }

  async fn list_people(&self) -> Result<Vec<String>> {
    let people: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT person FROM sujets WHERE person != '' ORDER BY person",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(people)
  }

  // ── Filtered navigation ─────────────────────────────────────────────────

  async fn count(&self, filter: &SujetFilter) -> Result<u64> {
    let plan = query::count(filter);
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &plan.sql,
          rusqlite::params_from_iter(plan.params),
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(n as u64)
  }

  async fn first(&self, filter: &SujetFilter, order: SortOrder) -> Result<Option<Sujet>> {
    let mut plan = query::select(filter, SortBy::Id, order);
    plan.sql.push_str(" LIMIT 1");
    self.fetch_one_and_touch(plan).await
  }

  async fn last(&self, filter: &SujetFilter, order: SortOrder) -> Result<Option<Sujet>> {
    self.first(filter, order.flipped()).await
  }

  async fn at_offset(
    &self,
    filter: &SujetFilter,
    order: SortOrder,
    offset: u32,
  ) -> Result<Option<Sujet>> {
    let mut plan = query::select(filter, SortBy::Id, order);
    plan.sql.push_str(" LIMIT 1 OFFSET ?");
    plan.params.push(rusqlite::types::Value::Integer(i64::from(offset)));
    self.fetch_one_and_touch(plan).await
  }

  async fn random(&self, filter: &SujetFilter) -> Result<Option<Sujet>> {
    let mut plan = query::select(filter, SortBy::Random, SortOrder::default());
    plan.sql.push_str(" LIMIT 1");
    self.fetch_one_and_touch(plan).await
  }

  async fn adjacent(
    &self,
    current_id: i64,
    filter: &SujetFilter,
    order: SortOrder,
    direction: Direction,
  ) -> Result<Option<Sujet>> {
    let cursor: Option<(String, i64)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT COALESCE(date_created, ''), id FROM sujets WHERE id = ?1",
              rusqlite::params![current_id],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let Some((cursor_date, cursor_id)) = cursor else {
      return Ok(None);
    };

    let plan = query::adjacent(filter, order, direction, &cursor_date, cursor_id);
    self.fetch_one_and_touch(plan).await
  }

  // ── Bulk ingest ─────────────────────────────────────────────────────────

  async fn import(&self, batch: Vec<ImportSujet>) -> Result<ImportSummary> {
    let summary = self
      .conn
      .call(move |conn| {
        let mut summary = ImportSummary::default();
        for record in batch {
          let text = record.original_text.trim().to_owned();
          if text.is_empty() {
            continue;
          }

          let exists: bool = conn
            .query_row(
              "SELECT 1 FROM sujets WHERE original_text = ?1",
              rusqlite::params![text],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

          if exists {
            summary.skipped += 1;
            continue;
          }

          conn.execute(
            "INSERT INTO sujets (original_text, ai_suggestion, status, view_count)
             VALUES (?1, ?2, 'needs_enrichment', 0)",
            rusqlite::params![text, record.ai_suggestion.trim()],
          )?;
          summary.added += 1;
        }
        Ok(summary)
      })
      .await?;
    Ok(summary)
  }
}
