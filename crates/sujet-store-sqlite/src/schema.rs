//! SQL schema for the sujet SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `AUTOINCREMENT` keeps ids strictly increasing for the table's lifetime:
/// deleting the row with the maximum id must not let the next insert take
/// that id again.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS sujets (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    original_text TEXT NOT NULL,    -- canonical 'ID: <id> - <title>' form
    ai_suggestion TEXT NOT NULL DEFAULT '',
    user_notes    TEXT NOT NULL DEFAULT '',
    user_tags     TEXT NOT NULL DEFAULT '',   -- comma-separated, free-form
    person        TEXT NOT NULL DEFAULT '',
    status        TEXT NOT NULL DEFAULT 'needs_enrichment',
    view_count    INTEGER NOT NULL DEFAULT 0 CHECK (view_count >= 0),
    date_created  TEXT              -- 'YYYY-MM-DD'; NULL on bulk-ingested rows
);

PRAGMA user_version = 1;
";
