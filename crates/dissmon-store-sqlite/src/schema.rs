//! SQL schema for the dissmon SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `active_cases` and `expired_cases` share one column layout so a record can
/// move between them unchanged.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS active_cases (
    case_id            TEXT PRIMARY KEY,
    dissertant_name    TEXT NOT NULL,
    dissertation_title TEXT NOT NULL,
    adviser            TEXT NOT NULL,
    opponents          TEXT NOT NULL,
    council_name       TEXT NOT NULL,
    submission_date    TEXT NOT NULL,   -- as printed by the registry
    petition_filed     INTEGER NOT NULL,
    status             TEXT NOT NULL,   -- 'new' | 'current'
    revocation         TEXT,            -- JSON object or NULL
    last_checked       TEXT NOT NULL    -- YYYY-MM-DD
);

-- Terminal: written only by retirement; nothing moves back out.
CREATE TABLE IF NOT EXISTS expired_cases (
    case_id            TEXT PRIMARY KEY,
    dissertant_name    TEXT NOT NULL,
    dissertation_title TEXT NOT NULL,
    adviser            TEXT NOT NULL,
    opponents          TEXT NOT NULL,
    council_name       TEXT NOT NULL,
    submission_date    TEXT NOT NULL,
    petition_filed     INTEGER NOT NULL,
    status             TEXT NOT NULL,
    revocation         TEXT,
    last_checked       TEXT NOT NULL
);

-- Append-only; `seq` preserves insertion order.
CREATE TABLE IF NOT EXISTS changelog (
    seq            INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id       TEXT NOT NULL UNIQUE,
    case_id        TEXT NOT NULL,
    changed_fields TEXT NOT NULL,       -- JSON array of field names
    entry_date     TEXT NOT NULL        -- YYYY-MM-DD
);

CREATE INDEX IF NOT EXISTS active_status_idx  ON active_cases(status);
CREATE INDEX IF NOT EXISTS changelog_case_idx ON changelog(case_id);

PRAGMA user_version = 1;
";
