//! [`SqliteStore`]: the SQLite implementation of [`CaseStore`] and
//! [`ChangelogStore`].

use std::{
  collections::{BTreeMap, BTreeSet},
  path::Path,
};

use dissmon_core::{
  case::{CaseId, CaseRecord, Status},
  changelog::ChangelogEntry,
  store::{CaseStore, ChangelogStore, WriteMode},
};

use crate::{
  Error, Result,
  encode::{
    CASE_COLUMNS, RawCase, RawChangelogEntry, encode_date, encode_status,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A dissmon record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening record store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
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

  async fn select_cases(&self, sql: String) -> Result<Vec<CaseRecord>> {
    let raws: Vec<RawCase> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawCase::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCase::into_record).collect()
  }
}

/// Insert or replace one case row in `table`.
///
/// With `skip_expired`, a row whose id is already in `expired_cases` is left
/// out; an expired case never comes back to the active table.
fn put_case(
  tx: &rusqlite::Transaction<'_>,
  table: &str,
  raw: &RawCase,
  skip_expired: bool,
) -> rusqlite::Result<usize> {
  let guard = if skip_expired {
    "WHERE NOT EXISTS (SELECT 1 FROM expired_cases WHERE case_id = ?1)"
  } else {
    ""
  };
  let sql = format!(
    "INSERT OR REPLACE INTO {table} ({CASE_COLUMNS})
     SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11 {guard}"
  );
  tx.execute(
    &sql,
    rusqlite::params![
      raw.case_id,
      raw.dissertant_name,
      raw.dissertation_title,
      raw.adviser,
      raw.opponents,
      raw.council_name,
      raw.submission_date,
      raw.petition_filed,
      raw.status,
      raw.revocation,
      raw.last_checked,
    ],
  )
}

/// Upsert active rows, or replace the whole active table. Returns the number
/// of rows written.
fn write_active(
  tx: &rusqlite::Transaction<'_>,
  raws: &[RawCase],
  mode: WriteMode,
) -> rusqlite::Result<usize> {
  if mode == WriteMode::Replace {
    tx.execute("DELETE FROM active_cases", [])?;
  }
  let mut written = 0;
  for raw in raws {
    written += put_case(tx, "active_cases", raw, true)?;
  }
  Ok(written)
}

fn move_to_expired(
  tx: &rusqlite::Transaction<'_>,
  raws: &[RawCase],
) -> rusqlite::Result<()> {
  for raw in raws {
    put_case(tx, "expired_cases", raw, false)?;
    tx.execute(
      "DELETE FROM active_cases WHERE case_id = ?1",
      rusqlite::params![raw.case_id],
    )?;
  }
  Ok(())
}

/// Changelog columns ready for insertion: entry id, case id, changed fields
/// as JSON, entry date.
type ChangelogRow = (String, String, String, String);

fn changelog_rows(entries: &[ChangelogEntry]) -> Result<Vec<ChangelogRow>> {
  entries
    .iter()
    .map(|e| -> Result<_> {
      Ok((
        encode_uuid(e.entry_id),
        e.case_id.as_str().to_owned(),
        serde_json::to_string(&e.changed_fields)?,
        encode_date(e.date),
      ))
    })
    .collect()
}

fn insert_changelog(
  tx: &rusqlite::Transaction<'_>,
  rows: &[ChangelogRow],
) -> rusqlite::Result<()> {
  for (entry_id, case_id, fields, date) in rows {
    tx.execute(
      "INSERT INTO changelog (entry_id, case_id, changed_fields, entry_date)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![entry_id, case_id, fields, date],
    )?;
  }
  Ok(())
}

fn raw_cases(records: &[CaseRecord]) -> Result<Vec<RawCase>> {
  records.iter().map(RawCase::from_record).collect()
}

// ─── CaseStore impl ──────────────────────────────────────────────────────────

impl CaseStore for SqliteStore {
  type Error = Error;

  async fn get_all(&self) -> Result<BTreeMap<CaseId, CaseRecord>> {
    let records = self
      .select_cases(format!("SELECT {CASE_COLUMNS} FROM active_cases"))
      .await?;
    Ok(
      records
        .into_iter()
        .map(|r| (r.case_id.clone(), r))
        .collect(),
    )
  }

  async fn expired_ids(&self) -> Result<BTreeSet<CaseId>> {
    let ids: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT case_id FROM expired_cases")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids
      .into_iter()
      .map(|id| CaseId::new(id).map_err(Error::from))
      .collect()
  }

  async fn get_by_status(&self, statuses: &[Status]) -> Result<Vec<CaseRecord>> {
    if statuses.is_empty() {
      return Ok(vec![]);
    }

    let codes: Vec<String> = statuses.iter().copied().map(encode_status).collect();
    let placeholders = (1..=codes.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "SELECT {CASE_COLUMNS} FROM active_cases WHERE status IN ({placeholders})
       UNION ALL
       SELECT {CASE_COLUMNS} FROM expired_cases WHERE status IN ({placeholders})
       ORDER BY case_id"
    );

    let raws: Vec<RawCase> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(codes.iter()),
            RawCase::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCase::into_record).collect()
  }

  async fn write_batch(
    &self,
    records: Vec<CaseRecord>,
    mode: WriteMode,
  ) -> Result<()> {
    let raws = raw_cases(&records)?;

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let written = write_active(&tx, &raws, mode)?;
        tx.commit()?;
        Ok(written)
      })
      .await?;

    tracing::debug!(written, requested = records.len(), ?mode, "wrote active records");
    Ok(())
  }

  async fn retire(&self, records: Vec<CaseRecord>) -> Result<()> {
    let raws = raw_cases(&records)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        move_to_expired(&tx, &raws)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(retired = records.len(), "moved records to expired store");
    Ok(())
  }

  async fn commit_pass(
    &self,
    active: Vec<CaseRecord>,
    expired: Vec<CaseRecord>,
    changelog: Vec<ChangelogEntry>,
  ) -> Result<()> {
    let active = raw_cases(&active)?;
    let expired = raw_cases(&expired)?;
    let changelog = changelog_rows(&changelog)?;

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let written = write_active(&tx, &active, WriteMode::Upsert)?;
        move_to_expired(&tx, &expired)?;
        insert_changelog(&tx, &changelog)?;
        tx.commit()?;
        Ok(written)
      })
      .await?;

    tracing::debug!(written, "pass committed");
    Ok(())
  }
}

// ─── ChangelogStore impl ─────────────────────────────────────────────────────

impl ChangelogStore for SqliteStore {
  type Error = Error;

  async fn append(&self, entries: Vec<ChangelogEntry>) -> Result<()> {
    let rows = changelog_rows(&entries)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        insert_changelog(&tx, &rows)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list(&self, case_id: Option<&CaseId>) -> Result<Vec<ChangelogEntry>> {
    let case_id = case_id.map(|id| id.as_str().to_owned());

    let raws: Vec<RawChangelogEntry> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(id) = case_id {
          let mut stmt = conn.prepare(
            "SELECT entry_id, case_id, changed_fields, entry_date
             FROM changelog WHERE case_id = ?1 ORDER BY seq",
          )?;
          stmt
            .query_map(rusqlite::params![id], RawChangelogEntry::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT entry_id, case_id, changed_fields, entry_date
             FROM changelog ORDER BY seq",
          )?;
          stmt
            .query_map([], RawChangelogEntry::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawChangelogEntry::into_entry).collect()
  }
}
