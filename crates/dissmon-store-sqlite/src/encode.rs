//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`. The revocation sub-record and changelog
//! field lists are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings.

use std::str::FromStr as _;

use chrono::NaiveDate;
use dissmon_core::{
  case::{CaseId, CaseRecord, Revocation, Status},
  changelog::ChangelogEntry,
};
use uuid::Uuid;

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn encode_date(date: NaiveDate) -> String {
  date.format(DATE_FORMAT).to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  Ok(NaiveDate::parse_from_str(s, DATE_FORMAT)?)
}

pub fn encode_status(status: Status) -> String { status.to_string() }

pub fn decode_status(s: &str) -> Result<Status> {
  Status::from_str(s).map_err(|_| Error::Decode {
    column: "status",
    value:  s.to_owned(),
  })
}

pub fn encode_revocation(r: &Revocation) -> Result<String> {
  Ok(serde_json::to_string(r)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column order shared by both case tables.
pub const CASE_COLUMNS: &str = "case_id, dissertant_name, dissertation_title, \
  adviser, opponents, council_name, submission_date, petition_filed, status, \
  revocation, last_checked";

/// Raw values read directly from an `active_cases` / `expired_cases` row.
pub struct RawCase {
  pub case_id:            String,
  pub dissertant_name:    String,
  pub dissertation_title: String,
  pub adviser:            String,
  pub opponents:          String,
  pub council_name:       String,
  pub submission_date:    String,
  pub petition_filed:     bool,
  pub status:             String,
  pub revocation:         Option<String>,
  pub last_checked:       String,
}

impl RawCase {
  /// Read a row selected with [`CASE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      case_id:            row.get(0)?,
      dissertant_name:    row.get(1)?,
      dissertation_title: row.get(2)?,
      adviser:            row.get(3)?,
      opponents:          row.get(4)?,
      council_name:       row.get(5)?,
      submission_date:    row.get(6)?,
      petition_filed:     row.get(7)?,
      status:             row.get(8)?,
      revocation:         row.get(9)?,
      last_checked:       row.get(10)?,
    })
  }

  /// Encode a record for insertion, in [`CASE_COLUMNS`] order.
  pub fn from_record(record: &CaseRecord) -> Result<Self> {
    Ok(Self {
      case_id:            record.case_id.as_str().to_owned(),
      dissertant_name:    record.dissertant_name.clone(),
      dissertation_title: record.dissertation_title.clone(),
      adviser:            record.adviser.clone(),
      opponents:          record.opponents.clone(),
      council_name:       record.council_name.clone(),
      submission_date:    record.submission_date.clone(),
      petition_filed:     record.petition_filed,
      status:             encode_status(record.status),
      revocation:         record
        .revocation
        .as_ref()
        .map(encode_revocation)
        .transpose()?,
      last_checked:       encode_date(record.last_checked),
    })
  }

  pub fn into_record(self) -> Result<CaseRecord> {
    let revocation = self
      .revocation
      .as_deref()
      .map(serde_json::from_str::<Revocation>)
      .transpose()?;

    Ok(CaseRecord {
      case_id: CaseId::new(self.case_id)?,
      dissertant_name: self.dissertant_name,
      dissertation_title: self.dissertation_title,
      adviser: self.adviser,
      opponents: self.opponents,
      council_name: self.council_name,
      submission_date: self.submission_date,
      petition_filed: self.petition_filed,
      status: decode_status(&self.status)?,
      revocation,
      last_checked: decode_date(&self.last_checked)?,
    })
  }
}

/// Raw strings read directly from a `changelog` row.
pub struct RawChangelogEntry {
  pub entry_id:       String,
  pub case_id:        String,
  pub changed_fields: String,
  pub entry_date:     String,
}

impl RawChangelogEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:       row.get(0)?,
      case_id:        row.get(1)?,
      changed_fields: row.get(2)?,
      entry_date:     row.get(3)?,
    })
  }

  pub fn into_entry(self) -> Result<ChangelogEntry> {
    Ok(ChangelogEntry {
      entry_id:       Uuid::parse_str(&self.entry_id)?,
      case_id:        CaseId::new(self.case_id)?,
      changed_fields: serde_json::from_str(&self.changed_fields)?,
      date:           decode_date(&self.entry_date)?,
    })
  }
}
