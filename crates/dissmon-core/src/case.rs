//! Case records, one per tracked dissertation defense.
//!
//! A case is keyed by a [`CaseId`] derived from the registry path of its
//! defense page. Everything else on the record is a snapshot of what the
//! registry showed the last time the case was fetched.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Stable slug identifying a case; the unique key in every store.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CaseId(String);

impl CaseId {
  /// Wrap an already-derived slug.
  pub fn new(slug: impl Into<String>) -> Result<Self> {
    let slug = slug.into();
    if slug.trim().is_empty() || slug.contains('/') {
      return Err(Error::InvalidCaseId(slug));
    }
    Ok(Self(slug))
  }

  /// Derive the id from a registry locator such as
  /// `/expertise/ivanov_ii.html?tab=1` → `ivanov_ii`.
  ///
  /// The last path segment is used with any query, fragment and file
  /// extension removed, so re-fetches of the same page always map to the
  /// same id.
  pub fn from_locator(locator: &str) -> Result<Self> {
    let path = locator
      .split(['?', '#'])
      .next()
      .unwrap_or_default()
      .trim_end_matches('/');
    let segment = path.rsplit('/').next().unwrap_or_default();
    let slug = segment.split('.').next().unwrap_or_default();
    if slug.is_empty() {
      return Err(Error::InvalidCaseId(locator.to_owned()));
    }
    Ok(Self(slug.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CaseId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for CaseId {
  fn as_ref(&self) -> &str { &self.0 }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status of a case. `Expired` is terminal.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
  /// Inside the review window, no revocation petition yet.
  New,
  /// A degree-revocation petition has been filed and is tracked.
  Current,
  /// Outside the review window; never re-fetched or re-classified.
  Expired,
}

impl Status {
  pub fn is_terminal(self) -> bool { matches!(self, Self::Expired) }
}

// ─── Revocation ──────────────────────────────────────────────────────────────

/// Detail of a degree-revocation petition, read from its own registry page.
///
/// Every field degrades to an empty string when the page does not carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revocation {
  /// Free-text status string as published by the registry.
  pub status:                String,
  pub petition_date:         String,
  /// Short cypher / reference of the council handling the complaint.
  pub council_decision_code: String,
  /// Free-text ruling, whitespace-normalised.
  pub council_decision_text: String,
}

// ─── Record ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
  pub case_id:            CaseId,
  pub dissertant_name:    String,
  pub dissertation_title: String,
  /// Comma-joined adviser names in document order.
  pub adviser:            String,
  /// Comma-joined opponent names in document order.
  pub opponents:          String,
  pub council_name:       String,
  /// Submission date exactly as the registry prints it.
  pub submission_date:    String,
  pub petition_filed:     bool,
  pub status:             Status,
  /// Present only when `petition_filed` is set.
  pub revocation:         Option<Revocation>,
  pub last_checked:       NaiveDate,
}

impl CaseRecord {
  pub fn petition_date(&self) -> &str {
    self
      .revocation
      .as_ref()
      .map_or("", |r| r.petition_date.as_str())
  }

  pub fn council_decision_code(&self) -> &str {
    self
      .revocation
      .as_ref()
      .map_or("", |r| r.council_decision_code.as_str())
  }

  pub fn council_decision_text(&self) -> &str {
    self
      .revocation
      .as_ref()
      .map_or("", |r| r.council_decision_text.as_str())
  }

  /// Whether the council has already published `phrase` (a terminal ruling)
  /// for this case.
  pub fn has_final_ruling(&self, phrase: &str) -> bool {
    !phrase.is_empty()
      && self
        .council_decision_text()
        .to_lowercase()
        .contains(&phrase.to_lowercase())
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
