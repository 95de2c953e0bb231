//! Human-readable activity log of a pass.
//!
//! The orchestrator appends one [`Activity`] per decision, in processing
//! order; the caller drains the log once the pass is over and renders it
//! however it likes. Every entry is mirrored to `tracing` as it is recorded.

use std::fmt;

use serde::Serialize;

use crate::{case::CaseId, reconcile::MaterialField};

/// Where in the per-case flow a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
  Fetch,
  Archive,
  Extract,
  Classify,
}

impl fmt::Display for FailureStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Fetch => "fetch",
      Self::Archive => "archive",
      Self::Extract => "extract",
      Self::Classify => "classify",
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "activity", rename_all = "snake_case")]
pub enum Activity {
  /// A known case is being examined.
  Checking {
    position:   usize,
    case_id:    CaseId,
    dissertant: String,
  },
  /// A case not yet in the store is being fetched.
  Discovered { position: usize, case_id: CaseId },
  /// Stored decision is final; reused without fetching.
  FinalRuling { case_id: CaseId },
  /// Checked recently enough; reused without fetching.
  Fresh {
    case_id:          CaseId,
    days_since_check: i64,
  },
  /// Stale; re-fetching from the registry.
  Refreshing { case_id: CaseId },
  NewCase { case_id: CaseId, dissertant: String },
  ExpiredNew { case_id: CaseId, dissertant: String },
  Updated {
    case_id:        CaseId,
    dissertant:     String,
    changed_fields: Vec<MaterialField>,
  },
  Unchanged { case_id: CaseId },
  Failed {
    case_id: CaseId,
    stage:   FailureStage,
    message: String,
  },
  /// End-of-pass report: one line per updated case.
  Summary { updates: Vec<String> },
}

impl fmt::Display for Activity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Checking {
        position,
        dissertant,
        ..
      } => write!(f, "Checking case #{position}: {dissertant}"),
      Self::Discovered { position, case_id } => {
        write!(f, "Fetching unseen case #{position}: {case_id}")
      }
      Self::FinalRuling { .. } => {
        write!(f, "- final ruling already recorded, reusing stored record")
      }
      Self::Fresh {
        days_since_check, ..
      } => write!(
        f,
        "- last checked {days_since_check} day(s) ago, reusing stored record"
      ),
      Self::Refreshing { .. } => write!(f, "- refreshing from the registry"),
      Self::NewCase { dissertant, .. } => {
        write!(f, "New case added: {dissertant}")
      }
      Self::ExpiredNew { dissertant, .. } => write!(
        f,
        "Case outside the revocation window recorded as expired: {dissertant}"
      ),
      Self::Updated {
        case_id,
        changed_fields,
        ..
      } => write!(f, "Update for {case_id}: {}", join_fields(changed_fields)),
      Self::Unchanged { .. } => write!(f, "No updates"),
      Self::Failed {
        case_id,
        stage,
        message,
      } => write!(f, "Error processing {case_id} ({stage}): {message}"),
      Self::Summary { updates } if updates.is_empty() => {
        write!(f, "No important updates found")
      }
      Self::Summary { updates } => {
        write!(f, "Updates found: {}", updates.join("; "))
      }
    }
  }
}

pub(crate) fn join_fields(fields: &[MaterialField]) -> String {
  fields
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join(", ")
}

/// Ordered list of [`Activity`] entries owned by one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActivityLog {
  entries: Vec<Activity>,
}

impl ActivityLog {
  pub fn new() -> Self { Self::default() }

  pub fn record(&mut self, activity: Activity) {
    match &activity {
      Activity::Failed { case_id, stage, message } => {
        tracing::warn!(%case_id, %stage, %message, "case failed");
      }
      Activity::Updated { case_id, changed_fields, .. } => {
        tracing::info!(%case_id, fields = %join_fields(changed_fields), "case updated");
      }
      Activity::NewCase { case_id, .. } => {
        tracing::info!(%case_id, "new case");
      }
      Activity::ExpiredNew { case_id, .. } => {
        tracing::info!(%case_id, "case routed to expired store");
      }
      other => tracing::debug!("{other}"),
    }
    self.entries.push(activity);
  }

  pub fn entries(&self) -> &[Activity] { &self.entries }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Take every entry out of the log, oldest first.
  pub fn drain(&mut self) -> impl Iterator<Item = Activity> + '_ {
    self.entries.drain(..)
  }

  pub fn failures(&self) -> impl Iterator<Item = &Activity> {
    self
      .entries
      .iter()
      .filter(|a| matches!(a, Activity::Failed { .. }))
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
