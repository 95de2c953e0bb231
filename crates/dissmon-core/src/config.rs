//! Per-pass configuration handed to the orchestrator at call time.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::case::{CaseRecord, Status};

/// Default terminal-ruling phrase; a stored decision containing it is final.
pub const DEFAULT_FINAL_RULING_PHRASE: &str = "degree revoked";

// ─── Refresh policy ──────────────────────────────────────────────────────────

/// Minimum number of days between re-fetches, per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshPolicy {
  pub refresh_new_days:     i64,
  pub refresh_current_days: i64,
}

impl Default for RefreshPolicy {
  fn default() -> Self {
    Self {
      refresh_new_days:     30,
      refresh_current_days: 7,
    }
  }
}

impl RefreshPolicy {
  /// Whole days since `record` was last checked, as of `today`.
  pub fn days_since_check(record: &CaseRecord, today: NaiveDate) -> i64 {
    (today - record.last_checked).num_days()
  }

  /// Whether a stored record is due for a re-fetch. Expired records never are.
  pub fn is_due(&self, record: &CaseRecord, today: NaiveDate) -> bool {
    let days = Self::days_since_check(record, today);
    match record.status {
      Status::New => days >= self.refresh_new_days,
      Status::Current => days >= self.refresh_current_days,
      Status::Expired => false,
    }
  }
}

// ─── Pass configuration ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassConfig {
  pub refresh:             RefreshPolicy,
  /// A stored decision containing this phrase is never re-fetched.
  pub final_ruling_phrase: String,
  /// Delay inserted between consecutive document fetches.
  pub pacing:              Duration,
}

impl Default for PassConfig {
  fn default() -> Self {
    Self {
      refresh:             RefreshPolicy::default(),
      final_ruling_phrase: DEFAULT_FINAL_RULING_PHRASE.to_owned(),
      pacing:              Duration::ZERO,
    }
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::Duration as Days;

  use super::*;
  use crate::case::tests::record;

  #[test]
  fn thresholds_are_status_dependent() {
    let policy = RefreshPolicy {
      refresh_new_days:     30,
      refresh_current_days: 5,
    };
    let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

    let mut new = record("a", Status::New);
    new.last_checked = today - Days::days(29);
    assert!(!policy.is_due(&new, today));
    new.last_checked = today - Days::days(30);
    assert!(policy.is_due(&new, today));

    let mut current = record("b", Status::Current);
    current.last_checked = today - Days::days(5);
    assert!(policy.is_due(&current, today));
    current.last_checked = today - Days::days(4);
    assert!(!policy.is_due(&current, today));
  }

  #[test]
  fn expired_is_never_due() {
    let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    let mut expired = record("c", Status::Expired);
    expired.last_checked = today - Days::days(10_000);
    assert!(!RefreshPolicy::default().is_due(&expired, today));
  }
}
