//! Status classifier: (submission date, petition flag) → [`Status`].
//!
//! Elapsed years are whole 365-day blocks, not calendar years. Stored
//! statuses were computed this way, so the approximation must stay.

use chrono::NaiveDate;

use crate::{Result, case::Status, date::parse_registry_date};

/// Cases older than this many (365-day) years are outside the review window.
pub const REVIEW_WINDOW_YEARS: i64 = 11;

const DAYS_PER_YEAR: i64 = 365;

/// Classify a case as of `today`.
pub fn classify(
  submission_date: NaiveDate,
  petition_filed: bool,
  today: NaiveDate,
) -> Status {
  let elapsed_days = (today - submission_date).num_days();
  // Floor division, so future dates count as negative years.
  let elapsed_years = elapsed_days.div_euclid(DAYS_PER_YEAR);

  if elapsed_years > REVIEW_WINDOW_YEARS {
    Status::Expired
  } else if petition_filed {
    Status::Current
  } else {
    Status::New
  }
}

/// Classify from the submission date as printed by the registry.
///
/// Unparseable dates are an error; a status is never guessed.
pub fn classify_text(
  submission_date: &str,
  petition_filed: bool,
  today: NaiveDate,
) -> Result<Status> {
  let date = parse_registry_date(submission_date)?;
  Ok(classify(date, petition_filed, today))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
