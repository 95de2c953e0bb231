//! Registry date parsing.
//!
//! The registry prints dates in whatever form its editors typed: numeric
//! `dd.mm.yyyy`, ISO, or spelled-out months in Russian (usually genitive,
//! `12 марта 2010 г.`) and occasionally English. Anything else is rejected;
//! the caller must never guess.

use chrono::NaiveDate;

use crate::{Error, Result};

/// Day-first numeric format used for display and for `last_checked` in
/// exported material.
pub const DISPLAY_FORMAT: &str = "%d.%m.%Y";

const NUMERIC_FORMATS: &[&str] = &["%d.%m.%Y", "%Y-%m-%d", "%d/%m/%Y"];

/// Parse a registry date string.
pub fn parse_registry_date(text: &str) -> Result<NaiveDate> {
  let cleaned = text
    .trim()
    .to_lowercase()
    .trim_end_matches('.')
    .trim_end_matches(" г")
    .trim_end_matches(" года")
    .trim()
    .to_owned();

  for format in NUMERIC_FORMATS {
    if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
      return Ok(date);
    }
  }

  spelled_out(&cleaned).ok_or_else(|| Error::InvalidDate(text.to_owned()))
}

pub fn format_display(date: NaiveDate) -> String {
  date.format(DISPLAY_FORMAT).to_string()
}

fn spelled_out(s: &str) -> Option<NaiveDate> {
  let mut parts = s.split_whitespace();
  let day: u32 = parts.next()?.parse().ok()?;
  let month = month_number(parts.next()?.trim_end_matches(','))?;
  let year: i32 = parts.next()?.parse().ok()?;
  if parts.next().is_some() {
    return None;
  }
  NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(word: &str) -> Option<u32> {
  const MONTHS: [&[&str]; 12] = [
    &["января", "январь", "january", "jan"],
    &["февраля", "февраль", "february", "feb"],
    &["марта", "март", "march", "mar"],
    &["апреля", "апрель", "april", "apr"],
    &["мая", "май", "may"],
    &["июня", "июнь", "june", "jun"],
    &["июля", "июль", "july", "jul"],
    &["августа", "август", "august", "aug"],
    &["сентября", "сентябрь", "september", "sep", "sept"],
    &["октября", "октябрь", "october", "oct"],
    &["ноября", "ноябрь", "november", "nov"],
    &["декабря", "декабрь", "december", "dec"],
  ];
  let word = word.trim_end_matches('.');
  MONTHS
    .iter()
    .position(|names| names.contains(&word))
    .map(|i| i as u32 + 1)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
