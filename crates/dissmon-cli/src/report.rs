//! Plain-text rendering for the `list` and `changelog` commands.

use std::fmt::Write as _;

use dissmon_core::{
  case::{CaseRecord, Status},
  changelog::ChangelogEntry,
  date::format_display,
};

pub fn render_cases(records: &[CaseRecord]) -> String {
  if records.is_empty() {
    return "No matching cases\n".to_string();
  }

  let mut out = String::new();
  for r in records {
    let _ = write!(
      out,
      "{:<24} {:<8} {}",
      r.case_id.as_str(),
      r.status.to_string(),
      r.dissertant_name
    );
    // Revocation detail only matters while a petition is live.
    if r.status == Status::Current {
      let _ = write!(
        out,
        " | {} | {} | {} | {}",
        r.revocation.as_ref().map_or("", |rev| rev.status.as_str()),
        r.petition_date(),
        r.council_decision_code(),
        r.council_decision_text(),
      );
    }
    out.push('\n');
  }
  out
}

pub fn render_changelog(entries: &[ChangelogEntry]) -> String {
  if entries.is_empty() {
    return "No changelog entries\n".to_string();
  }

  let mut out = String::new();
  for e in entries {
    let _ = writeln!(
      out,
      "{}  {:<24} {}",
      format_display(e.date),
      e.case_id.as_str(),
      e.changed_fields.join(", ")
    );
  }
  out
}
