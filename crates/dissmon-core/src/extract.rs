//! Record extraction seam.
//!
//! Extraction is split in two so that no I/O happens inside a parser: the
//! case page yields a [`CaseDraft`] (which may point at a revocation page),
//! and the orchestrator fetches that page and hands it back for
//! [`CaseExtractor::parse_revocation`]. [`CaseDraft::finish`] then classifies
//! the case and produces the final record.

use chrono::NaiveDate;

use crate::{
  Result,
  case::{CaseId, CaseRecord, Revocation, Status},
  status::classify_text,
};

/// Fields read from a case page, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDraft {
  pub case_id:            CaseId,
  pub dissertant_name:    String,
  pub dissertation_title: String,
  pub adviser:            String,
  pub opponents:          String,
  pub council_name:       String,
  pub submission_date:    String,
  pub petition_filed:     bool,
  /// Locator of the revocation-detail page, when the page links one.
  pub revocation_link:    Option<String>,
}

/// Signals whether the extracted record may touch active state at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispositionHint {
  Active,
  /// Freshly classified as expired: never overwrites an active record.
  ExpiredNew,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
  pub record: CaseRecord,
  pub hint:   DispositionHint,
}

impl CaseDraft {
  /// Classify the draft and assemble the final record.
  ///
  /// `revocation` is ignored unless a petition was filed; a filed petition
  /// without detail yields an all-empty sub-record.
  pub fn finish(
    self,
    revocation: Option<Revocation>,
    today: NaiveDate,
  ) -> Result<Extraction> {
    let status =
      classify_text(&self.submission_date, self.petition_filed, today)?;
    let revocation = self
      .petition_filed
      .then(|| revocation.unwrap_or_default());

    let hint = if status == Status::Expired {
      DispositionHint::ExpiredNew
    } else {
      DispositionHint::Active
    };

    Ok(Extraction {
      record: CaseRecord {
        case_id: self.case_id,
        dissertant_name: self.dissertant_name,
        dissertation_title: self.dissertation_title,
        adviser: self.adviser,
        opponents: self.opponents,
        council_name: self.council_name,
        submission_date: self.submission_date,
        petition_filed: self.petition_filed,
        status,
        revocation,
        last_checked: today,
      },
      hint,
    })
  }
}

/// Parses registry documents into drafts and revocation sub-records.
pub trait CaseExtractor: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Parse a case page. Fails when a required structural anchor is absent.
  fn parse_case(
    &self,
    case_id: &CaseId,
    document: &str,
  ) -> Result<CaseDraft, Self::Error>;

  /// Parse a revocation-detail page. Never fails: missing or ambiguous
  /// fields come back empty.
  fn parse_revocation(&self, document: &str) -> Revocation;
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  fn draft(date: &str, petition: bool) -> CaseDraft {
    CaseDraft {
      case_id:            CaseId::new("x42").unwrap(),
      dissertant_name:    "Ivanov".into(),
      dissertation_title: "Title".into(),
      adviser:            "A".into(),
      opponents:          "B, C".into(),
      council_name:       "D 1".into(),
      submission_date:    date.into(),
      petition_filed:     petition,
      revocation_link:    None,
    }
  }

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 17).unwrap() }

  #[test]
  fn petition_without_detail_gets_empty_sub_record() {
    let out = draft("01.01.2024", true).finish(None, today()).unwrap();
    assert_eq!(out.record.status, Status::Current);
    assert_eq!(out.record.revocation, Some(Revocation::default()));
    assert_eq!(out.record.last_checked, today());
    assert_eq!(out.hint, DispositionHint::Active);
  }

  #[test]
  fn revocation_dropped_without_petition() {
    let stray = Revocation {
      status: "x".into(),
      ..Revocation::default()
    };
    let out = draft("01.01.2024", false)
      .finish(Some(stray), today())
      .unwrap();
    assert_eq!(out.record.status, Status::New);
    assert!(out.record.revocation.is_none());
  }

  #[test]
  fn old_case_is_hinted_expired() {
    let out = draft("01.01.2001", true).finish(None, today()).unwrap();
    assert_eq!(out.record.status, Status::Expired);
    assert_eq!(out.hint, DispositionHint::ExpiredNew);
  }

  #[test]
  fn bad_date_fails_classification() {
    let err = draft("n/a", false).finish(None, today()).unwrap_err();
    assert!(matches!(err, Error::InvalidDate(_)));
  }
}
