//! Record Extractor over registry HTML.

use chrono::NaiveDate;
use dissmon_core::{
  case::{CaseId, Revocation},
  extract::{CaseDraft, CaseExtractor, Extraction},
};
use tracing::{debug, warn};

use crate::{
  dom::Document,
  error::{Error, Result},
  lexicon::Lexicon,
  query::{DocumentQuery, LabelMatch, ValueRegion, normalize_ws},
};

/// Read a case page into a [`CaseDraft`].
pub fn extract_case<Q: DocumentQuery>(
  doc: &Q,
  case_id: &CaseId,
  lexicon: &Lexicon,
) -> Result<CaseDraft> {
  let dissertation_title = doc
    .first_text_of("h2")
    .filter(|t| !t.is_empty())
    .ok_or(Error::MissingAnchor("dissertation title"))?;

  let dissertant_name = doc
    .link_with_href(&lexicon.person_link)
    .map(|l| l.text)
    .filter(|t| !t.is_empty())
    .ok_or(Error::MissingAnchor("dissertant link"))?;

  let adviser = case_region(doc, &lexicon.science_adviser)?
    .link_texts()
    .join(", ");
  let opponents = case_region(doc, &lexicon.opponents)?
    .link_texts()
    .join(", ");

  let council_name = case_region(doc, &lexicon.council)?
    .link_texts()
    .into_iter()
    .next()
    .ok_or(Error::MissingAnchor("council link"))?;

  let date_region = case_region(doc, &lexicon.date)?;
  let submission_date = date_region
    .first_text_of("span")
    .unwrap_or_else(|| date_region.text())
    .to_lowercase();
  if submission_date.is_empty() {
    return Err(Error::MissingAnchor("submission date"));
  }

  let petition_filed = doc.contains_text(&lexicon.petition_marker);
  let revocation_link = if petition_filed {
    doc.link_with_href(&lexicon.revocation_link).map(|l| l.href)
  } else {
    None
  };

  Ok(CaseDraft {
    case_id: case_id.clone(),
    dissertant_name,
    dissertation_title,
    adviser,
    opponents,
    council_name,
    submission_date,
    petition_filed,
    revocation_link,
  })
}

fn case_region<'d, Q: DocumentQuery>(
  doc: &'d Q,
  label: &str,
) -> Result<Q::Region<'d>> {
  doc
    .value_regions(label, LabelMatch::Exact)
    .into_iter()
    .next()
    .ok_or_else(|| Error::MissingLabel(label.to_owned()))
}

/// Read a revocation-detail page. Fields whose label is missing or ambiguous
/// come back empty.
pub fn extract_revocation<Q: DocumentQuery>(
  doc: &Q,
  lexicon: &Lexicon,
) -> Revocation {
  let field = |label: &str| {
    let regions = doc.value_regions(label, LabelMatch::Contains);
    match regions.as_slice() {
      [only] => only.text(),
      [] => {
        debug!(label, "revocation label not found");
        String::new()
      }
      many => {
        debug!(label, candidates = many.len(), "revocation label ambiguous");
        String::new()
      }
    }
  };

  Revocation {
    status:                field(&lexicon.revocation_status),
    petition_date:         field(&lexicon.petition_date),
    council_decision_code: field(&lexicon.complaint_cypher),
    council_decision_text: normalize_ws(&field(&lexicon.council_decision)),
  }
}

// ─── Extractor ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct HtmlExtractor {
  lexicon: Lexicon,
}

impl HtmlExtractor {
  pub fn new(lexicon: Lexicon) -> Self { Self { lexicon } }

  pub fn lexicon(&self) -> &Lexicon { &self.lexicon }

  /// Extract and classify a case in one go, given the already-fetched
  /// revocation page when there is one.
  pub fn extract(
    &self,
    case_id: &CaseId,
    case_document: &str,
    revocation_document: Option<&str>,
    today: NaiveDate,
  ) -> Result<Extraction> {
    let draft = self.parse_case(case_id, case_document)?;
    let revocation = revocation_document.map(|d| self.parse_revocation(d));
    Ok(draft.finish(revocation, today)?)
  }
}

impl CaseExtractor for HtmlExtractor {
  type Error = Error;

  fn parse_case(&self, case_id: &CaseId, document: &str) -> Result<CaseDraft> {
    let doc = Document::parse(document)?;
    extract_case(&doc, case_id, &self.lexicon)
  }

  fn parse_revocation(&self, document: &str) -> Revocation {
    match Document::parse(document) {
      Ok(doc) => extract_revocation(&doc, &self.lexicon),
      Err(e) => {
        warn!(error = %e, "unreadable revocation page");
        Revocation::default()
      }
    }
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use dissmon_core::{case::Status, extract::DispositionHint};

  use super::*;
  use crate::tests::fixtures;

  fn id() -> CaseId { CaseId::new("x42").unwrap() }

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 17).unwrap() }

  #[test]
  fn reads_every_case_field() {
    let draft = HtmlExtractor::default()
      .parse_case(&id(), &fixtures::case_page("12.03.2021", false))
      .unwrap();

    assert_eq!(draft.dissertant_name, "Ivanov Ivan");
    assert_eq!(draft.dissertation_title, "On the Theory of Everything");
    assert_eq!(draft.adviser, "Smirnov A.");
    assert_eq!(draft.opponents, "Petrov P., Sidorov S.");
    assert_eq!(draft.council_name, "D 212.002.01");
    assert_eq!(draft.submission_date, "12.03.2021");
    assert!(!draft.petition_filed);
    assert!(draft.revocation_link.is_none());
  }

  #[test]
  fn entities_in_names_are_resolved() {
    let page = fixtures::case_page("12.03.2021", false)
      .replace("Petrov P.", "Petrov&thinsp;P.")
      .replace("Sidorov S.", "Sidorov&nbsp;S.&shy;");
    let draft = HtmlExtractor::default().parse_case(&id(), &page).unwrap();
    assert_eq!(draft.opponents, "Petrov P., Sidorov S.&shy;");
  }

  #[test]
  fn petition_marker_yields_revocation_link() {
    let draft = HtmlExtractor::default()
      .parse_case(&id(), &fixtures::case_page("12.03.2021", true))
      .unwrap();
    assert!(draft.petition_filed);
    assert_eq!(
      draft.revocation_link.as_deref(),
      Some("/revocation-of-degrees/x42.html")
    );
  }

  #[test]
  fn missing_label_fails_extraction() {
    let page =
      fixtures::case_page("12.03.2021", false).replace("Opponents", "Reviewers");
    let err = HtmlExtractor::default().parse_case(&id(), &page).unwrap_err();
    assert!(matches!(err, Error::MissingLabel(ref l) if l == "opponents"));
  }

  #[test]
  fn missing_title_fails_extraction() {
    let page = fixtures::case_page("12.03.2021", false).replace("h2", "h3");
    let err = HtmlExtractor::default().parse_case(&id(), &page).unwrap_err();
    assert!(matches!(err, Error::MissingAnchor("dissertation title")));
  }

  #[test]
  fn revocation_fields_are_read_and_normalised() {
    let rev = HtmlExtractor::default()
      .parse_revocation(&fixtures::revocation_page("D 1", "hearing\n   set"));
    assert_eq!(rev.status, "under review");
    assert_eq!(rev.petition_date, "01.02.2024");
    assert_eq!(rev.council_decision_code, "D 1");
    assert_eq!(rev.council_decision_text, "hearing set");
  }

  #[test]
  fn ambiguous_revocation_label_is_empty() {
    let page = fixtures::revocation_page("D 1", "x").replace(
      "</body>",
      "<div><div><i>petition date (amended)</i></div><p>03.03.2024</p></div></body>",
    );
    let rev = HtmlExtractor::default().parse_revocation(&page);
    assert_eq!(rev.petition_date, "");
    assert_eq!(rev.status, "under review");
  }

  #[test]
  fn empty_revocation_page_is_all_empty() {
    let rev = HtmlExtractor::default().parse_revocation("<html></html>");
    assert_eq!(rev, Revocation::default());
  }

  #[test]
  fn extract_classifies_with_revocation() {
    let out = HtmlExtractor::default()
      .extract(
        &id(),
        &fixtures::case_page("12.03.2021", true),
        Some(&fixtures::revocation_page("D 7", "pending")),
        today(),
      )
      .unwrap();
    assert_eq!(out.hint, DispositionHint::Active);
    assert_eq!(out.record.status, Status::Current);
    assert_eq!(out.record.council_decision_code(), "D 7");
  }

  #[test]
  fn extract_reports_unparseable_date() {
    let err = HtmlExtractor::default()
      .extract(&id(), &fixtures::case_page("someday", false), None, today())
      .unwrap_err();
    assert!(matches!(err, Error::Core(dissmon_core::Error::InvalidDate(_))));
  }

  #[test]
  fn russian_lexicon_reads_native_labels() {
    let page = r#"<html><body>
      <h2>О теории всего</h2>
      <a href="/person/7.html">Иванов Иван</a>
      <div><div><b>Научный руководитель:</b></div><div><a href="/person/8.html">Смирнов А.</a></div></div>
      <div><div><b>Оппоненты:</b></div><div><a href="/person/9.html">Петров П.</a></div></div>
      <div><div><b>Диссовет:</b></div><div><a href="/council/1.html">Д 1</a></div></div>
      <div><div><b>Дата защиты:</b></div><div><span>12 Марта 2021 г.</span></div></div>
    </body></html>"#;
    let draft = HtmlExtractor::new(Lexicon::russian())
      .parse_case(&id(), page)
      .unwrap();
    assert_eq!(draft.opponents, "Петров П.");
    assert_eq!(draft.submission_date, "12 марта 2021 г.");
  }
}
