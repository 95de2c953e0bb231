//! Literal strings the extractor looks for.
//!
//! Every field may be overridden from configuration; missing fields fall
//! back to the English defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
  // Case page labels.
  pub date:              String,
  pub council:           String,
  pub opponents:         String,
  pub science_adviser:   String,
  /// Text whose presence anywhere on a case page means a petition was filed.
  pub petition_marker:   String,

  // Revocation page labels.
  pub revocation_status: String,
  pub petition_date:     String,
  pub complaint_cypher:  String,
  pub council_decision:  String,

  // Substrings of `href` values.
  pub person_link:       String,
  pub revocation_link:   String,
  pub case_link:         String,
}

impl Default for Lexicon {
  fn default() -> Self {
    Self {
      date:              "date".into(),
      council:           "council".into(),
      opponents:         "opponents".into(),
      science_adviser:   "science adviser".into(),
      petition_marker:   "petition for degree revocation".into(),
      revocation_status: "status".into(),
      petition_date:     "petition date".into(),
      complaint_cypher:  "complaint cypher".into(),
      council_decision:  "council decision".into(),
      person_link:       "person/".into(),
      revocation_link:   "revocation-of-degrees/".into(),
      case_link:         "expertise/".into(),
    }
  }
}

impl Lexicon {
  /// Labels as they appear on the Russian-language registry.
  pub fn russian() -> Self {
    Self {
      date: "Дата защиты".into(),
      council: "Диссовет".into(),
      opponents: "Оппоненты".into(),
      science_adviser: "Научный руководитель".into(),
      petition_marker: "заявление о лишении".into(),
      revocation_status: "Статус".into(),
      petition_date: "Дата подачи заявления".into(),
      complaint_cypher: "(жалоба)".into(),
      council_decision: "Решение диссовета".into(),
      ..Self::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_override_keeps_defaults() {
    let lex: Lexicon =
      serde_json::from_str(r#"{ "council": "Диссовет" }"#).unwrap();
    assert_eq!(lex.council, "Диссовет");
    assert_eq!(lex.date, "date");
    assert_eq!(lex.case_link, "expertise/");
  }

  #[test]
  fn russian_shares_link_markers() {
    let ru = Lexicon::russian();
    assert_eq!(ru.person_link, Lexicon::default().person_link);
    assert_eq!(ru.opponents, "Оппоненты");
  }
}
