//! Changelog entries: the append-only history of detected changes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{case::CaseId, reconcile::MaterialField};

/// Marker recorded in `changed_fields` when a case is seen for the first time.
pub const NEW_CASE_MARKER: &str = "new";

/// One detected mutation. Never edited once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
  pub entry_id:       Uuid,
  pub case_id:        CaseId,
  /// Field names in the fixed material-field order, or [`NEW_CASE_MARKER`].
  pub changed_fields: Vec<String>,
  pub date:           NaiveDate,
}

impl ChangelogEntry {
  pub fn new_case(case_id: CaseId, date: NaiveDate) -> Self {
    Self {
      entry_id: Uuid::new_v4(),
      case_id,
      changed_fields: vec![NEW_CASE_MARKER.to_owned()],
      date,
    }
  }

  pub fn updated(
    case_id: CaseId,
    fields: &[MaterialField],
    date: NaiveDate,
  ) -> Self {
    Self {
      entry_id: Uuid::new_v4(),
      case_id,
      changed_fields: fields.iter().map(ToString::to_string).collect(),
      date,
    }
  }

  pub fn is_new_case(&self) -> bool {
    self.changed_fields.len() == 1 && self.changed_fields[0] == NEW_CASE_MARKER
  }
}
