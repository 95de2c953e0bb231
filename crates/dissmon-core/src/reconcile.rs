//! Reconciler: freshly extracted record + stored record → [`Disposition`].
//!
//! Only the five material fields take part in change detection. Names,
//! titles and adviser lists may drift cosmetically on the registry and are
//! not treated as changes.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator as _};

use crate::case::{CaseRecord, Status};

/// A field whose change is reported. Declaration order is the reporting order.
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
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaterialField {
  Status,
  PetitionFiled,
  PetitionDate,
  CouncilDecisionCode,
  CouncilDecisionText,
}

impl MaterialField {
  fn differs(self, fresh: &CaseRecord, stored: &CaseRecord) -> bool {
    match self {
      Self::Status => fresh.status != stored.status,
      Self::PetitionFiled => fresh.petition_filed != stored.petition_filed,
      Self::PetitionDate => fresh.petition_date() != stored.petition_date(),
      Self::CouncilDecisionCode => {
        fresh.council_decision_code() != stored.council_decision_code()
      }
      Self::CouncilDecisionText => {
        fresh.council_decision_text() != stored.council_decision_text()
      }
    }
  }
}

/// What to do with a freshly extracted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum Disposition {
  /// The case left the review window; store it with the expired cases.
  RouteToExpired,
  /// First sighting; insert as-is.
  NewCase,
  /// Material fields changed; the fresh record replaces the stored one.
  Updated { changed_fields: Vec<MaterialField> },
  /// Nothing material changed; keep the stored record verbatim.
  Unchanged,
}

/// Material fields that differ between `fresh` and `stored`, in reporting
/// order.
pub fn material_diff(
  fresh: &CaseRecord,
  stored: &CaseRecord,
) -> Vec<MaterialField> {
  MaterialField::iter()
    .filter(|field| field.differs(fresh, stored))
    .collect()
}

/// Decide the disposition of `fresh` given the stored record for its id.
pub fn reconcile(fresh: &CaseRecord, stored: Option<&CaseRecord>) -> Disposition {
  if fresh.status == Status::Expired {
    return Disposition::RouteToExpired;
  }

  let Some(stored) = stored else {
    return Disposition::NewCase;
  };

  let changed_fields = material_diff(fresh, stored);
  if changed_fields.is_empty() {
    Disposition::Unchanged
  } else {
    Disposition::Updated { changed_fields }
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
