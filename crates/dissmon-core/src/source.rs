//! Document transport and archival seams.

use std::{fmt, future::Future};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::case::CaseId;

/// One case discovered on the registry index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
  pub case_id: CaseId,
  /// Opaque locator handed back to the [`DocumentSource`].
  pub locator: String,
}

/// Fetches raw documents by locator. Retries, if any, belong here.
pub trait DocumentSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn fetch<'a>(
    &'a self,
    locator: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}

/// What a preserved document is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
  /// A registry index page.
  Listing,
  /// A defense (case) page.
  Case,
  /// A revocation-detail page linked from a case page.
  Revocation,
}

impl fmt::Display for DocumentKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Listing => "listing",
      Self::Case => "case",
      Self::Revocation => "revocation",
    })
  }
}

/// Write-once storage of raw fetched documents, keyed by kind, key and date.
///
/// Preserving a document that already exists for the same key and date is
/// not an error and leaves the original copy in place.
pub trait DocumentArchive: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn preserve(
    &self,
    kind: DocumentKind,
    key: &str,
    date: NaiveDate,
    document: &str,
  ) -> Result<(), Self::Error>;
}
