//! Registry index page → ordered case listing.

use std::collections::HashSet;

use dissmon_core::{case::CaseId, source::ListingEntry};
use tracing::debug;

use crate::{
  dom::Document,
  error::Result,
  lexicon::Lexicon,
  query::DocumentQuery,
};

/// Every case link on an index page, in document order, first occurrence of
/// each id only.
pub fn parse_listing(markup: &str, lexicon: &Lexicon) -> Result<Vec<ListingEntry>> {
  let doc = Document::parse(markup)?;
  Ok(listing_from(&doc, lexicon))
}

pub fn listing_from<Q: DocumentQuery>(doc: &Q, lexicon: &Lexicon) -> Vec<ListingEntry> {
  let mut seen = HashSet::new();
  doc
    .hrefs_containing(&lexicon.case_link)
    .into_iter()
    .filter(|locator| names_a_case(locator, &lexicon.case_link))
    .filter_map(|locator| match CaseId::from_locator(&locator) {
      Ok(case_id) => Some(ListingEntry { case_id, locator }),
      Err(e) => {
        debug!(%locator, error = %e, "skipping unusable case link");
        None
      }
    })
    .filter(|entry| seen.insert(entry.case_id.clone()))
    .collect()
}

/// The link must have a path segment after the marker; the bare index link
/// itself is not a case.
fn names_a_case(locator: &str, marker: &str) -> bool {
  locator
    .split_once(marker)
    .map(|(_, rest)| rest.split(['?', '#']).next().unwrap_or_default())
    .is_some_and(|rest| !rest.trim_matches('/').is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn collects_case_links_in_order_without_duplicates() {
    let page = r#"<ul>
      <li><a href="/expertise/b17.html">B</a></li>
      <li><a href="/news/1.html">not a case</a></li>
      <li><a href="https://registry.example/expertise/a3.html?tab=1">A</a></li>
      <li><a href="/expertise/b17.html#top">B again</a></li>
    </ul>"#;
    let listing = parse_listing(page, &Lexicon::default()).unwrap();
    let ids: Vec<_> = listing.iter().map(|e| e.case_id.as_str()).collect();
    assert_eq!(ids, vec!["b17", "a3"]);
    assert_eq!(listing[0].locator, "/expertise/b17.html");
  }

  #[test]
  fn bare_marker_link_is_skipped() {
    let page = r#"<a href="/expertise/">index</a><a href="/expertise/c1">C</a>"#;
    let listing = parse_listing(page, &Lexicon::default()).unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].case_id.as_str(), "c1");
  }
}
